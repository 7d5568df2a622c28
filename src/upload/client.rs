use crate::backend::models::{AuthToken, ConfirmRequest, ConfirmedUpload, SignatureRequest};
use crate::backend::Backend;

use super::{UploadError, UploadFile};

/// Progress reported once the signature is issued.
pub(crate) const SIGNED_PROGRESS: u8 = 10;
/// Progress reported once the bytes reach object storage.
pub(crate) const TRANSFERRED_PROGRESS: u8 = 70;

/// Upload one file through a presigned target and confirm it with the backend.
///
/// Three steps, no retries: request a signature, PUT the bytes directly to the
/// signed URL, then confirm so the backend starts processing. `progress` is
/// called after each of the first two steps.
pub async fn upload_via_presigned(
    backend: &dyn Backend,
    token: &AuthToken,
    project_id: &str,
    file: &UploadFile,
    progress: &mut (dyn FnMut(u8) + Send),
) -> Result<ConfirmedUpload, UploadError> {
    let data = file.source.read().await?;
    let file_size = data.len() as u64;

    let signature = backend
        .upload_signature(
            token,
            &SignatureRequest {
                project_id: project_id.to_string(),
                file_name: file.name.clone(),
                file_size,
                content_type: file.content_type.clone(),
                relative_path: file.relative_path.clone(),
            },
        )
        .await
        .map_err(UploadError::Signature)?;
    progress(SIGNED_PROGRESS);

    backend
        .put_object(&signature, &file.content_type, data)
        .await
        .map_err(UploadError::Transfer)?;
    progress(TRANSFERRED_PROGRESS);

    let confirmed = backend
        .confirm_upload(
            token,
            &ConfirmRequest {
                project_id: project_id.to_string(),
                upload_id: signature.upload_id.clone(),
                file_name: file.name.clone(),
                file_size,
                relative_path: file.relative_path.clone(),
            },
        )
        .await
        .map_err(UploadError::Confirm)?;

    tracing::debug!(
        file_id = %confirmed.file_id,
        name = %confirmed.name,
        bytes = file_size,
        "Upload confirmed"
    );
    Ok(confirmed)
}
