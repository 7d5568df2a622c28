use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::cookies::RequireAuth;
use crate::api::response::{ApiError, JSend};
use crate::backend::models::AuthToken;
use crate::upload::{
    BatchReport, SessionSummary, UploadFailure, UploadFile, UploadItem, UploadResult,
    UploadSession,
};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadBatchResponse {
    pub project_id: String,
    pub summary: SessionSummary,
    pub items: Vec<UploadItem>,
    pub uploaded: Vec<UploadResult>,
    pub failures: Vec<UploadFailure>,
}

/// Upload a batch of files to a project.
/// Route: POST /api/projects/:id/uploads
///
/// Every multipart `file` part is queued. A part whose filename carries a
/// `/` is treated as a folder file, the filename being its relative path.
///
/// The batch itself runs on a spawned task; a dropped connection does not
/// cancel files still waiting in the queue.
pub async fn create_uploads(
    State(state): State<Arc<AppState>>,
    RequireAuth(token): RequireAuth,
    Path(project_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<JSend<UploadBatchResponse>>, ApiError> {
    let mut individual = Vec::new();
    let mut folder = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("file parts must carry a filename"))?;
        let content_type = field.content_type().map(|s| s.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

        if data.len() as u64 > state.config.server.max_upload_size {
            return Err(ApiError::payload_too_large(format!(
                "File exceeds maximum upload size of {} bytes",
                state.config.server.max_upload_size
            )));
        }

        let mut file = UploadFile::from_relative(&file_name, data);
        if let Some(content_type) = content_type {
            file = file.with_content_type(content_type);
        }

        if file.relative_path.is_some() {
            folder.push(file);
        } else {
            individual.push(file);
        }
    }

    let mut session = UploadSession::new(project_id.clone());
    session.add_files(individual);
    session.add_folder(folder);

    if session.is_empty() {
        return Err(ApiError::bad_request("at least one file part is required"));
    }

    let summary = session.summary();
    let (items, report) = spawn_batch(Arc::clone(&state), session, token)
        .await
        .map_err(|e| ApiError::internal(format!("Upload batch aborted: {e}")))?;

    Ok(JSend::success(UploadBatchResponse {
        project_id,
        summary,
        items,
        uploaded: report.uploaded,
        failures: report.failures,
    }))
}

/// Run a session's uploads on their own task. The batch runs to completion
/// even if the request that started it goes away.
pub(crate) fn spawn_batch(
    state: Arc<AppState>,
    mut session: UploadSession,
    token: AuthToken,
) -> JoinHandle<(Vec<UploadItem>, BatchReport)> {
    tokio::spawn(async move {
        let report = session
            .submit(
                state.backend.as_ref(),
                token,
                state.config.upload.poll_policy(),
            )
            .await;

        if !report.uploaded.is_empty() {
            state.cache.invalidate(session.project_id());
        }

        let items = session.items().to_vec();
        session.clear();
        (items, report)
    })
}
