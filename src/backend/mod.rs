pub mod models;
pub mod normalize;
mod xano;

pub use xano::XanoClient;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use models::{
    AuthToken, ConfirmRequest, ConfirmedUpload, Document, ProcessingStatus, Project,
    SignatureRequest, UploadSignature, User,
};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Backend request failed ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Unexpected {what} payload: {body}")]
    UnexpectedShape { what: &'static str, body: String },
    #[error("Invalid {what} id: {id:?}")]
    InvalidId { what: &'static str, id: String },
}

impl BackendError {
    /// Build a shape error, keeping only a prefix of the offending payload.
    pub fn shape(what: &'static str, body: &str) -> Self {
        let body: String = body.chars().take(200).collect();
        BackendError::UnexpectedShape { what, body }
    }
}

/// The hosted backend, treated as an opaque collaborator.
/// Every response is normalized into canonical types before it leaves the implementation.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, BackendError>;
    async fn me(&self, token: &AuthToken) -> Result<User, BackendError>;
    async fn list_projects(&self, token: &AuthToken) -> Result<Vec<Project>, BackendError>;
    async fn list_documents(
        &self,
        token: &AuthToken,
        project_id: &str,
    ) -> Result<Vec<Document>, BackendError>;

    async fn upload_signature(
        &self,
        token: &AuthToken,
        req: &SignatureRequest,
    ) -> Result<UploadSignature, BackendError>;
    /// PUT the bytes to the presigned target. The signature is the credential.
    async fn put_object(
        &self,
        signature: &UploadSignature,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError>;
    async fn confirm_upload(
        &self,
        token: &AuthToken,
        req: &ConfirmRequest,
    ) -> Result<ConfirmedUpload, BackendError>;
    async fn file_status(
        &self,
        token: &AuthToken,
        file_id: &str,
    ) -> Result<ProcessingStatus, BackendError>;
}
