//! Client-driven upload pipeline.
//!
//! signature -> PUT -> confirm -> poll, one file at a time, fed from an
//! [`UploadSession`] that accumulates picked files and folders.

mod client;
mod file;
mod orchestrator;
mod poller;
mod session;
pub mod tree;

pub use client::upload_via_presigned;
pub use file::{FileSource, UploadFile};
pub use orchestrator::{
    upload_folder, upload_multiple, upload_single, BatchReport, UploadEvent, UploadFailure,
    UploadOptions, UploadResult,
};
pub use poller::{poll_until_terminal, PollPolicy};
pub use session::{SessionSummary, UploadItem, UploadSession, UploadStatus};
pub use tree::FolderStructure;

use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Status polling gave up after {attempts} attempts: {source}")]
    TooManyErrors {
        attempts: u32,
        #[source]
        source: BackendError,
    },
}

/// Failure of one file's upload. Siblings in a batch keep going.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to get upload signature: {0}")]
    Signature(#[source] BackendError),
    #[error("Failed to transfer file: {0}")]
    Transfer(#[source] BackendError),
    #[error("Failed to confirm upload: {0}")]
    Confirm(#[source] BackendError),
    #[error(transparent)]
    Poll(#[from] PollError),
}

impl UploadError {
    /// The backend error behind this failure, if any.
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            UploadError::Signature(e) | UploadError::Transfer(e) | UploadError::Confirm(e) => {
                Some(e)
            }
            UploadError::Poll(PollError::TooManyErrors { source, .. }) => Some(source),
            UploadError::Read(_) => None,
        }
    }
}
