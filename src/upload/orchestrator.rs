use std::sync::Arc;

use serde::Serialize;

use crate::backend::models::{AuthToken, PollOutcome};
use crate::backend::Backend;

use super::client::upload_via_presigned;
use super::poller::{poll_until_terminal, PollPolicy};
use super::session::UploadStatus;
use super::tree::FolderStructure;
use super::{UploadError, UploadFile};

const CONFIRMED_PROGRESS: u8 = 80;
const TIMED_OUT_PROGRESS: u8 = 90;

/// Settings shared by every file in a run.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub project_id: String,
    pub auth_token: AuthToken,
    pub poll: PollPolicy,
}

/// Progress report for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadEvent {
    pub index: usize,
    pub name: String,
    /// Folder path the file was picked from, empty for individual files
    pub path: String,
    pub progress: u8,
    pub status: UploadStatus,
    pub file_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    pub index: usize,
    pub file_id: String,
    pub name: String,
    pub path: String,
    pub outcome: PollOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadFailure {
    pub index: usize,
    pub name: String,
    pub path: String,
    pub error: String,
}

/// Outcome of a multi-file run. Partial success is normal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub uploaded: Vec<UploadResult>,
    pub failures: Vec<UploadFailure>,
}

struct Reporter<'a> {
    index: usize,
    name: String,
    path: String,
    progress: u8,
    on_event: &'a mut (dyn FnMut(UploadEvent) + Send),
}

impl Reporter<'_> {
    fn emit(
        &mut self,
        progress: u8,
        status: UploadStatus,
        file_id: Option<&str>,
        error: Option<String>,
    ) {
        // Progress never moves backwards
        self.progress = self.progress.max(progress);
        (self.on_event)(UploadEvent {
            index: self.index,
            name: self.name.clone(),
            path: self.path.clone(),
            progress: self.progress,
            status,
            file_id: file_id.map(str::to_string),
            error,
        });
    }
}

/// Upload one file: signature, PUT, confirm, then poll until processed.
pub async fn upload_single(
    backend: &dyn Backend,
    file: &UploadFile,
    path: &str,
    index: usize,
    options: &UploadOptions,
    on_event: &mut (dyn FnMut(UploadEvent) + Send),
) -> Result<UploadResult, UploadError> {
    let mut reporter = Reporter {
        index,
        name: file.name.clone(),
        path: path.to_string(),
        progress: 0,
        on_event,
    };
    reporter.emit(0, UploadStatus::Uploading, None, None);

    let result = run_steps(backend, file, path, index, options, &mut reporter).await;
    if let Err(e) = &result {
        reporter.emit(0, UploadStatus::Error, None, Some(e.to_string()));
    }
    result
}

async fn run_steps(
    backend: &dyn Backend,
    file: &UploadFile,
    path: &str,
    index: usize,
    options: &UploadOptions,
    reporter: &mut Reporter<'_>,
) -> Result<UploadResult, UploadError> {
    let confirmed = {
        let mut step_progress = |p: u8| reporter.emit(p, UploadStatus::Uploading, None, None);
        upload_via_presigned(
            backend,
            &options.auth_token,
            &options.project_id,
            file,
            &mut step_progress,
        )
        .await?
    };

    let file_id = confirmed.file_id.as_str();
    reporter.emit(CONFIRMED_PROGRESS, UploadStatus::Processing, Some(file_id), None);

    let outcome =
        poll_until_terminal(backend, &options.auth_token, file_id, &options.poll).await?;
    match outcome {
        PollOutcome::Completed => {
            reporter.emit(100, UploadStatus::Completed, Some(file_id), None)
        }
        PollOutcome::Failed => reporter.emit(
            0,
            UploadStatus::Error,
            Some(file_id),
            Some("Processing failed".to_string()),
        ),
        PollOutcome::Timeout => {
            reporter.emit(TIMED_OUT_PROGRESS, UploadStatus::Processing, Some(file_id), None)
        }
    }

    Ok(UploadResult {
        index,
        file_id: confirmed.file_id,
        name: confirmed.name,
        path: path.to_string(),
        outcome,
    })
}

/// Upload files strictly in order, one at a time. A failing file is recorded
/// and the run continues with the next one.
pub async fn upload_multiple(
    backend: &dyn Backend,
    files: &[(Arc<UploadFile>, String)],
    options: &UploadOptions,
    on_event: &mut (dyn FnMut(UploadEvent) + Send),
    on_file_complete: &mut (dyn FnMut(&UploadResult) + Send),
) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, (file, path)) in files.iter().enumerate() {
        match upload_single(backend, file, path, index, options, on_event).await {
            Ok(result) => {
                tracing::info!(
                    index,
                    file_id = %result.file_id,
                    name = %result.name,
                    outcome = ?result.outcome,
                    "File uploaded"
                );
                on_file_complete(&result);
                report.uploaded.push(result);
            }
            Err(e) => {
                tracing::warn!(index, name = %file.name, path = %path, error = %e, "File upload failed");
                report.failures.push(UploadFailure {
                    index,
                    name: file.name.clone(),
                    path: path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        project_id = %options.project_id,
        uploaded = report.uploaded.len(),
        failed = report.failures.len(),
        "Upload batch finished"
    );
    report
}

/// Flatten a folder tree and upload its files with their relative paths.
pub async fn upload_folder(
    backend: &dyn Backend,
    folder: &FolderStructure,
    options: &UploadOptions,
    on_event: &mut (dyn FnMut(UploadEvent) + Send),
    on_file_complete: &mut (dyn FnMut(&UploadResult) + Send),
) -> BatchReport {
    let files = folder.flatten();
    upload_multiple(backend, &files, options, on_event, on_file_complete).await
}
