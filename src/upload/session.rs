use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::backend::models::AuthToken;
use crate::backend::Backend;

use super::orchestrator::{upload_multiple, BatchReport, UploadEvent, UploadOptions, UploadResult};
use super::poller::PollPolicy;
use super::tree::{self, FolderStructure};
use super::UploadFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Processing,
    Completed,
    Error,
}

/// Per-file view state for one queued upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadItem {
    pub id: Uuid,
    pub name: String,
    /// Folder path, empty for individually picked files
    pub path: String,
    pub size: u64,
    pub progress: u8,
    pub status: UploadStatus,
    pub file_id: Option<String>,
    pub error: Option<String>,
}

impl UploadItem {
    fn pending(file: &UploadFile, path: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: file.name.clone(),
            path: path.to_string(),
            size: file.size,
            progress: 0,
            status: UploadStatus::Pending,
            file_id: None,
            error: None,
        }
    }

    fn reset(&mut self) {
        self.progress = 0;
        self.status = UploadStatus::Pending;
        self.file_id = None;
        self.error = None;
    }

    fn matches(&self, path: &str, name: &str) -> bool {
        self.path == path && self.name == name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub individual_files: usize,
    pub folders: usize,
    pub nested_files: usize,
}

/// Working set of files and folders picked for one project, plus their
/// upload progress. Selections accumulate across picks until `submit`.
#[derive(Debug)]
pub struct UploadSession {
    project_id: String,
    individual: Vec<Arc<UploadFile>>,
    folder: Option<FolderStructure>,
    items: Vec<UploadItem>,
}

impl UploadSession {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            individual: Vec::new(),
            folder: None,
            items: Vec::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn individual_files(&self) -> &[Arc<UploadFile>] {
        &self.individual
    }

    pub fn folder(&self) -> Option<&FolderStructure> {
        self.folder.as_ref()
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn item(&self, path: &str, name: &str) -> Option<&UploadItem> {
        self.items.iter().find(|i| i.matches(path, name))
    }

    pub fn is_empty(&self) -> bool {
        self.individual.is_empty() && self.folder.is_none()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            individual_files: self.individual.len(),
            folders: self.folder.as_ref().map_or(0, FolderStructure::top_level_folders),
            nested_files: self.folder.as_ref().map_or(0, FolderStructure::count_files),
        }
    }

    /// Individual files first, then the flattened folder tree.
    pub fn queued(&self) -> Vec<(Arc<UploadFile>, String)> {
        let mut queued: Vec<(Arc<UploadFile>, String)> = self
            .individual
            .iter()
            .map(|f| (Arc::clone(f), String::new()))
            .collect();
        if let Some(folder) = &self.folder {
            queued.extend(folder.flatten());
        }
        queued
    }

    /// Add individually picked files. A file with the same name replaces the earlier pick.
    pub fn add_files<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = UploadFile>,
    {
        for mut file in files {
            file.relative_path = None;
            let file = Arc::new(file);
            match self.individual.iter_mut().find(|f| f.name == file.name) {
                Some(slot) => *slot = file,
                None => self.individual.push(file),
            }
        }
        self.sync_items();
    }

    /// Add a picked folder's files (carrying relative paths) and merge the
    /// resulting tree into what has been accumulated so far.
    pub fn add_folder<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = UploadFile>,
    {
        let incoming = FolderStructure::build(files);
        if incoming.count_files() == 0 {
            return;
        }
        self.folder = Some(tree::merge(self.folder.as_ref(), incoming));
        self.sync_items();
    }

    pub fn remove_file(&mut self, name: &str) -> bool {
        let before = self.individual.len();
        self.individual.retain(|f| f.name != name);
        let removed = self.individual.len() != before;
        if removed {
            self.sync_items();
        }
        removed
    }

    pub fn remove_folder_file(&mut self, path: &str, name: &str) -> bool {
        let Some(folder) = &self.folder else {
            return false;
        };
        let before = folder.count_files();
        self.folder = folder.remove_file(path, name);
        self.finish_removal(before)
    }

    pub fn remove_folder(&mut self, path: &str) -> bool {
        let Some(folder) = &self.folder else {
            return false;
        };
        let before = folder.count_files();
        self.folder = folder.remove_folder(path);
        self.finish_removal(before)
    }

    fn finish_removal(&mut self, before: usize) -> bool {
        let after = self.folder.as_ref().map_or(0, FolderStructure::count_files);
        if after != before {
            self.sync_items();
        }
        after != before
    }

    /// Drop every selection and all progress.
    pub fn clear(&mut self) {
        self.individual.clear();
        self.folder = None;
        self.items.clear();
    }

    /// Fold a progress event into the item at the event's queue position.
    /// Progress never decreases.
    pub fn apply(&mut self, event: &UploadEvent) {
        let Some(item) = self
            .items
            .get_mut(event.index)
            .filter(|i| i.matches(&event.path, &event.name))
        else {
            tracing::debug!(
                index = event.index,
                name = %event.name,
                path = %event.path,
                "Event for unknown upload item"
            );
            return;
        };

        item.progress = item.progress.max(event.progress).min(100);
        item.status = event.status;
        if event.file_id.is_some() {
            item.file_id = event.file_id.clone();
        }
        if event.error.is_some() {
            item.error = event.error.clone();
        }
    }

    /// Upload everything queued, in order, feeding progress back into the items.
    pub async fn submit(
        &mut self,
        backend: &dyn Backend,
        auth_token: AuthToken,
        poll: PollPolicy,
    ) -> BatchReport {
        let options = UploadOptions {
            project_id: self.project_id.clone(),
            auth_token,
            poll,
        };
        let queued = self.queued();
        for item in &mut self.items {
            item.reset();
        }
        tracing::info!(
            project_id = %self.project_id,
            files = queued.len(),
            "Submitting upload session"
        );

        let mut on_event = |event: UploadEvent| self.apply(&event);
        let mut on_complete = |_: &UploadResult| {};
        upload_multiple(backend, &queued, &options, &mut on_event, &mut on_complete).await
    }

    /// Rebuild items in queue order, keeping state of files that stay queued.
    /// Each previous item is reused at most once, so two queued files with the
    /// same path and name still get distinct items.
    fn sync_items(&mut self) {
        let mut previous = std::mem::take(&mut self.items);
        self.items = self
            .queued()
            .into_iter()
            .map(|(file, path)| {
                match previous.iter().position(|i| i.matches(&path, &file.name)) {
                    Some(pos) => previous.remove(pos),
                    None => UploadItem::pending(&file, &path),
                }
            })
            .collect();
    }
}
