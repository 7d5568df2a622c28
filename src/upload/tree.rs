//! Folder trees built from picked files.
//!
//! Every operation here is pure: it takes a tree by reference and returns a
//! new one. File entries are `Arc`-shared, so rebuilding a tree copies only
//! the folder skeleton.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::UploadFile;

/// A folder and everything beneath it. The synthetic root has an empty name.
#[derive(Debug, Clone, Default)]
pub struct FolderStructure {
    pub name: String,
    pub files: Vec<Arc<UploadFile>>,
    pub subfolders: BTreeMap<String, FolderStructure>,
}

impl FolderStructure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Root that holds several same-level trees side by side.
    pub fn synthetic() -> Self {
        Self::default()
    }

    pub fn is_synthetic(&self) -> bool {
        self.name.is_empty()
    }

    /// Group files into a tree by their relative paths.
    ///
    /// A single top-level folder becomes the root itself; files spanning
    /// several top-level folders (or sitting loose) hang off a synthetic root.
    pub fn build<I>(files: I) -> Self
    where
        I: IntoIterator<Item = UploadFile>,
    {
        let mut root = Self::synthetic();
        for file in files {
            let segments: Vec<String> = file
                .folder_path()
                .map(|p| p.split('/').map(str::to_string).collect())
                .unwrap_or_default();
            root.insert(&segments, Arc::new(file));
        }

        if root.files.is_empty() && root.subfolders.len() == 1 {
            if let Some((_, only)) = root.subfolders.pop_first() {
                return only;
            }
        }
        root
    }

    fn insert(&mut self, segments: &[String], file: Arc<UploadFile>) {
        match segments.split_first() {
            None => upsert_file(&mut self.files, file),
            Some((head, rest)) => self
                .subfolders
                .entry(head.clone())
                .or_insert_with(|| Self::new(head.clone()))
                .insert(rest, file),
        }
    }

    pub fn count_files(&self) -> usize {
        self.files.len()
            + self
                .subfolders
                .values()
                .map(FolderStructure::count_files)
                .sum::<usize>()
    }

    /// Number of real folders directly visible at the top of this tree.
    pub fn top_level_folders(&self) -> usize {
        if self.is_synthetic() {
            self.subfolders.len()
        } else {
            1
        }
    }

    /// Every file with its folder path, files of a level before its
    /// subfolders, subfolders in name order.
    pub fn flatten(&self) -> Vec<(Arc<UploadFile>, String)> {
        let mut out = Vec::with_capacity(self.count_files());
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into(&self, parent: &str, out: &mut Vec<(Arc<UploadFile>, String)>) {
        let path = join(parent, &self.name);
        for file in &self.files {
            out.push((Arc::clone(file), path.clone()));
        }
        for child in self.subfolders.values() {
            child.flatten_into(&path, out);
        }
    }

    /// Look up a folder by path (`Specs/sub`), relative to this tree's top.
    pub fn find(&self, path: &str) -> Option<&FolderStructure> {
        let segments = self.relative_segments(path)?;
        segments
            .iter()
            .try_fold(self, |node, seg| node.subfolders.get(*seg))
    }

    /// Path segments below this node, or `None` if `path` is not inside it.
    fn relative_segments<'a>(&self, path: &'a str) -> Option<Vec<&'a str>> {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if !self.is_synthetic() {
            if segments.first() != Some(&self.name.as_str()) {
                return None;
            }
            segments.remove(0);
        }
        Some(segments)
    }

    /// Rebuild the tree without the named file in the folder at `path`.
    /// Folders left empty are pruned; `None` means nothing is left.
    pub fn remove_file(&self, path: &str, file_name: &str) -> Option<FolderStructure> {
        match self.relative_segments(path) {
            Some(segments) => self.without(&segments, Some(file_name)),
            None => Some(self.clone()),
        }
    }

    /// Rebuild the tree without the folder at `path` and everything below it.
    pub fn remove_folder(&self, path: &str) -> Option<FolderStructure> {
        match self.relative_segments(path) {
            Some(segments) => self.without(&segments, None),
            None => Some(self.clone()),
        }
    }

    fn without(&self, segments: &[&str], file_name: Option<&str>) -> Option<FolderStructure> {
        let (head, rest) = match segments.split_first() {
            Some(split) => split,
            None => {
                return match file_name {
                    // The folder itself is being removed
                    None => None,
                    Some(target) => {
                        let mut node = self.clone();
                        node.files.retain(|f| f.name != target);
                        node.non_empty()
                    }
                };
            }
        };

        let Some(child) = self.subfolders.get(*head) else {
            return Some(self.clone());
        };

        let mut node = self.clone();
        match child.without(rest, file_name) {
            Some(updated) => {
                node.subfolders.insert(head.to_string(), updated);
            }
            None => {
                node.subfolders.remove(*head);
            }
        }
        node.non_empty()
    }

    fn non_empty(self) -> Option<FolderStructure> {
        if self.files.is_empty() && self.subfolders.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Merge `incoming` into an accumulated tree.
///
/// Same-named folders combine recursively (incoming files replace same-named
/// ones), so adding the same folder twice yields one folder. A synthetic root
/// absorbs incoming trees as children; two differently named trees end up
/// side by side under a new synthetic root.
pub fn merge(existing: Option<&FolderStructure>, incoming: FolderStructure) -> FolderStructure {
    let Some(existing) = existing else {
        return incoming;
    };

    if existing.name == incoming.name {
        return merge_same(existing, incoming);
    }

    let mut root = if existing.is_synthetic() {
        existing.clone()
    } else {
        let mut root = FolderStructure::synthetic();
        root.subfolders
            .insert(existing.name.clone(), existing.clone());
        root
    };

    if incoming.is_synthetic() {
        root = merge_same(&root, incoming);
    } else {
        adopt(&mut root, incoming);
    }
    root
}

fn merge_same(existing: &FolderStructure, incoming: FolderStructure) -> FolderStructure {
    let mut merged = existing.clone();
    for file in incoming.files {
        upsert_file(&mut merged.files, file);
    }
    for (_, child) in incoming.subfolders {
        adopt(&mut merged, child);
    }
    merged
}

fn adopt(parent: &mut FolderStructure, child: FolderStructure) {
    let combined = match parent.subfolders.get(&child.name) {
        Some(current) => merge_same(current, child),
        None => child,
    };
    parent.subfolders.insert(combined.name.clone(), combined);
}

fn upsert_file(files: &mut Vec<Arc<UploadFile>>, file: Arc<UploadFile>) {
    match files.iter_mut().find(|f| f.name == file.name) {
        Some(slot) => *slot = file,
        None => files.push(file),
    }
}

fn join(parent: &str, name: &str) -> String {
    match (parent.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}/{name}"),
    }
}
