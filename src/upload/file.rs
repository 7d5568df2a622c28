use std::path::{Path, PathBuf};

use bytes::Bytes;

/// Where a file's bytes live until the upload reads them.
#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(Bytes),
    Disk(PathBuf),
}

impl FileSource {
    pub async fn read(&self) -> Result<Bytes, std::io::Error> {
        match self {
            FileSource::Memory(data) => Ok(data.clone()),
            FileSource::Disk(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
        }
    }
}

/// A file queued for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    /// Path relative to the picked folder, including the file name (`Specs/a.dwg`).
    /// `None` for individually picked files.
    pub relative_path: Option<String>,
    pub size: u64,
    pub content_type: String,
    pub source: FileSource,
}

impl UploadFile {
    pub fn from_bytes(name: impl Into<String>, data: Bytes) -> Self {
        let name = name.into();
        Self {
            content_type: guess_content_type(&name),
            size: data.len() as u64,
            relative_path: None,
            source: FileSource::Memory(data),
            name,
        }
    }

    /// Build a file from a relative path such as `Specs/sub/a.dwg`.
    /// A path with no directory component yields an individual file.
    pub fn from_relative(relative_path: &str, data: Bytes) -> Self {
        let normalized = normalize_relative(relative_path);
        let name = normalized
            .rsplit('/')
            .next()
            .unwrap_or(normalized.as_str())
            .to_string();
        let mut file = Self::from_bytes(name, data);
        if normalized.contains('/') {
            file.relative_path = Some(normalized);
        }
        file
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        if !content_type.is_empty() && content_type != "application/octet-stream" {
            self.content_type = content_type;
        }
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
            })?;

        Ok(Self {
            content_type: guess_content_type(&name),
            size: meta.len(),
            relative_path: None,
            source: FileSource::Disk(path.to_path_buf()),
            name,
        })
    }

    /// Walk a directory and return its files with relative paths rooted at the
    /// directory's own name, in sorted order.
    pub async fn collect_dir(dir: impl AsRef<Path>) -> Result<Vec<Self>, std::io::Error> {
        let dir = dir.as_ref();
        let root_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "directory has no name")
            })?;

        let mut files = Vec::new();
        let mut pending = vec![(dir.to_path_buf(), root_name)];

        while let Some((current, prefix)) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let name = entry.file_name().to_string_lossy().to_string();
                let relative = format!("{prefix}/{name}");
                if file_type.is_dir() {
                    pending.push((entry.path(), relative));
                } else if file_type.is_file() {
                    let mut file = Self::from_path(entry.path()).await?;
                    file.relative_path = Some(relative);
                    files.push(file);
                }
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    /// Folder portion of the relative path (`Specs/sub` for `Specs/sub/a.dwg`).
    pub fn folder_path(&self) -> Option<&str> {
        self.relative_path
            .as_deref()
            .and_then(|p| p.rsplit_once('/'))
            .map(|(dir, _)| dir)
    }
}

fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

fn normalize_relative(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}
