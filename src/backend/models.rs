use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side processing state of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    /// Map a backend status word. Returns `None` for words we do not know.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "processed" | "success" => Some(Self::Completed),
            "failed" | "error" => Some(Self::Failed),
            "processing" | "in_progress" | "uploaded" => Some(Self::Processing),
            "pending" | "queued" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// How a status poll ended. `Timeout` means processing may still finish server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PollOutcome {
    Completed,
    Failed,
    Timeout,
}

/// Document status as shown in the documents table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentStatus {
    Completed,
    Processing,
    Failed,
    Pending,
}

impl From<ProcessingStatus> for DocumentStatus {
    fn from(status: ProcessingStatus) -> Self {
        match status {
            ProcessingStatus::Completed => DocumentStatus::Completed,
            ProcessingStatus::Processing => DocumentStatus::Processing,
            ProcessingStatus::Failed => DocumentStatus::Failed,
            ProcessingStatus::Pending => DocumentStatus::Pending,
        }
    }
}

/// Cached projection of a backend document record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub doc_type: Option<String>,
    pub size: Option<u64>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub status: DocumentStatus,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Opaque session token issued by the backend on login
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(pub String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureRequest {
    pub project_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
}

/// Write-once upload target issued by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSignature {
    pub upload_url: String,
    /// Identifier the backend expects back on confirmation
    pub upload_id: String,
    /// Extra headers the object store requires on the PUT
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmRequest {
    pub project_id: String,
    pub upload_id: String,
    pub file_name: String,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmedUpload {
    pub file_id: String,
    pub name: String,
}
