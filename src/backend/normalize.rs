//! Boundary normalizer for backend payloads.
//!
//! The backend answers the same question in several shapes depending on the
//! endpoint version. Each known shape is a variant of an untagged enum; the
//! first that matches wins and is converted into the canonical model. A
//! payload that matches none of them is an error, never a silent default.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::models::{
    AuthToken, ConfirmedUpload, Document, DocumentStatus, ProcessingStatus, Project,
    UploadSignature, User,
};
use super::BackendError;

// ============================================================================
// Wire shapes
// ============================================================================

/// Backend ids arrive as integers or strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Num(i64),
    Str(String),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Num(n) => n.to_string(),
            WireId::Str(s) => s,
        }
    }
}

/// Timestamps arrive as epoch milliseconds or RFC 3339 strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Millis(i64),
    Text(String),
}

impl WireTimestamp {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            WireTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            WireTimestamp::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "projects", alias = "documents", alias = "data")]
        items: Vec<T>,
    },
}

impl<T> ListPayload<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Bare(v) => v,
            ListPayload::Wrapped { items } => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectWire {
    id: WireId,
    #[serde(alias = "project_name")]
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentWire {
    id: WireId,
    #[serde(alias = "file_name")]
    name: String,
    #[serde(default, rename = "type", alias = "doc_type", alias = "file_type")]
    doc_type: Option<String>,
    #[serde(default, alias = "file_size")]
    size: Option<u64>,
    #[serde(default, alias = "created_at")]
    uploaded_at: Option<WireTimestamp>,
    #[serde(default, alias = "processing_status")]
    status: Option<String>,
    #[serde(default, alias = "projects_id")]
    project_id: Option<WireId>,
}

#[derive(Debug, Deserialize)]
struct SignatureWire {
    #[serde(alias = "url", alias = "signed_url")]
    upload_url: String,
    #[serde(alias = "file_id", alias = "id")]
    upload_id: WireId,
    #[serde(default)]
    headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignaturePayload {
    Flat(SignatureWire),
    Data { data: SignatureWire },
}

#[derive(Debug, Deserialize)]
struct ConfirmWire {
    #[serde(alias = "file_id")]
    id: WireId,
    #[serde(alias = "file_name")]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConfirmPayload {
    Flat(ConfirmWire),
    File { file: ConfirmWire },
    Data { data: ConfirmWire },
}

#[derive(Debug, Deserialize)]
struct StatusWire {
    #[serde(alias = "processing_status")]
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusPayload {
    Flat(StatusWire),
    File { file: StatusWire },
    Data { data: StatusWire },
}

#[derive(Debug, Deserialize)]
struct UserWire {
    id: WireId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserPayload {
    Wrapped { user: UserWire },
    Flat(UserWire),
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    #[serde(rename = "authToken", alias = "auth_token", alias = "token")]
    auth_token: String,
}

// ============================================================================
// Canonical parsers
// ============================================================================

fn parse<T: DeserializeOwned>(what: &'static str, body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|_| BackendError::shape(what, body))
}

fn status_word(what: &'static str, raw: &str) -> Result<ProcessingStatus, BackendError> {
    ProcessingStatus::from_wire(raw).ok_or_else(|| BackendError::shape(what, raw))
}

pub fn projects(body: &str) -> Result<Vec<Project>, BackendError> {
    let payload: ListPayload<ProjectWire> = parse("project list", body)?;
    Ok(payload
        .into_vec()
        .into_iter()
        .map(|p| Project {
            id: p.id.into(),
            name: p.name,
            status: p.status,
            address: p.address,
        })
        .collect())
}

pub fn documents(body: &str) -> Result<Vec<Document>, BackendError> {
    let payload: ListPayload<DocumentWire> = parse("document list", body)?;
    payload
        .into_vec()
        .into_iter()
        .map(|d| {
            // Legacy rows carry no status; anything present must be a known word
            let status = match d.status.as_deref() {
                Some(raw) => status_word("document status", raw)?,
                None => ProcessingStatus::Pending,
            };
            Ok(Document {
                id: d.id.into(),
                name: d.name,
                doc_type: d.doc_type,
                size: d.size,
                uploaded_at: d.uploaded_at.as_ref().and_then(WireTimestamp::to_utc),
                status: DocumentStatus::from(status),
                project_id: d.project_id.map(String::from),
            })
        })
        .collect()
}

pub fn upload_signature(body: &str) -> Result<UploadSignature, BackendError> {
    let wire = match parse::<SignaturePayload>("upload signature", body)? {
        SignaturePayload::Flat(w) | SignaturePayload::Data { data: w } => w,
    };
    if wire.upload_url.is_empty() {
        return Err(BackendError::shape("upload signature", body));
    }
    Ok(UploadSignature {
        upload_url: wire.upload_url,
        upload_id: wire.upload_id.into(),
        headers: wire.headers,
    })
}

pub fn confirmed_upload(body: &str) -> Result<ConfirmedUpload, BackendError> {
    let wire = match parse::<ConfirmPayload>("upload confirmation", body)? {
        ConfirmPayload::Flat(w) | ConfirmPayload::File { file: w } | ConfirmPayload::Data { data: w } => w,
    };
    Ok(ConfirmedUpload {
        file_id: wire.id.into(),
        name: wire.name,
    })
}

pub fn file_status(body: &str) -> Result<ProcessingStatus, BackendError> {
    let wire = match parse::<StatusPayload>("file status", body)? {
        StatusPayload::Flat(w) | StatusPayload::File { file: w } | StatusPayload::Data { data: w } => w,
    };
    status_word("file status", &wire.status)
}

pub fn user(body: &str) -> Result<User, BackendError> {
    let wire = match parse::<UserPayload>("user", body)? {
        UserPayload::Wrapped { user } | UserPayload::Flat(user) => user,
    };
    Ok(User {
        id: wire.id.into(),
        name: wire.name,
        email: wire.email,
    })
}

pub fn auth_token(body: &str) -> Result<AuthToken, BackendError> {
    let payload: LoginPayload = parse("login", body)?;
    if payload.auth_token.is_empty() {
        return Err(BackendError::shape("login", body));
    }
    Ok(AuthToken(payload.auth_token))
}
