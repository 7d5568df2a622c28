//! Shared test helpers: an in-memory backend double and a ready AppState.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::backend::models::{
    AuthToken, ConfirmRequest, ConfirmedUpload, Document, DocumentStatus, ProcessingStatus,
    Project, SignatureRequest, UploadSignature, User,
};
use crate::backend::{Backend, BackendError};
use crate::config::{BackendConfig, Config, ServerConfig, UploadConfig};
use crate::AppState;

pub const TEST_TOKEN: &str = "tok-123";
pub const TEST_EMAIL: &str = "admin@example.com";
pub const TEST_PASSWORD: &str = "secret";

pub fn token() -> AuthToken {
    AuthToken(TEST_TOKEN.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Signature,
    Put,
    Confirm,
    Status,
}

/// One scripted answer from the status endpoint.
#[derive(Debug, Clone, Copy)]
pub enum StatusReply {
    Is(ProcessingStatus),
    Error,
}

#[derive(Default)]
struct MockState {
    steps: Vec<(String, Step)>,
    stored: HashMap<String, Bytes>,
    scripts: HashMap<String, VecDeque<StatusReply>>,
    status_calls: HashMap<String, u32>,
}

/// In-memory backend. Files are keyed by relative path when present, else name.
pub struct MockBackend {
    state: Mutex<MockState>,
    default_status: StatusReply,
    fail_signature: HashSet<String>,
    fail_put: HashMap<String, u16>,
    document_calls: AtomicU32,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            default_status: StatusReply::Is(ProcessingStatus::Completed),
            fail_signature: HashSet::new(),
            fail_put: HashMap::new(),
            document_calls: AtomicU32::new(0),
        }
    }

    pub fn with_default_status(mut self, reply: StatusReply) -> Self {
        self.default_status = reply;
        self
    }

    pub fn with_status_script(self, key: &str, replies: Vec<StatusReply>) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(key.to_string(), replies.into());
        self
    }

    pub fn fail_signature_for(mut self, key: &str) -> Self {
        self.fail_signature.insert(key.to_string());
        self
    }

    pub fn fail_put_for(mut self, key: &str, status: u16) -> Self {
        self.fail_put.insert(key.to_string(), status);
        self
    }

    pub fn steps_for(&self, key: &str) -> Vec<Step> {
        self.state
            .lock()
            .unwrap()
            .steps
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, s)| *s)
            .collect()
    }

    /// Keys in the order their signature was requested.
    pub fn upload_order(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .steps
            .iter()
            .filter(|(_, s)| *s == Step::Signature)
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn stored(&self, key: &str) -> Option<Bytes> {
        self.state.lock().unwrap().stored.get(key).cloned()
    }

    pub fn status_calls(&self, key: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .status_calls
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn document_calls(&self) -> u32 {
        self.document_calls.load(Ordering::SeqCst)
    }

    fn record(&self, key: &str, step: Step) {
        self.state
            .lock()
            .unwrap()
            .steps
            .push((key.to_string(), step));
    }

    fn check_token(token: &AuthToken) -> Result<(), BackendError> {
        if token.as_str() == TEST_TOKEN {
            Ok(())
        } else {
            Err(BackendError::Unauthorized)
        }
    }
}

fn key_of(name: &str, relative_path: &Option<String>) -> String {
    relative_path.clone().unwrap_or_else(|| name.to_string())
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, BackendError> {
        if email == TEST_EMAIL && password == TEST_PASSWORD {
            Ok(token())
        } else {
            Err(BackendError::Unauthorized)
        }
    }

    async fn me(&self, token: &AuthToken) -> Result<User, BackendError> {
        Self::check_token(token)?;
        Ok(User {
            id: "1".to_string(),
            name: Some("Site Admin".to_string()),
            email: Some(TEST_EMAIL.to_string()),
        })
    }

    async fn list_projects(&self, token: &AuthToken) -> Result<Vec<Project>, BackendError> {
        Self::check_token(token)?;
        Ok(vec![
            Project {
                id: "p1".to_string(),
                name: "Harbor Tower".to_string(),
                status: Some("active".to_string()),
                address: None,
            },
            Project {
                id: "p2".to_string(),
                name: "Mill Street Clinic".to_string(),
                status: None,
                address: Some("12 Mill St".to_string()),
            },
        ])
    }

    async fn list_documents(
        &self,
        token: &AuthToken,
        project_id: &str,
    ) -> Result<Vec<Document>, BackendError> {
        Self::check_token(token)?;
        if project_id == "missing" {
            return Err(BackendError::Http {
                status: 404,
                body: "project not found".to_string(),
            });
        }
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Document {
            id: "d1".to_string(),
            name: "report.pdf".to_string(),
            doc_type: Some("pdf".to_string()),
            size: Some(2 * 1024 * 1024),
            uploaded_at: None,
            status: DocumentStatus::Completed,
            project_id: Some(project_id.to_string()),
        }])
    }

    async fn upload_signature(
        &self,
        token: &AuthToken,
        req: &SignatureRequest,
    ) -> Result<UploadSignature, BackendError> {
        Self::check_token(token)?;
        let key = key_of(&req.file_name, &req.relative_path);
        self.record(&key, Step::Signature);
        if self.fail_signature.contains(&key) {
            return Err(BackendError::Http {
                status: 400,
                body: "signature refused".to_string(),
            });
        }
        Ok(UploadSignature {
            upload_url: format!("https://storage.test/{key}"),
            upload_id: key,
            headers: HashMap::new(),
        })
    }

    async fn put_object(
        &self,
        signature: &UploadSignature,
        _content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError> {
        let key = signature.upload_id.clone();
        self.record(&key, Step::Put);
        if let Some(status) = self.fail_put.get(&key) {
            return Err(BackendError::Http {
                status: *status,
                body: "object store rejected PUT".to_string(),
            });
        }
        self.state.lock().unwrap().stored.insert(key, data);
        Ok(())
    }

    async fn confirm_upload(
        &self,
        token: &AuthToken,
        req: &ConfirmRequest,
    ) -> Result<ConfirmedUpload, BackendError> {
        Self::check_token(token)?;
        self.record(&req.upload_id, Step::Confirm);
        Ok(ConfirmedUpload {
            file_id: format!("file-{}", req.upload_id),
            name: req.file_name.clone(),
        })
    }

    async fn file_status(
        &self,
        token: &AuthToken,
        file_id: &str,
    ) -> Result<ProcessingStatus, BackendError> {
        Self::check_token(token)?;
        let key = file_id.strip_prefix("file-").unwrap_or(file_id).to_string();

        let reply = {
            let mut state = self.state.lock().unwrap();
            state.steps.push((key.clone(), Step::Status));
            *state.status_calls.entry(key.clone()).or_insert(0) += 1;
            state
                .scripts
                .get_mut(&key)
                .and_then(|s| s.pop_front())
                .unwrap_or(self.default_status)
        };

        match reply {
            StatusReply::Is(status) => Ok(status),
            StatusReply::Error => Err(BackendError::Transport("connection reset".to_string())),
        }
    }
}

/// Fast poll policy for tests that run on real time.
pub fn fast_upload_config() -> UploadConfig {
    UploadConfig {
        poll_interval_ms: 1,
        poll_max_attempts: 20,
        poll_max_errors: 5,
        poll_backoff_max_ms: 4,
    }
}

/// Create a test AppState around the given backend double.
pub fn test_state(backend: Arc<MockBackend>) -> Arc<AppState> {
    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            max_upload_size: 10 * 1024 * 1024, // 10MB for tests
            secure_cookies: false,
        },
        backend: BackendConfig {
            base_url: "http://backend.test".to_string(),
            request_timeout: Duration::from_secs(5),
        },
        upload: fast_upload_config(),
        document_cache_ttl: Duration::from_secs(60),
    };

    Arc::new(AppState::new(config, backend))
}
