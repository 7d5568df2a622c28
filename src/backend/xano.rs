use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use super::models::{
    AuthToken, ConfirmRequest, ConfirmedUpload, Document, ProcessingStatus, Project,
    SignatureRequest, UploadSignature, User,
};
use super::{normalize, Backend, BackendError};
use crate::config::BackendConfig;

/// Xano REST backend.
pub struct XanoClient {
    base_url: Url,
    client: Client,
}

impl XanoClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BackendError::Transport(format!("invalid backend URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Transport(format!(
                "backend URL cannot carry a path: {base_url}"
            )));
        }

        Ok(Self { base_url, client })
    }

    /// Append path segments to the base URL. Each segment is escaped on its
    /// own, so an id containing `/` or `..` stays a single segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and return the body text of a successful response.
    async fn send(&self, what: &str, req: RequestBuilder) -> Result<String, BackendError> {
        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("{what}: {e}")))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized);
        }

        if !status.is_success() {
            let body = error_body(resp.text().await);
            tracing::debug!(status = status.as_u16(), what, "Backend request failed");
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }

        resp.text()
            .await
            .map_err(|e| BackendError::Transport(format!("{what}: {e}")))
    }

    fn authed(&self, req: RequestBuilder, token: &AuthToken) -> RequestBuilder {
        req.bearer_auth(token.as_str())
    }
}

fn error_body(read: Result<String, reqwest::Error>) -> String {
    read.unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}

/// Ids are interpolated into backend paths and must name exactly one segment.
fn path_id<'a>(what: &'static str, id: &'a str) -> Result<&'a str, BackendError> {
    if id.trim().is_empty() || id == "." || id == ".." {
        return Err(BackendError::InvalidId {
            what,
            id: id.to_string(),
        });
    }
    Ok(id)
}

#[async_trait]
impl Backend for XanoClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, BackendError> {
        let req = self
            .client
            .post(self.url(&["auth", "login"]))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let body = self.send("login", req).await?;
        normalize::auth_token(&body)
    }

    async fn me(&self, token: &AuthToken) -> Result<User, BackendError> {
        let req = self.authed(self.client.get(self.url(&["auth", "me"])), token);
        let body = self.send("auth/me", req).await?;
        normalize::user(&body)
    }

    async fn list_projects(&self, token: &AuthToken) -> Result<Vec<Project>, BackendError> {
        let req = self.authed(self.client.get(self.url(&["projects"])), token);
        let body = self.send("projects", req).await?;
        normalize::projects(&body)
    }

    async fn list_documents(
        &self,
        token: &AuthToken,
        project_id: &str,
    ) -> Result<Vec<Document>, BackendError> {
        let project_id = path_id("project", project_id)?;
        let url = self.url(&["projects", project_id, "documents"]);
        let req = self.authed(self.client.get(url), token);
        let body = self.send("documents", req).await?;
        normalize::documents(&body)
    }

    async fn upload_signature(
        &self,
        token: &AuthToken,
        req: &SignatureRequest,
    ) -> Result<UploadSignature, BackendError> {
        let builder = self.authed(self.client.post(self.url(&["upload", "signature"])), token);
        let body = self.send("upload signature", builder.json(req)).await?;
        normalize::upload_signature(&body)
    }

    async fn put_object(
        &self,
        signature: &UploadSignature,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError> {
        let mut req = self
            .client
            .put(&signature.upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type);
        for (name, value) in &signature.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        // A rejected presigned PUT means an expired or mismatched signature, not a bad session
        match self.send("object PUT", req.body(data)).await {
            Ok(_) => Ok(()),
            Err(BackendError::Unauthorized) => Err(BackendError::Http {
                status: StatusCode::FORBIDDEN.as_u16(),
                body: "upload target rejected the signature".to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn confirm_upload(
        &self,
        token: &AuthToken,
        req: &ConfirmRequest,
    ) -> Result<ConfirmedUpload, BackendError> {
        let builder = self.authed(self.client.post(self.url(&["upload", "confirm"])), token);
        let body = self.send("upload confirm", builder.json(req)).await?;
        normalize::confirmed_upload(&body)
    }

    async fn file_status(
        &self,
        token: &AuthToken,
        file_id: &str,
    ) -> Result<ProcessingStatus, BackendError> {
        let file_id = path_id("file", file_id)?;
        let url = self.url(&["files", file_id, "status"]);
        let req = self.authed(self.client.get(url), token);
        let body = self.send("file status", req).await?;
        normalize::file_status(&body)
    }
}
