use std::time::Duration;

use thiserror::Error;

use crate::upload::PollPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub upload: UploadConfig,
    /// How long a cached document list stays fresh
    pub document_cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Maximum multipart body accepted by the upload endpoint, in bytes
    pub max_upload_size: u64,
    /// Mark the auth cookie `Secure`. Off for local http development.
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the hosted backend, without a trailing slash.
    pub base_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub poll_interval_ms: u64,
    pub poll_max_attempts: u32,
    pub poll_max_errors: u32,
    pub poll_backoff_max_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_upload_size: 200 * 1024 * 1024,
            secure_cookies: false,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            poll_max_attempts: 300,
            poll_max_errors: 5,
            poll_backoff_max_ms: 30_000,
        }
    }
}

impl UploadConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.poll_max_attempts,
            max_consecutive_errors: self.poll_max_errors,
            backoff_max: Duration::from_millis(self.poll_backoff_max_ms),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = UploadConfig::default();

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // NEXT_PUBLIC_BACKEND_URL points local and AWS deployments at an alternate backend
        let base_url = std::env::var("NEXT_PUBLIC_BACKEND_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| std::env::var("XANO_BASE_URL").ok())
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();

        let request_timeout = Duration::from_secs(env_parse("BACKEND_TIMEOUT_SECS", 30));

        let max_upload_size = env_parse("MAX_UPLOAD_SIZE", 200 * 1024 * 1024);

        let secure_cookies = std::env::var("SECURE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let upload = UploadConfig {
            poll_interval_ms: env_parse("UPLOAD_POLL_INTERVAL_MS", defaults.poll_interval_ms),
            poll_max_attempts: env_parse("UPLOAD_POLL_MAX_ATTEMPTS", defaults.poll_max_attempts),
            poll_max_errors: env_parse("UPLOAD_POLL_MAX_ERRORS", defaults.poll_max_errors),
            poll_backoff_max_ms: env_parse(
                "UPLOAD_POLL_BACKOFF_MAX_MS",
                defaults.poll_backoff_max_ms,
            ),
        };

        let document_cache_ttl = Duration::from_secs(env_parse("DOCUMENT_CACHE_TTL_SECS", 30));

        let config = Config {
            server: ServerConfig {
                bind_address,
                max_upload_size,
                secure_cookies,
            },
            backend: BackendConfig {
                base_url,
                request_timeout,
            },
            upload,
            document_cache_ttl,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "XANO_BASE_URL (or NEXT_PUBLIC_BACKEND_URL) is required".to_string(),
            ));
        }

        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "backend URL must be http(s), got '{}'",
                self.backend.base_url
            )));
        }

        if self.upload.poll_max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "UPLOAD_POLL_MAX_ATTEMPTS must be greater than 0".to_string(),
            ));
        }

        if self.upload.poll_max_errors == 0 {
            return Err(ConfigError::ValidationError(
                "UPLOAD_POLL_MAX_ERRORS must be greater than 0".to_string(),
            ));
        }

        if self.backend.base_url.starts_with("http://") {
            tracing::warn!(
                "Backend URL {} is not TLS. Auth tokens will travel in clear text.",
                self.backend.base_url
            );
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
