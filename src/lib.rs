//! pocketboss - admin service for construction project documents
//!
//! This crate provides:
//! - A presigned upload pipeline (signature, PUT, confirm, status polling)
//!   driven by an accumulating upload session with folder-tree merging
//! - A normalizing client for the hosted backend that owns all persistence
//! - An HTTP surface with cookie auth, dashboard route gating and project proxies

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod upload;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use backend::Backend;
use cache::TabCache;
use config::Config;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn Backend>,
    pub cache: TabCache,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        let cache = TabCache::new(config.document_cache_ttl);
        Self {
            config,
            backend,
            cache,
        }
    }
}
