//! Per-project document list cache backing the documents tab.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::backend::models::Document;

struct Entry {
    documents: Vec<Document>,
    fetched_at: Instant,
}

/// Typed store of document lists keyed by project id. Created with the
/// application state; entries expire after `ttl` and are dropped on `clear`.
pub struct TabCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl TabCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached documents for a project, if still fresh.
    pub fn documents(&self, project_id: &str) -> Option<Vec<Document>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(project_id)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.documents.clone())
    }

    pub fn set_documents(&self, project_id: &str, documents: Vec<Document>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            project_id.to_string(),
            Entry {
                documents,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, project_id: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.remove(project_id).is_some() {
            tracing::debug!(project_id, "Invalidated document cache");
        }
    }

    /// Drop every entry. Returns how many were held.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let count = entries.len();
        entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
