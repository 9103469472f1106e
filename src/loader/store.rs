//! Document stores used in place of the filesystem.
//!
//! A store maps slash-separated keys (for example `/services/api/main.conf`)
//! to raw relaxed-JSON documents. Coordination services such as ZooKeeper or
//! etcd plug in by implementing [`DocumentStore`].

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors reported by a document store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no document stored at '{0}'")]
    NotFound(String),

    #[error("failed to connect to store: {0}")]
    Connect(String),

    #[error("failed to fetch '{key}': {message}")]
    Fetch { key: String, message: String },
}

/// A backend that serves raw configuration documents by key.
pub trait DocumentStore: Send + Sync {
    /// Fetch the raw document stored under `key`.
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Human readable description used in logs.
    fn describe(&self) -> String {
        "document store".to_string()
    }
}

/// Thread-safe in-memory document store.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the document under `key`.
    pub fn insert(&self, key: impl Into<String>, document: impl Into<Vec<u8>>) {
        self.documents.write().insert(key.into(), document.into());
    }

    /// Remove the document under `key`, returning whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.documents.write().remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.documents
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn describe(&self) -> String {
        format!("memory store ({} documents)", self.len())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let documents = self.documents.read();
        let mut keys: Vec<&String> = documents.keys().collect();
        keys.sort();
        f.debug_struct("MemoryStore").field("keys", &keys).finish()
    }
}
