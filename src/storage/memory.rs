//! In-memory stream store backend.
//!
//! Thread-safe reference implementation of [`StreamStore`] for embedded
//! usage and tests. Streams are created lazily on first append.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use chrono::Utc;

use crate::document::Document;
use crate::storage::traits::{DocumentId, StoreError, StoredDocument, StreamStore};

fn lock_err(context: &'static str) -> StoreError {
    StoreError::Backend(format!("poisoned lock: {context}"))
}

/// In-memory [`StreamStore`] backed by a `RwLock`-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryStreamStore {
    streams: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl InMemoryStreamStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all documents appended to a stream, in append order.
    pub fn documents(&self, stream: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let guard = self.streams.read().map_err(|_| lock_err("documents"))?;
        Ok(guard.get(stream).cloned().unwrap_or_default())
    }
}

impl StreamStore for InMemoryStreamStore {
    fn append(
        &self,
        stream: &str,
        document: Document,
        deadline: Option<Instant>,
    ) -> Result<DocumentId, StoreError> {
        // This backend never blocks; the deadline can only already be past.
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(StoreError::DeadlineExceeded {
                stream: stream.to_string(),
            });
        }

        let id = DocumentId::new();
        let stored = StoredDocument {
            id,
            stream: stream.to_string(),
            document,
            ingested_at: Utc::now(),
        };

        let mut guard = self.streams.write().map_err(|_| lock_err("append"))?;
        guard.entry(stream.to_string()).or_default().push(stored);
        Ok(id)
    }

    fn get(&self, stream: &str, id: DocumentId) -> Result<StoredDocument, StoreError> {
        let guard = self.streams.read().map_err(|_| lock_err("get"))?;
        let documents = guard.get(stream).ok_or_else(|| StoreError::StreamNotFound {
            stream: stream.to_string(),
        })?;
        documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| StoreError::DocumentNotFound {
                stream: stream.to_string(),
                id,
            })
    }

    fn count(&self, stream: &str) -> Result<usize, StoreError> {
        let guard = self.streams.read().map_err(|_| lock_err("count"))?;
        Ok(guard.get(stream).map_or(0, Vec::len))
    }
}
