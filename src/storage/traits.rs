//! Abstract stream store trait.
//!
//! Backends provide durable append-only persistence keyed by stream name.
//! Per-stream ordering is not guaranteed; callers rely on eventual
//! read-after-write visibility and poll with bounded retries.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::document::Document;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No documents have been appended to this stream.
    #[error("Stream not found in store: {stream}")]
    StreamNotFound {
        stream: String,
    },

    /// The document is not present in the stream.
    #[error("Document not found: stream={stream} id={id}")]
    DocumentNotFound {
        stream: String,
        id: DocumentId,
    },

    /// The caller-supplied deadline elapsed before the append completed.
    ///
    /// Never retried internally; retry policy belongs to the caller.
    #[error("Append deadline exceeded for stream {stream}")]
    DeadlineExceeded {
        stream: String,
    },

    /// Opaque backend failure, surfaced unmodified.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Unique identifier assigned to a document on append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new random document ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A document as persisted in a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Identifier assigned on append.
    pub id: DocumentId,
    /// Stream the document was persisted to.
    pub stream: String,
    /// The normalized document body.
    pub document: Document,
    /// When the store accepted the append.
    pub ingested_at: DateTime<Utc>,
}

/// Durable append-only storage keyed by stream name.
///
/// # Safety Considerations
/// - Appends to distinct streams are independent
/// - Implementations should handle concurrent access safely
pub trait StreamStore: Send + Sync {
    /// Appends a document to a stream, creating the stream on first use.
    ///
    /// `deadline` is a caller-supplied cancellation point: a backend that
    /// cannot complete the append in time reports
    /// [`StoreError::DeadlineExceeded`] instead of retrying.
    fn append(
        &self,
        stream: &str,
        document: Document,
        deadline: Option<Instant>,
    ) -> Result<DocumentId, StoreError>;

    /// Reads a document back by ID.
    fn get(&self, stream: &str, id: DocumentId) -> Result<StoredDocument, StoreError>;

    /// Number of documents appended to a stream (0 if never written).
    fn count(&self, stream: &str) -> Result<usize, StoreError>;
}
