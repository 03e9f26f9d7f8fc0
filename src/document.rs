//! Documents: the JSON payloads routed between streams.
//!
//! A document is a mapping from field name to JSON value. Field names may
//! be dotted paths; lookup resolves a literal top-level key first (the wire
//! shape used by log shippers, e.g. `"log.logger": "nginx"`) and falls back
//! to nested-object traversal (`{"log": {"logger": "nginx"}}`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building a document from raw JSON.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Documents must be JSON objects at the top level.
    #[error("Document must be a JSON object, got {got}")]
    NotAnObject {
        got: String,
    },
}

/// A routable JSON document.
///
/// Immutable once normalized for a single routing pass; the router never
/// rewrites field values, only decides the destination.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from a JSON value, which must be an object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, DocumentError> {
        match json {
            serde_json::Value::Object(fields) => Ok(Self { fields }),
            other => Err(DocumentError::NotAnObject {
                got: other.to_string(),
            }),
        }
    }

    /// Consumes the document, returning its fields as a JSON object.
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        serde_json::Value::Object(self.fields)
    }

    /// Sets a top-level field, replacing any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.fields.insert(key.into(), value);
    }

    /// Looks up a literal top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }

    /// Removes a top-level field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.fields.remove(key)
    }

    /// Looks up a field by dotted path.
    ///
    /// A literal top-level key wins over nested traversal, so a document
    /// carrying the flattened key `"log.logger"` and one carrying
    /// `{"log": {"logger": ...}}` both resolve. Any missing intermediate
    /// level yields absent.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&serde_json::Value> {
        if let Some(value) = self.fields.get(path) {
            return Some(value);
        }

        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over top-level fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.fields.iter()
    }

    pub(crate) fn fields(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.fields
    }

    pub(crate) fn from_fields(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { fields }
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_json::Value::Object(self.fields.clone()))
    }
}
