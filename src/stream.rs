//! Hierarchical stream names.
//!
//! A stream is identified by a `.`-separated name such as
//! `logs.nginx.access`. The prefix up to the last separator is the parent;
//! root streams have no parent. Names are globally unique and immutable
//! after creation, so the hierarchy is acyclic by construction.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when parsing a stream name.
#[derive(Debug, Error)]
pub enum StreamNameError {
    /// The name is empty or contains an empty segment (`logs..x`).
    #[error("Invalid stream name '{name}': {reason}")]
    Invalid {
        name: String,
        reason: &'static str,
    },
}

/// A validated, hierarchical stream name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamName(String);

impl StreamName {
    /// Parses and validates a stream name.
    ///
    /// Every `.`-separated segment must be non-empty.
    pub fn parse(name: impl Into<String>) -> Result<Self, StreamNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(StreamNameError::Invalid {
                name,
                reason: "name is empty",
            });
        }
        if name.split('.').any(str::is_empty) {
            return Err(StreamNameError::Invalid {
                name,
                reason: "name contains an empty segment",
            });
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the parent stream name, or `None` for a root stream.
    #[must_use]
    pub fn parent(&self) -> Option<StreamName> {
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| Self(parent.to_string()))
    }

    /// Whether this is a root stream (no `.` in the name).
    #[must_use]
    pub fn is_root(&self) -> bool {
        !self.0.contains('.')
    }

    /// Whether this name is a direct child of `parent`.
    ///
    /// Direct means exactly one additional segment: `logs.nginx` is a child
    /// of `logs`; `logs.nginx.access` is not.
    #[must_use]
    pub fn is_child_of(&self, parent: &str) -> bool {
        match self.0.strip_prefix(parent) {
            Some(rest) => {
                rest.len() > 1 && rest.starts_with('.') && !rest[1..].contains('.')
            }
            None => false,
        }
    }

    /// Builds the name of a direct child.
    pub fn child(&self, segment: &str) -> Result<StreamName, StreamNameError> {
        Self::parse(format!("{}.{segment}", self.0))
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StreamName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for StreamName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<StreamName> for String {
    fn from(name: StreamName) -> Self {
        name.0
    }
}
