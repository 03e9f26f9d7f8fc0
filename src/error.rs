//! Error types for streamroute.
//!
//! All errors are strongly typed using thiserror, layered per operation
//! (declare / fork / route) with a top-level [`StreamError`] that each layer
//! converts into. Everything here is recoverable and reported to the
//! caller; nothing is fatal to the process. Note that condition-evaluation
//! "failures" (missing field, type mismatch) are defined as non-matches and
//! never appear here.

use thiserror::Error;

use crate::condition::ConditionError;
use crate::document::DocumentError;
use crate::storage::StoreError;
use crate::stream::StreamNameError;

/// Errors from declaring a stream.
#[derive(Debug, Error)]
pub enum DeclareError {
    /// The stream name is already taken.
    #[error("Stream already exists: {name}")]
    AlreadyExists {
        name: String,
    },

    /// The stream name failed validation.
    #[error(transparent)]
    InvalidName(#[from] StreamNameError),
}

/// Errors from forking a stream.
#[derive(Debug, Error)]
pub enum ForkError {
    /// The parent stream was never declared.
    #[error("Unknown parent stream: {parent}")]
    UnknownParent {
        parent: String,
    },

    /// A fork rule targeting this child already exists under the parent.
    #[error("Duplicate child stream under {parent}: {child}")]
    DuplicateChild {
        parent: String,
        child: String,
    },

    /// The child name is not a direct child of the parent.
    #[error("'{child}' is not a direct child of '{parent}'")]
    InvalidChildName {
        parent: String,
        child: String,
    },

    /// The child name failed validation.
    #[error(transparent)]
    InvalidName(#[from] StreamNameError),
}

/// Errors from routing a document.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The entry stream was never declared.
    #[error("Unknown entry stream: {stream}")]
    UnknownStream {
        stream: String,
    },

    /// The final append failed; surfaced unmodified, never retried.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Top-level error type for streamroute.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Declaring a stream failed.
    #[error("Declare error: {0}")]
    Declare(#[from] DeclareError),

    /// Forking a stream failed.
    #[error("Fork error: {0}")]
    Fork(#[from] ForkError),

    /// Routing a document failed.
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// A wire-format condition failed validation.
    #[error("Invalid condition: {0}")]
    Condition(#[from] ConditionError),

    /// A raw document failed validation.
    #[error("Invalid document: {0}")]
    Document(#[from] DocumentError),

    /// A direct store read failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl StreamError {
    /// Returns true if this is a fork error.
    #[must_use]
    pub const fn is_fork(&self) -> bool {
        matches!(self, Self::Fork(_))
    }

    /// Returns true if this is a route error.
    #[must_use]
    pub const fn is_route(&self) -> bool {
        matches!(self, Self::Route(_))
    }

    /// Returns true if this error can succeed on retry.
    ///
    /// Elapsed deadlines and opaque backend failures may clear up; every
    /// other variant is a caller mistake that will not change.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Route(RouteError::Store(e)) | Self::Store(e) => {
                matches!(e, StoreError::DeadlineExceeded { .. } | StoreError::Backend(_))
            }
            _ => false,
        }
    }
}

/// Result type alias for streamroute operations.
pub type StreamResult<T> = Result<T, StreamError>;
