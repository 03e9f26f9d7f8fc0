//! # streamroute - Conditional document routing for hierarchical log streams
//!
//! streamroute decides, at ingestion time, which descendant of a named
//! stream should receive and persist an arbitrary JSON log document. The
//! decision is driven by a tree of declarative fork rules: each stream
//! carries an ordered list of `(child, condition)` pairs, and a document
//! descends level by level, first matching rule wins, until a level yields
//! no match. The document is persisted exactly once, at the deepest stream
//! reached.
//!
//! ## Core Concepts
//!
//! - **Stream**: a named, hierarchically-addressed (`logs.nginx.access`)
//!   append-only document collection
//! - **Fork**: declaring a child stream under a parent, gated by a condition
//! - **Condition**: a boolean predicate over document fields, with
//!   type-coercing comparison across heterogeneous JSON scalars
//! - **Routing**: walking fork rules to select the terminal stream
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use streamroute::{Condition, InMemoryStreamStore, StreamEngine};
//!
//! let engine = StreamEngine::new(Arc::new(InMemoryStreamStore::new()));
//! engine.enable()?;
//! engine.fork("logs", "logs.nginx", Condition::eq("log.logger", "nginx"))?;
//!
//! let outcome = engine.route("logs", serde_json::json!({
//!     "log.logger": "nginx",
//!     "log.level": "info",
//! }))?;
//! assert_eq!(outcome.destination.as_str(), "logs.nginx");
//! # Ok::<(), streamroute::StreamError>(())
//! ```
//!
//! The durable storage engine is an external collaborator consumed through
//! the [`StreamStore`] trait; [`InMemoryStreamStore`] is the bundled
//! reference backend.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod coerce;
pub mod condition;
pub mod document;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod router;
pub mod storage;
pub mod stream;
pub mod tree;
pub mod value;

// Re-export primary types at crate root for convenience
pub use condition::{Condition, ConditionError, Operator};
pub use document::{Document, DocumentError};
pub use engine::{StreamEngine, ROOT_STREAM};
pub use error::{DeclareError, ForkError, RouteError, StreamError, StreamResult};
pub use normalize::normalize;
pub use router::{RouteOutcome, Router};
pub use storage::{DocumentId, InMemoryStreamStore, StoreError, StoredDocument, StreamStore};
pub use stream::{StreamName, StreamNameError};
pub use tree::{ForkRule, RoutingTree};
pub use value::Value;
