//! The stream engine: the public surface an ingestion pipeline calls.
//!
//! Ties the routing tree, the normalizer-driven router, and the stream
//! store together behind one handle. All methods are safe to call from any
//! number of threads.

use std::sync::Arc;
use std::time::Instant;

use crate::condition::Condition;
use crate::document::Document;
use crate::error::{DeclareError, StreamResult};
use crate::router::{RouteOutcome, Router};
use crate::storage::{DocumentId, StoredDocument, StreamStore};
use crate::stream::StreamName;
use crate::tree::RoutingTree;

/// Default root stream bootstrapped by [`StreamEngine::enable`].
pub const ROOT_STREAM: &str = "logs";

/// Conditional document routing engine.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use streamroute::{Condition, InMemoryStreamStore, StreamEngine};
///
/// let engine = StreamEngine::new(Arc::new(InMemoryStreamStore::new()));
/// engine.enable().unwrap();
/// engine
///     .fork("logs", "logs.nginx", Condition::eq("log.logger", "nginx"))
///     .unwrap();
///
/// let outcome = engine
///     .route("logs", serde_json::json!({"log.logger": "nginx"}))
///     .unwrap();
/// assert_eq!(outcome.destination.as_str(), "logs.nginx");
/// ```
#[derive(Clone)]
pub struct StreamEngine {
    tree: Arc<RoutingTree>,
    store: Arc<dyn StreamStore>,
    router: Router,
}

impl StreamEngine {
    /// Creates an engine over the given store with an empty routing tree.
    #[must_use]
    pub fn new(store: Arc<dyn StreamStore>) -> Self {
        let tree = Arc::new(RoutingTree::new());
        let router = Router::new(Arc::clone(&tree), Arc::clone(&store));
        Self {
            tree,
            store,
            router,
        }
    }

    /// Bootstraps the engine by declaring the [`ROOT_STREAM`].
    ///
    /// Idempotent; returns whether the root was newly created.
    pub fn enable(&self) -> StreamResult<bool> {
        match self.tree.declare(ROOT_STREAM) {
            Ok(_) => Ok(true),
            Err(DeclareError::AlreadyExists { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Declares a new root or standalone stream.
    pub fn declare_stream(&self, name: &str) -> StreamResult<StreamName> {
        Ok(self.tree.declare(name)?)
    }

    /// Forks `parent` into `child`, gated by `condition`.
    pub fn fork(&self, parent: &str, child: &str, condition: Condition) -> StreamResult<()> {
        Ok(self.tree.fork(parent, child, condition)?)
    }

    /// Forks with a wire-format condition, validating it first.
    ///
    /// Malformed conditions (unknown operator, bad combinator shape) fail
    /// here rather than being accepted and silently never matching.
    pub fn fork_json(
        &self,
        parent: &str,
        child: &str,
        condition: &serde_json::Value,
    ) -> StreamResult<()> {
        let condition = Condition::from_json(condition)?;
        self.fork(parent, child, condition)
    }

    /// Routes a raw JSON document arriving at `entry`.
    pub fn route(&self, entry: &str, raw: serde_json::Value) -> StreamResult<RouteOutcome> {
        let document = Document::from_json(raw)?;
        Ok(self.router.route(entry, document)?)
    }

    /// Routes with a caller-supplied deadline for the final append.
    pub fn route_with_deadline(
        &self,
        entry: &str,
        raw: serde_json::Value,
        deadline: Option<Instant>,
    ) -> StreamResult<RouteOutcome> {
        let document = Document::from_json(raw)?;
        Ok(self.router.route_with_deadline(entry, document, deadline)?)
    }

    /// Reads a routed document back from the store.
    pub fn get_document(&self, stream: &str, id: DocumentId) -> StreamResult<StoredDocument> {
        Ok(self.store.get(stream, id)?)
    }

    /// All known stream names, sorted.
    #[must_use]
    pub fn streams(&self) -> Vec<StreamName> {
        self.tree.streams()
    }

    /// Get a reference to the routing tree.
    #[must_use]
    pub fn tree(&self) -> &Arc<RoutingTree> {
        &self.tree
    }

    /// Get a reference to the stream store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn StreamStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::StreamError;
    use crate::storage::InMemoryStreamStore;

    fn engine() -> StreamEngine {
        StreamEngine::new(Arc::new(InMemoryStreamStore::new()))
    }

    #[test]
    fn test_enable_is_idempotent() {
        let engine = engine();
        assert!(engine.enable().unwrap());
        assert!(!engine.enable().unwrap());
        assert!(engine.tree().contains(ROOT_STREAM));
    }

    #[test]
    fn test_fork_json_validates_condition() {
        let engine = engine();
        engine.enable().unwrap();

        let err = engine
            .fork_json(
                "logs",
                "logs.nginx",
                &serde_json::json!({"field": "code", "operator": "matches", "value": "5.."}),
            )
            .unwrap_err();
        assert!(matches!(err, StreamError::Condition(_)));
        // Nothing was registered.
        assert!(!engine.tree().contains("logs.nginx"));
    }

    #[test]
    fn test_route_rejects_non_object_documents() {
        let engine = engine();
        engine.enable().unwrap();
        let err = engine.route("logs", serde_json::json!("just a string")).unwrap_err();
        assert!(matches!(err, StreamError::Document(_)));
    }

    #[test]
    fn test_route_and_read_back() {
        let engine = engine();
        engine.enable().unwrap();
        engine
            .fork_json(
                "logs",
                "logs.nginx",
                &serde_json::json!({"field": "log.logger", "operator": "eq", "value": "nginx"}),
            )
            .unwrap();

        let outcome = engine
            .route("logs", serde_json::json!({"log.logger": "nginx", "code": 200}))
            .unwrap();
        assert_eq!(outcome.destination.as_str(), "logs.nginx");

        let stored = engine
            .get_document("logs.nginx", outcome.document_id)
            .unwrap();
        assert_eq!(
            stored.document.get("log.logger"),
            Some(&serde_json::json!("nginx"))
        );
    }

    #[test]
    fn test_engine_shares_a_store_handle_with_the_caller() {
        // Callers keep their own handle on the store and read counts
        // through the trait after routing.
        let store = Arc::new(InMemoryStreamStore::new());
        let engine = StreamEngine::new(store.clone() as Arc<dyn StreamStore>);
        engine.enable().unwrap();

        let outcome = engine.route("logs", serde_json::json!({"a": 1})).unwrap();
        assert_eq!(outcome.destination.as_str(), "logs");
        assert_eq!(store.count("logs").unwrap(), 1);
    }

    #[test]
    fn test_streams_listing() {
        let engine = engine();
        engine.enable().unwrap();
        engine
            .fork("logs", "logs.nginx", Condition::eq("log.logger", "nginx"))
            .unwrap();
        let names: Vec<String> = engine.streams().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["logs", "logs.nginx"]);
    }
}
