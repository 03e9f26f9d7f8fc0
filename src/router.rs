//! The router: first-match-wins descent through the routing tree.
//!
//! Routing is a pure, non-blocking, in-memory computation over tree
//! snapshots; the only blocking work is the final append to the stream
//! store. Any number of `route` calls may run concurrently with each other
//! and with in-flight forks (a route racing a fork may miss the new rule;
//! callers poll for eventual visibility).

use std::sync::Arc;
use std::time::Instant;

use crate::document::Document;
use crate::error::RouteError;
use crate::normalize::normalize;
use crate::storage::{DocumentId, StreamStore};
use crate::stream::StreamName;
use crate::tree::RoutingTree;

/// Where a document ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    /// The terminal stream the document was persisted to.
    pub destination: StreamName,
    /// Store-assigned identifier of the persisted document.
    pub document_id: DocumentId,
}

/// Routes documents from an entry stream to their terminal stream.
#[derive(Clone)]
pub struct Router {
    tree: Arc<RoutingTree>,
    store: Arc<dyn StreamStore>,
}

impl Router {
    /// Creates a router over the given tree and store.
    #[must_use]
    pub fn new(tree: Arc<RoutingTree>, store: Arc<dyn StreamStore>) -> Self {
        Self { tree, store }
    }

    /// Routes a raw document arriving at `entry` and persists it once, at
    /// the deepest stream whose fork chain it matches.
    ///
    /// The document is normalized exactly once, then the tree is walked
    /// iteratively: at each level the first matching rule (insertion order)
    /// wins and descent restarts at that child's own rules; a level with no
    /// match terminates the walk. A document matching nothing below the
    /// entry stream is stored at the entry stream, never dropped.
    pub fn route(&self, entry: &str, raw: Document) -> Result<RouteOutcome, RouteError> {
        self.route_with_deadline(entry, raw, None)
    }

    /// Like [`Router::route`], with a caller-supplied deadline for the
    /// final append. A deadline failure surfaces as
    /// [`crate::storage::StoreError::DeadlineExceeded`]; the router never
    /// retries on the caller's behalf.
    pub fn route_with_deadline(
        &self,
        entry: &str,
        raw: Document,
        deadline: Option<Instant>,
    ) -> Result<RouteOutcome, RouteError> {
        let Some(mut rules) = self.tree.children(entry) else {
            return Err(RouteError::UnknownStream {
                stream: entry.to_string(),
            });
        };
        // Tree keys are validated on declare/fork, so a name that is in the
        // tree always parses.
        let mut current = StreamName::parse(entry).map_err(|_| RouteError::UnknownStream {
            stream: entry.to_string(),
        })?;

        let document = normalize(raw);

        loop {
            // First matching rule wins at each level; no match ends descent.
            let Some(rule) = rules.iter().find(|r| r.condition.evaluate(&document)) else {
                break;
            };
            tracing::trace!(
                from = %current,
                to = %rule.child,
                condition = %rule.condition,
                "fork rule matched"
            );
            current = rule.child.clone();
            // Forked children are always registered in the tree, so a
            // missing node here means the tree was corrupted, not a routing
            // miss; stop at the last known stream.
            match self.tree.children(current.as_str()) {
                Some(next) => rules = next,
                None => break,
            }
        }

        let id = self.store.append(current.as_str(), document, deadline)?;
        tracing::debug!(entry = %entry, destination = %current, id = %id, "routed document");
        Ok(RouteOutcome {
            destination: current,
            document_id: id,
        })
    }
}
