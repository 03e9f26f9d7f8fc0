//! The routing tree: streams and their ordered fork rules.
//!
//! The tree is read-mostly shared state. Each node's rule list is stored as
//! an `Arc<[ForkRule]>` snapshot that forks replace copy-on-write under the
//! writer lock, so routing reads never observe a partially-appended rule.
//! Forks serialize with each other; reads only hold the lock long enough to
//! clone the snapshot handle.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::condition::Condition;
use crate::error::{DeclareError, ForkError};
use crate::stream::StreamName;

/// A fork rule: route to `child` when `condition` matches.
///
/// Rules belong to exactly one parent; their order within the parent is
/// insertion order, which is also evaluation priority.
#[derive(Debug, Clone, PartialEq)]
pub struct ForkRule {
    /// Target child stream.
    pub child: StreamName,
    /// Gate condition for descending into the child.
    pub condition: Condition,
}

/// In-memory (durably backed by the caller) hierarchy of stream nodes.
#[derive(Debug, Default)]
pub struct RoutingTree {
    nodes: RwLock<HashMap<StreamName, Arc<[ForkRule]>>>,
}

fn empty_rules() -> Arc<[ForkRule]> {
    Arc::from(Vec::new())
}

impl RoutingTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The tree stays usable if a writer panicked mid-fork: rule lists are
    // replaced whole, so the map is always structurally consistent.
    fn read_nodes(&self) -> RwLockReadGuard<'_, HashMap<StreamName, Arc<[ForkRule]>>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_nodes(&self) -> RwLockWriteGuard<'_, HashMap<StreamName, Arc<[ForkRule]>>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Declares a new stream with no fork rules.
    pub fn declare(&self, name: &str) -> Result<StreamName, DeclareError> {
        let name = StreamName::parse(name)?;
        let mut nodes = self.write_nodes();
        if nodes.contains_key(&name) {
            return Err(DeclareError::AlreadyExists {
                name: name.to_string(),
            });
        }
        nodes.insert(name.clone(), empty_rules());
        tracing::debug!(stream = %name, "declared stream");
        Ok(name)
    }

    /// Adds a fork rule under `parent` targeting `child`, and registers the
    /// child as a stream of its own.
    ///
    /// The rule is appended after all existing rules of the parent, so
    /// earlier forks keep their priority. Atomic with respect to concurrent
    /// forks; a concurrent route either sees the rule list before or after
    /// this fork, never in between.
    pub fn fork(&self, parent: &str, child: &str, condition: Condition) -> Result<(), ForkError> {
        let child = StreamName::parse(child)?;
        if !child.is_child_of(parent) {
            return Err(ForkError::InvalidChildName {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }

        let mut nodes = self.write_nodes();
        let (parent_key, rules) =
            nodes
                .get_key_value(parent)
                .ok_or_else(|| ForkError::UnknownParent {
                    parent: parent.to_string(),
                })?;
        if rules.iter().any(|r| r.child == child) {
            return Err(ForkError::DuplicateChild {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }

        let parent_key = parent_key.clone();
        let mut next: Vec<ForkRule> = rules.iter().cloned().collect();
        next.push(ForkRule {
            child: child.clone(),
            condition,
        });
        nodes.insert(parent_key, Arc::from(next));
        nodes.entry(child.clone()).or_insert_with(empty_rules);
        tracing::debug!(parent = %parent, child = %child, "forked stream");
        Ok(())
    }

    /// Read-only snapshot of a stream's fork rules, in priority order.
    ///
    /// Returns `None` for a stream that was never declared.
    #[must_use]
    pub fn children(&self, name: &str) -> Option<Arc<[ForkRule]>> {
        self.read_nodes().get(name).map(Arc::clone)
    }

    /// Whether a stream exists in the tree.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read_nodes().contains_key(name)
    }

    /// All known stream names, sorted.
    #[must_use]
    pub fn streams(&self) -> Vec<StreamName> {
        let nodes = self.read_nodes();
        let mut names: Vec<StreamName> = nodes.keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_contains() {
        let tree = RoutingTree::new();
        tree.declare("logs").unwrap();
        assert!(tree.contains("logs"));
        assert!(!tree.contains("metrics"));
    }

    #[test]
    fn test_declare_duplicate() {
        let tree = RoutingTree::new();
        tree.declare("logs").unwrap();
        let err = tree.declare("logs").unwrap_err();
        assert!(matches!(err, DeclareError::AlreadyExists { .. }));
    }

    #[test]
    fn test_declare_invalid_name() {
        let tree = RoutingTree::new();
        assert!(matches!(
            tree.declare("logs..nginx"),
            Err(DeclareError::InvalidName(_))
        ));
    }

    #[test]
    fn test_fork_registers_child() {
        let tree = RoutingTree::new();
        tree.declare("logs").unwrap();
        tree.fork("logs", "logs.nginx", Condition::eq("log.logger", "nginx"))
            .unwrap();

        assert!(tree.contains("logs.nginx"));
        let rules = tree.children("logs").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].child.as_str(), "logs.nginx");
        assert!(tree.children("logs.nginx").unwrap().is_empty());
    }

    #[test]
    fn test_fork_unknown_parent() {
        let tree = RoutingTree::new();
        let err = tree
            .fork("logs", "logs.nginx", Condition::eq("a", 1))
            .unwrap_err();
        assert!(matches!(err, ForkError::UnknownParent { .. }));
    }

    #[test]
    fn test_fork_duplicate_child() {
        let tree = RoutingTree::new();
        tree.declare("logs").unwrap();
        tree.fork("logs", "logs.nginx", Condition::eq("a", 1)).unwrap();
        let err = tree
            .fork("logs", "logs.nginx", Condition::eq("b", 2))
            .unwrap_err();
        assert!(matches!(err, ForkError::DuplicateChild { .. }));
    }

    #[test]
    fn test_fork_requires_direct_child_name() {
        let tree = RoutingTree::new();
        tree.declare("logs").unwrap();
        let err = tree
            .fork("logs", "logs.nginx.access", Condition::eq("a", 1))
            .unwrap_err();
        assert!(matches!(err, ForkError::InvalidChildName { .. }));

        let err = tree
            .fork("logs", "metrics.nginx", Condition::eq("a", 1))
            .unwrap_err();
        assert!(matches!(err, ForkError::InvalidChildName { .. }));
    }

    #[test]
    fn test_rule_order_is_insertion_order() {
        let tree = RoutingTree::new();
        tree.declare("logs").unwrap();
        tree.fork("logs", "logs.first", Condition::eq("a", 1)).unwrap();
        tree.fork("logs", "logs.second", Condition::eq("a", 1)).unwrap();

        let rules = tree.children("logs").unwrap();
        assert_eq!(rules[0].child.as_str(), "logs.first");
        assert_eq!(rules[1].child.as_str(), "logs.second");
    }

    #[test]
    fn test_children_snapshot_is_stable_across_forks() {
        let tree = RoutingTree::new();
        tree.declare("logs").unwrap();
        tree.fork("logs", "logs.a", Condition::eq("x", 1)).unwrap();

        let snapshot = tree.children("logs").unwrap();
        tree.fork("logs", "logs.b", Condition::eq("x", 2)).unwrap();

        // The earlier snapshot is unchanged; a fresh read sees both rules.
        assert_eq!(snapshot.len(), 1);
        assert_eq!(tree.children("logs").unwrap().len(), 2);
    }

    #[test]
    fn test_streams_sorted() {
        let tree = RoutingTree::new();
        tree.declare("logs").unwrap();
        tree.fork("logs", "logs.nginx", Condition::eq("a", 1)).unwrap();
        tree.fork("logs", "logs.apache", Condition::eq("a", 2)).unwrap();

        let names: Vec<String> = tree.streams().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["logs", "logs.apache", "logs.nginx"]);
    }
}
