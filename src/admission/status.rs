//! # Cluster-visible node status.
//!
//! Every admission controller mirrors its internal occupancy into a
//! [`NodeStatus`] record on a shared [`StatusBoard`] — the in-process
//! stand-in for the replicated runtime-info map the rest of the cluster
//! reads when matching tasks to hosts.
//!
//! The mirror is written while the controller's lock is held, so a stored
//! record never lags behind the controller that produced it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use super::exclusivity::TaskExclusivity;

/// Published occupancy of one node.
///
/// The exclusivity mode is published as its display string; consumers of
/// the board do not link against this crate's enums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    /// Id of the node this record describes.
    pub node_id: String,
    /// Number of tasks currently admitted on the node.
    pub task_count: usize,
    /// Current concurrency mode, e.g. `"NON_EXCLUSIVE"`.
    pub exclusivity: String,
    /// Bound task id (`EXCLUSIVE`) or context id (`CONTEXT_EXCLUSIVE`).
    pub exclusive_id: Option<String>,
}

impl NodeStatus {
    /// Status of an idle node: zero tasks, non-exclusive, no bound id.
    pub fn idle(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            task_count: 0,
            exclusivity: TaskExclusivity::NonExclusive.to_string(),
            exclusive_id: None,
        }
    }
}

/// Shared registry of [`NodeStatus`] records, keyed by node id.
///
/// Cheap to clone; clones share the same map. Reads return owned copies
/// so callers never hold the board's lock.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<HashMap<String, NodeStatus>>>,
}

impl StatusBoard {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) the record for `status.node_id`.
    pub fn store(&self, status: NodeStatus) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(status.node_id.clone(), status);
    }

    /// Returns a copy of the record for the given node, if any.
    pub fn get(&self, node_id: &str) -> Option<NodeStatus> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(node_id).cloned()
    }

    /// Returns copies of all records, sorted by node id.
    pub fn all(&self) -> Vec<NodeStatus> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<NodeStatus> = map.values().cloned().collect();
        records.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_replaces_previous_record() {
        let board = StatusBoard::new();
        board.store(NodeStatus::idle("n1"));

        let mut busy = NodeStatus::idle("n1");
        busy.task_count = 3;
        board.store(busy);

        let got = board.get("n1").unwrap();
        assert_eq!(got.task_count, 3);
    }

    #[test]
    fn test_all_is_sorted_by_node_id() {
        let board = StatusBoard::new();
        board.store(NodeStatus::idle("n2"));
        board.store(NodeStatus::idle("n1"));

        let ids: Vec<String> = board.all().into_iter().map(|s| s.node_id).collect();
        assert_eq!(ids, vec!["n1".to_string(), "n2".to_string()]);
    }

    #[test]
    fn test_idle_record_shape() {
        let status = NodeStatus::idle("n1");
        assert_eq!(status.task_count, 0);
        assert_eq!(status.exclusivity, "NON_EXCLUSIVE");
        assert!(status.exclusive_id.is_none());
    }
}
