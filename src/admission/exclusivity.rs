//! # Task exclusivity classes.
//!
//! A task declares, in its descriptor, how willing it is to share a node
//! while it runs. The class is fixed at construction and never changes.
//!
//! ## Variants
//! - `NonExclusive`: shares the node freely with other non-exclusive tasks.
//! - `Exclusive`: monopolizes the node; nothing else runs beside it.
//! - `ContextExclusive`: shares the node only with tasks from the same
//!   task context.
//!
//! The same three values double as a node's current *concurrency mode*:
//! an idle node is `NonExclusive`, and admitting a task switches the node
//! into that task's class — see
//! [`AdmissionController`](crate::AdmissionController).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Concurrency contract a task declares for its stay on a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskExclusivity {
    /// Any number of non-exclusive tasks may run together (default).
    #[default]
    NonExclusive,
    /// Exactly one task runs, with sole use of the node.
    Exclusive,
    /// Any number of tasks may run together if they share one context id.
    ContextExclusive,
}

impl TaskExclusivity {
    /// Stable uppercase name, as published in cluster-visible records.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskExclusivity::NonExclusive => "NON_EXCLUSIVE",
            TaskExclusivity::Exclusive => "EXCLUSIVE",
            TaskExclusivity::ContextExclusive => "CONTEXT_EXCLUSIVE",
        }
    }
}

impl fmt::Display for TaskExclusivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
