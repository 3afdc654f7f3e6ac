//! # Task lifecycle state.
//!
//! [`TaskState`] enumerates every state a task passes through between
//! creation and termination. The declaration order matches the nominal
//! forward progression of a task; comparisons (`<`, `>`) follow it.
//!
//! The legality of moving between two states is decided by
//! [`TaskState::can_transition_to`], an explicit adjacency table — see
//! `transitions.rs`.
//!
//! ## Example
//! ```rust
//! use gridvisor::TaskState;
//!
//! assert_eq!(TaskState::Created.to_string(), "CREATED");
//! assert!(TaskState::Created < TaskState::Running);
//! assert!(TaskState::Aborted.is_terminal());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a task.
///
/// `Created` is the unique initial state (nothing transitions into it);
/// `Aborted` is terminal (nothing transitions out of it). All other edges
/// are listed in [`TaskState::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Freshly built record; not yet handed to the placement layer.
    Created,
    /// Queued for placement.
    Submitted,
    /// Tentatively placed onto a host runtime.
    Scheduled,
    /// Host runtime confirmed it will run the task.
    Accepted,
    /// Blocked on an external event before (re-)placement or start.
    Waiting,
    /// Task process is executing.
    Running,
    /// Task process exited.
    Finished,
    /// Terminated by external cancellation or failure.
    Aborted,
}

impl TaskState {
    /// Returns true for the terminal state ([`TaskState::Aborted`]).
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Aborted)
    }

    /// Stable uppercase name, as published in cluster-visible records.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Created => "CREATED",
            TaskState::Submitted => "SUBMITTED",
            TaskState::Scheduled => "SCHEDULED",
            TaskState::Accepted => "ACCEPTED",
            TaskState::Waiting => "WAITING",
            TaskState::Running => "RUNNING",
            TaskState::Finished => "FINISHED",
            TaskState::Aborted => "ABORTED",
        }
    }

    /// All states, in declaration order.
    pub const ALL: [TaskState; 8] = [
        TaskState::Created,
        TaskState::Submitted,
        TaskState::Scheduled,
        TaskState::Accepted,
        TaskState::Waiting,
        TaskState::Running,
        TaskState::Finished,
        TaskState::Aborted,
    ];
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
