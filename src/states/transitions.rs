//! # Legal lifecycle transitions.
//!
//! The transition table is written out as an explicit `match` rather than
//! derived from declaration order, so extending [`TaskState`] can never
//! silently change which edges are legal.
//!
//! Non-linear edges and what they model:
//! - `Scheduled → Submitted`: a host runtime declined a tentatively placed
//!   task; it returns to the placement queue.
//! - `Scheduled → Scheduled`: re-placement onto another (or the same) node
//!   after a placement failure, without a round-trip through `Submitted`.
//! - `Submitted → Waiting` and `Waiting → Scheduled`: a task blocks on an
//!   external event before being (re-)placed.
//! - `Accepted → Running`: the common no-wait start.
//! - any non-terminal state `→ Aborted`: external cancellation.
//!
//! `Finished → Aborted` is legal here. It carries no known semantic use —
//! a finished task cannot meaningfully be aborted — but removing it would
//! change observable behavior, so the edge stays.

use super::TaskState;

impl TaskState {
    /// Returns whether a task in state `self` may move to `target`.
    ///
    /// Pure and total: every pair of states yields an answer, no
    /// side effects, no allocation.
    ///
    /// ## Example
    /// ```rust
    /// use gridvisor::TaskState;
    ///
    /// assert!(TaskState::Created.can_transition_to(TaskState::Submitted));
    /// assert!(TaskState::Scheduled.can_transition_to(TaskState::Scheduled));
    /// assert!(!TaskState::Running.can_transition_to(TaskState::Created));
    /// assert!(!TaskState::Aborted.can_transition_to(TaskState::Aborted));
    /// ```
    pub fn can_transition_to(self, target: TaskState) -> bool {
        use TaskState::*;

        match (self, target) {
            (Created, Submitted | Aborted) => true,
            (Submitted, Scheduled | Waiting | Aborted) => true,
            (Scheduled, Accepted | Submitted | Scheduled | Aborted) => true,
            (Accepted, Waiting | Running | Aborted) => true,
            (Waiting, Running | Scheduled | Aborted) => true,
            (Running, Finished | Aborted) => true,
            (Finished, Aborted) => true,
            (Aborted, _) => false,
            _ => false,
        }
    }
}
