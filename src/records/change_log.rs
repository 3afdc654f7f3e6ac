//! # State-change audit trail.
//!
//! Every lifecycle transition appends one [`StateChangeEntry`] — the
//! target state, a human-readable reason, and a timestamp — to the
//! entry's [`StateChangeLog`]. Entries are immutable, strictly
//! insertion-ordered, and never removed; the first and last timestamps
//! bound the task's observable lifetime for reporting tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::states::TaskState;

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChangeEntry {
    state: TaskState,
    reason: String,
    timestamp: DateTime<Utc>,
}

impl StateChangeEntry {
    pub(crate) fn new(state: TaskState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    /// The state the task moved into.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Why the transition happened.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// When the transition was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Append-only, insertion-ordered sequence of [`StateChangeEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChangeLog {
    entries: Vec<StateChangeEntry>,
}

impl StateChangeLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: StateChangeEntry) {
        self.entries.push(entry);
    }

    /// Returns all entries, oldest first.
    pub fn entries(&self) -> &[StateChangeEntry] {
        &self.entries
    }

    /// Returns the most recent entry, if any transition has occurred.
    pub fn last(&self) -> Option<&StateChangeEntry> {
        self.entries.last()
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first transition.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_insertion_order() {
        let mut log = StateChangeLog::new();
        log.push(StateChangeEntry::new(TaskState::Submitted, "queued"));
        log.push(StateChangeEntry::new(TaskState::Scheduled, "placed on n1"));

        let states: Vec<TaskState> = log.entries().iter().map(|e| e.state()).collect();
        assert_eq!(states, vec![TaskState::Submitted, TaskState::Scheduled]);
        assert_eq!(log.last().unwrap().reason(), "placed on n1");
    }

    #[test]
    fn test_timestamps_are_monotonic_per_log() {
        let mut log = StateChangeLog::new();
        log.push(StateChangeEntry::new(TaskState::Submitted, "queued"));
        log.push(StateChangeEntry::new(TaskState::Aborted, "cancelled"));

        let entries = log.entries();
        assert!(entries[0].timestamp() <= entries[1].timestamp());
    }
}
