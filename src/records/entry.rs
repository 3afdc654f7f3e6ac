//! # Task entry.
//!
//! [`TaskEntry`] is the persistent record of one schedulable unit of
//! work: identity, descriptor, current lifecycle state, placement marker,
//! and the append-only change log.
//!
//! An entry is created once (state `CREATED`, fresh random id) by the
//! submitting party and afterwards mutated only through
//! [`TaskEntry::transition`], which validates legality against the
//! lifecycle table, appends exactly one log entry, then writes the state.
//! Cluster-level atomicity of that pair is the concern of
//! [`TaskStore`](crate::records::TaskStore), which applies it under the
//! record's lock.
//!
//! ## Example
//! ```rust
//! use gridvisor::{TaskDescriptor, TaskEntry, TaskState};
//!
//! let td = TaskDescriptor::new("warmup", "/bin/true");
//! let mut entry = TaskEntry::new(td, "ctx-1").unwrap();
//! assert_eq!(entry.state(), TaskState::Created);
//! assert!(entry.change_log().is_empty());
//!
//! entry.transition(TaskState::Submitted, "queued for placement").unwrap();
//! assert_eq!(entry.state(), TaskState::Submitted);
//! assert_eq!(entry.change_log().len(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::admission::TaskHandle;
use crate::error::StateError;
use crate::states::TaskState;

use super::change_log::{StateChangeEntry, StateChangeLog};
use super::descriptor::TaskDescriptor;

/// One schedulable unit of benchmark work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    id: String,
    context_id: String,
    descriptor: TaskDescriptor,
    state: TaskState,
    /// Node the task is assigned to, once placed.
    runtime_id: Option<String>,
    /// Exit value of the task process, once it ended.
    exit_code: Option<i32>,
    created_at: DateTime<Utc>,
    log: StateChangeLog,
}

impl TaskEntry {
    /// Creates a fresh entry in state `CREATED` with an empty change log
    /// and a random id.
    ///
    /// Fails with [`StateError::InvalidArgument`] when the descriptor
    /// name or command, or the context id, is empty.
    pub fn new(
        descriptor: TaskDescriptor,
        context_id: impl Into<String>,
    ) -> Result<Self, StateError> {
        let context_id = context_id.into();
        if descriptor.name.trim().is_empty() {
            return Err(StateError::InvalidArgument {
                what: "descriptor name",
            });
        }
        if descriptor.command.trim().is_empty() {
            return Err(StateError::InvalidArgument {
                what: "descriptor command",
            });
        }
        if context_id.trim().is_empty() {
            return Err(StateError::InvalidArgument { what: "context id" });
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            context_id,
            descriptor,
            state: TaskState::Created,
            runtime_id: None,
            exit_code: None,
            created_at: Utc::now(),
            log: StateChangeLog::new(),
        })
    }

    /// Returns the task id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the id of the owning task context.
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// Returns the descriptor.
    pub fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the node this task is assigned to, if placed.
    pub fn runtime_id(&self) -> Option<&str> {
        self.runtime_id.as_deref()
    }

    /// Returns the recorded process exit value, if the task ended.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Returns when the entry was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the transition audit trail.
    pub fn change_log(&self) -> &StateChangeLog {
        &self.log
    }

    /// Assigns (or clears) the placement marker.
    pub fn set_runtime_id(&mut self, runtime_id: Option<String>) {
        self.runtime_id = runtime_id;
    }

    pub(crate) fn set_exit_code(&mut self, exit_code: i32) {
        self.exit_code = Some(exit_code);
    }

    /// Builds the admission handle for this entry: its identity plus the
    /// exclusivity class declared in the descriptor.
    pub fn handle(&self) -> TaskHandle {
        TaskHandle::new(
            self.id.as_str(),
            self.context_id.as_str(),
            self.descriptor.exclusivity,
        )
    }

    /// Moves the entry into `target`, recording `reason` in the log.
    ///
    /// On success the log grows by exactly one entry whose state equals
    /// the entry's new current state. On failure neither the state nor
    /// the log changes.
    pub fn transition(
        &mut self,
        target: TaskState,
        reason: impl Into<String>,
    ) -> Result<(), StateError> {
        if !self.state.can_transition_to(target) {
            return Err(StateError::IllegalTransition {
                from: self.state,
                to: target,
            });
        }
        self.log.push(StateChangeEntry::new(target, reason));
        self.state = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> TaskDescriptor {
        TaskDescriptor::new("bench", "/opt/bench/run")
    }

    #[test]
    fn test_new_entry_starts_created_with_empty_log() {
        let entry = TaskEntry::new(descriptor(), "c1").unwrap();
        assert_eq!(entry.state(), TaskState::Created);
        assert!(entry.change_log().is_empty());
        assert!(entry.runtime_id().is_none());
        assert!(entry.exit_code().is_none());
        assert!(!entry.id().is_empty());
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = TaskEntry::new(descriptor(), "c1").unwrap();
        let b = TaskEntry::new(descriptor(), "c1").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_empty_context_id_is_invalid() {
        let err = TaskEntry::new(descriptor(), "  ").unwrap_err();
        assert_eq!(err, StateError::InvalidArgument { what: "context id" });
    }

    #[test]
    fn test_blank_descriptor_fields_are_invalid() {
        let td = TaskDescriptor::new("", "/bin/true");
        assert_eq!(
            TaskEntry::new(td, "c1").unwrap_err(),
            StateError::InvalidArgument {
                what: "descriptor name"
            }
        );

        let td = TaskDescriptor::new("bench", "");
        assert_eq!(
            TaskEntry::new(td, "c1").unwrap_err(),
            StateError::InvalidArgument {
                what: "descriptor command"
            }
        );
    }

    #[test]
    fn test_legal_transition_appends_exactly_one_log_entry() {
        let mut entry = TaskEntry::new(descriptor(), "c1").unwrap();
        entry.transition(TaskState::Submitted, "queued").unwrap();

        assert_eq!(entry.state(), TaskState::Submitted);
        assert_eq!(entry.change_log().len(), 1);
        let last = entry.change_log().last().unwrap();
        assert_eq!(last.state(), entry.state());
        assert_eq!(last.reason(), "queued");
    }

    #[test]
    fn test_illegal_transition_changes_nothing() {
        let mut entry = TaskEntry::new(descriptor(), "c1").unwrap();
        let err = entry
            .transition(TaskState::Running, "skipping ahead")
            .unwrap_err();

        assert_eq!(
            err,
            StateError::IllegalTransition {
                from: TaskState::Created,
                to: TaskState::Running,
            }
        );
        assert_eq!(entry.state(), TaskState::Created);
        assert!(entry.change_log().is_empty());
    }

    #[test]
    fn test_log_tail_tracks_state_through_full_lifecycle() {
        let mut entry = TaskEntry::new(descriptor(), "c1").unwrap();
        let path = [
            (TaskState::Submitted, "queued"),
            (TaskState::Scheduled, "placed on n1"),
            (TaskState::Accepted, "accepted on n1"),
            (TaskState::Running, "process started"),
            (TaskState::Finished, "exit 0"),
        ];
        for (state, reason) in path {
            entry.transition(state, reason).unwrap();
            assert_eq!(entry.change_log().last().unwrap().state(), entry.state());
        }
        assert_eq!(entry.change_log().len(), path.len());
    }

    #[test]
    fn test_handle_carries_descriptor_exclusivity() {
        let td = descriptor().with_exclusivity(crate::TaskExclusivity::Exclusive);
        let entry = TaskEntry::new(td, "c1").unwrap();
        let handle = entry.handle();

        assert_eq!(handle.task_id(), entry.id());
        assert_eq!(handle.context_id(), "c1");
        assert_eq!(handle.exclusivity(), crate::TaskExclusivity::Exclusive);
    }
}
