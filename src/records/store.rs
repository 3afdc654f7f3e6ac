//! # Shared task store.
//!
//! [`TaskStore`] is the in-process stand-in for the replicated task map
//! the cluster shares: entries keyed by task id, mutated through atomic
//! transitions.
//!
//! ## Rules
//! - A transition is applied lock-check-mutate-put: the record's lock is
//!   taken, legality is checked against the *stored* copy, and the log
//!   append plus state write land as one update. A partially applied
//!   transition (log updated, state not, or vice versa) is never
//!   observable.
//! - Different cluster members drive different phases of one task's life
//!   (the manager sets `SUBMITTED`/`SCHEDULED`, the host runtime sets
//!   `ACCEPTED`/`RUNNING`/`FINISHED`). [`TaskStore::transition_from`] is
//!   the compare-and-swap variant for callers that decided on a stale
//!   read: it fails with `ConcurrentModification` instead of applying a
//!   decision made against a state that no longer holds.
//! - Entries are never deleted; retention is external.
//!
//! ## Example
//! ```rust
//! use gridvisor::{TaskDescriptor, TaskEntry, TaskState, TaskStore};
//!
//! let store = TaskStore::new();
//! let entry = TaskEntry::new(TaskDescriptor::new("bench", "/opt/run"), "c1").unwrap();
//! let id = entry.id().to_string();
//! store.insert(entry);
//!
//! store.transition(&id, TaskState::Submitted, "queued").unwrap();
//! let entry = store.get(&id).unwrap();
//! assert_eq!(entry.state(), TaskState::Submitted);
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::StateError;
use crate::states::TaskState;

use super::entry::TaskEntry;

/// Shared map of [`TaskEntry`] records, keyed by task id.
#[derive(Debug, Default)]
pub struct TaskStore {
    entries: RwLock<HashMap<String, TaskEntry>>,
}

impl TaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entry under its id, replacing any previous record.
    pub fn insert(&self, entry: TaskEntry) {
        let mut map = self.write();
        map.insert(entry.id().to_string(), entry);
    }

    /// Returns a copy of the entry with the given id.
    pub fn get(&self, id: &str) -> Option<TaskEntry> {
        self.read().get(id).cloned()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns copies of all entries belonging to one task context.
    pub fn in_context(&self, context_id: &str) -> Vec<TaskEntry> {
        self.read()
            .values()
            .filter(|e| e.context_id() == context_id)
            .cloned()
            .collect()
    }

    /// Moves the stored entry into `target`, recording `reason`.
    ///
    /// Legality is checked against the stored record under its lock; the
    /// log append and state write are applied together or not at all.
    pub fn transition(
        &self,
        id: &str,
        target: TaskState,
        reason: impl Into<String>,
    ) -> Result<TaskEntry, StateError> {
        self.mutate(id, |entry| entry.transition(target, reason))
    }

    /// Compare-and-swap transition: applies only if the stored entry is
    /// still in `expected`.
    ///
    /// Fails with [`StateError::ConcurrentModification`] when another
    /// writer moved the record since the caller last read it.
    pub fn transition_from(
        &self,
        id: &str,
        expected: TaskState,
        target: TaskState,
        reason: impl Into<String>,
    ) -> Result<TaskEntry, StateError> {
        self.mutate(id, |entry| {
            if entry.state() != expected {
                return Err(StateError::ConcurrentModification {
                    id: entry.id().to_string(),
                });
            }
            entry.transition(target, reason)
        })
    }

    /// Records which node the task has been placed on.
    pub fn assign_runtime(
        &self,
        id: &str,
        runtime_id: impl Into<String>,
    ) -> Result<TaskEntry, StateError> {
        self.mutate(id, |entry| {
            entry.set_runtime_id(Some(runtime_id.into()));
            Ok(())
        })
    }

    // ---------------------------
    // Host-side convenience transitions
    // ---------------------------

    /// Marks the task accepted on its assigned node.
    pub fn set_accepted(&self, id: &str) -> Result<TaskEntry, StateError> {
        self.mutate(id, |entry| {
            let reason = format!(
                "Task has been accepted on {}",
                entry.runtime_id().unwrap_or("<unassigned>")
            );
            entry.transition(TaskState::Accepted, reason)
        })
    }

    /// Marks the task process started on its assigned node.
    pub fn set_running(&self, id: &str) -> Result<TaskEntry, StateError> {
        self.mutate(id, |entry| {
            let reason = format!(
                "Task is going to be run on {}",
                entry.runtime_id().unwrap_or("<unassigned>")
            );
            entry.transition(TaskState::Running, reason)
        })
    }

    /// Marks the task finished, recording the process exit value.
    pub fn set_finished(&self, id: &str, exit_code: i32) -> Result<TaskEntry, StateError> {
        self.mutate(id, |entry| {
            entry.transition(
                TaskState::Finished,
                format!("Task has finished with exit value {exit_code}"),
            )?;
            entry.set_exit_code(exit_code);
            Ok(())
        })
    }

    /// Marks the task aborted, optionally recording an exit value.
    pub fn set_aborted(
        &self,
        id: &str,
        reason: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Result<TaskEntry, StateError> {
        self.mutate(id, |entry| {
            entry.transition(TaskState::Aborted, reason)?;
            if let Some(code) = exit_code {
                entry.set_exit_code(code);
            }
            Ok(())
        })
    }

    /// Returns the task to the placement queue.
    pub fn resubmit(&self, id: &str, reason: impl Into<String>) -> Result<TaskEntry, StateError> {
        self.transition(id, TaskState::Submitted, reason)
    }

    /// Applies `f` to the stored entry under the write lock and returns a
    /// copy of the updated record. `f` must either fully apply or leave
    /// the entry untouched.
    fn mutate<F>(&self, id: &str, f: F) -> Result<TaskEntry, StateError>
    where
        F: FnOnce(&mut TaskEntry) -> Result<(), StateError>,
    {
        let mut map = self.write();
        let entry = map.get_mut(id).ok_or_else(|| StateError::UnknownTask {
            id: id.to_string(),
        })?;
        f(entry)?;
        debug!(task = %entry.id(), state = %entry.state(), "task entry updated");
        Ok(entry.clone())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, TaskEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, TaskEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::TaskDescriptor;

    fn stored_task(store: &TaskStore, ctx: &str) -> String {
        let entry = TaskEntry::new(TaskDescriptor::new("bench", "/opt/run"), ctx).unwrap();
        let id = entry.id().to_string();
        store.insert(entry);
        id
    }

    #[test]
    fn test_transition_updates_stored_copy() {
        let store = TaskStore::new();
        let id = stored_task(&store, "c1");

        let updated = store
            .transition(&id, TaskState::Submitted, "queued")
            .unwrap();
        assert_eq!(updated.state(), TaskState::Submitted);

        let reread = store.get(&id).unwrap();
        assert_eq!(reread.state(), TaskState::Submitted);
        assert_eq!(reread.change_log().len(), 1);
    }

    #[test]
    fn test_illegal_transition_leaves_store_unchanged() {
        let store = TaskStore::new();
        let id = stored_task(&store, "c1");

        let err = store
            .transition(&id, TaskState::Finished, "nope")
            .unwrap_err();
        assert_eq!(err.as_label(), "illegal_transition");

        let entry = store.get(&id).unwrap();
        assert_eq!(entry.state(), TaskState::Created);
        assert!(entry.change_log().is_empty());
    }

    #[test]
    fn test_unknown_task_is_reported() {
        let store = TaskStore::new();
        let err = store
            .transition("missing", TaskState::Aborted, "kill")
            .unwrap_err();
        assert_eq!(
            err,
            StateError::UnknownTask {
                id: "missing".into()
            }
        );
    }

    #[test]
    fn test_transition_from_rejects_stale_expectation() {
        let store = TaskStore::new();
        let id = stored_task(&store, "c1");
        store
            .transition(&id, TaskState::Submitted, "queued")
            .unwrap();

        // A second writer decided while this one still believed CREATED.
        let err = store
            .transition_from(&id, TaskState::Created, TaskState::Aborted, "late cancel")
            .unwrap_err();
        assert_eq!(err, StateError::ConcurrentModification { id: id.clone() });

        let entry = store.get(&id).unwrap();
        assert_eq!(entry.state(), TaskState::Submitted, "stale CAS must not apply");
        assert_eq!(entry.change_log().len(), 1);
    }

    #[test]
    fn test_transition_from_applies_when_expectation_holds() {
        let store = TaskStore::new();
        let id = stored_task(&store, "c1");

        let updated = store
            .transition_from(&id, TaskState::Created, TaskState::Submitted, "queued")
            .unwrap();
        assert_eq!(updated.state(), TaskState::Submitted);
    }

    #[test]
    fn test_host_side_lifecycle_records_reasons_and_exit() {
        let store = TaskStore::new();
        let id = stored_task(&store, "c1");

        store
            .transition(&id, TaskState::Submitted, "queued")
            .unwrap();
        store
            .transition(&id, TaskState::Scheduled, "placed on n1")
            .unwrap();
        store.assign_runtime(&id, "n1").unwrap();
        store.set_accepted(&id).unwrap();
        store.set_running(&id).unwrap();
        let finished = store.set_finished(&id, 0).unwrap();

        assert_eq!(finished.state(), TaskState::Finished);
        assert_eq!(finished.exit_code(), Some(0));

        let reasons: Vec<String> = finished
            .change_log()
            .entries()
            .iter()
            .map(|e| e.reason().to_string())
            .collect();
        assert!(reasons.iter().any(|r| r == "Task has been accepted on n1"));
        assert!(reasons.iter().any(|r| r == "Task is going to be run on n1"));
        assert_eq!(
            finished.change_log().last().unwrap().reason(),
            "Task has finished with exit value 0"
        );
    }

    #[test]
    fn test_resubmit_returns_scheduled_task_to_queue() {
        let store = TaskStore::new();
        let id = stored_task(&store, "c1");
        store
            .transition(&id, TaskState::Submitted, "queued")
            .unwrap();
        store
            .transition(&id, TaskState::Scheduled, "placed on n1")
            .unwrap();

        let entry = store
            .resubmit(&id, "host runtime declined the task")
            .unwrap();
        assert_eq!(entry.state(), TaskState::Submitted);
    }

    #[test]
    fn test_in_context_filters_by_context_id() {
        let store = TaskStore::new();
        let a = stored_task(&store, "c1");
        let _b = stored_task(&store, "c2");
        let c = stored_task(&store, "c1");

        let mut ids: Vec<String> = store
            .in_context("c1")
            .into_iter()
            .map(|e| e.id().to_string())
            .collect();
        ids.sort();
        let mut expected = vec![a, c];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
