//! # Admission handle.
//!
//! [`TaskHandle`] is the small value a caller presents to an
//! [`AdmissionController`](crate::AdmissionController): the task's
//! identity (task id, context id) and its declared exclusivity class.
//! The controller only reads it — it never owns the handle.
//!
//! The identity fields are immutable. The one piece of observable state
//! is the `accepted` flag: it starts false, is set exactly once by the
//! controller on successful admission, and is shared across clones so the
//! submitting side can observe the outcome through its own copy.
//!
//! ## Example
//! ```rust
//! use gridvisor::{TaskExclusivity, TaskHandle};
//!
//! let handle = TaskHandle::new("t1", "ctx-1", TaskExclusivity::Exclusive);
//! assert_eq!(handle.task_id(), "t1");
//! assert_eq!(handle.context_id(), "ctx-1");
//! assert!(!handle.is_accepted());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::exclusivity::TaskExclusivity;

/// Identity and concurrency class of one task requesting admission.
///
/// Cheap to clone; clones share the `accepted` flag.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    task_id: Arc<str>,
    context_id: Arc<str>,
    exclusivity: TaskExclusivity,
    accepted: Arc<AtomicBool>,
}

impl TaskHandle {
    /// Creates a new handle with the `accepted` flag cleared.
    pub fn new(
        task_id: impl Into<Arc<str>>,
        context_id: impl Into<Arc<str>>,
        exclusivity: TaskExclusivity,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            context_id: context_id.into(),
            exclusivity,
            accepted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the task id.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Returns the id of the task context this task belongs to.
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// Returns the declared exclusivity class.
    pub fn exclusivity(&self) -> TaskExclusivity {
        self.exclusivity
    }

    /// Returns whether a controller has admitted this handle.
    ///
    /// One-way: once true, stays true.
    pub fn is_accepted(&self) -> bool {
        self.accepted.load(Ordering::Acquire)
    }

    /// Marks the handle admitted. Called by the controller only.
    pub(crate) fn mark_accepted(&self) {
        self.accepted.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_flag_is_shared_across_clones() {
        let handle = TaskHandle::new("t1", "c1", TaskExclusivity::NonExclusive);
        let observer = handle.clone();

        assert!(!observer.is_accepted());
        handle.mark_accepted();
        assert!(observer.is_accepted(), "clone must observe the flag");
    }

    #[test]
    fn test_identity_accessors() {
        let handle = TaskHandle::new("t2", "c7", TaskExclusivity::ContextExclusive);
        assert_eq!(handle.task_id(), "t2");
        assert_eq!(handle.context_id(), "c7");
        assert_eq!(handle.exclusivity(), TaskExclusivity::ContextExclusive);
    }
}
