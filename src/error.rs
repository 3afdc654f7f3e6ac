//! Error types used by the gridvisor core.
//!
//! This module defines three error enums:
//!
//! - [`StateError`] — failures of task-record construction and lifecycle
//!   transitions.
//! - [`AdmissionError`] — precondition violations against a node's
//!   admission controller. Note that a *refused* admission is **not** an
//!   error — see [`Admission`](crate::Admission).
//! - [`GridError`] — routing failures of the dispatcher, wrapping the
//!   other two.
//!
//! All types provide an `as_label` helper (short, stable, snake_case) for
//! logging/metrics.

use thiserror::Error;

use crate::states::TaskState;

/// # Errors of task-record construction and lifecycle transitions.
///
/// Surfaced synchronously to the caller; nothing in this core retries.
/// An [`StateError::IllegalTransition`] may reflect a benign race (the
/// record moved under the caller) or a genuine logic bug — the caller
/// decides which.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A required field was missing or empty when building a task record.
    #[error("invalid argument: {what} is missing or empty")]
    InvalidArgument {
        /// Name of the offending field.
        what: &'static str,
    },

    /// The requested target state is not reachable from the current state.
    #[error("illegal state transition {from} -> {to}")]
    IllegalTransition {
        /// State the record was in when the transition was attempted.
        from: TaskState,
        /// Requested target state.
        to: TaskState,
    },

    /// No record with the given id exists in the store.
    #[error("no such task entry: {id}")]
    UnknownTask {
        /// Task id that failed to resolve.
        id: String,
    },

    /// The stored record no longer matches what the caller last observed.
    #[error("task entry '{id}' concurrently modified")]
    ConcurrentModification {
        /// Task id of the contested record.
        id: String,
    },
}

impl StateError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use gridvisor::{StateError, TaskState};
    ///
    /// let err = StateError::IllegalTransition {
    ///     from: TaskState::Finished,
    ///     to: TaskState::Running,
    /// };
    /// assert_eq!(err.as_label(), "illegal_transition");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StateError::InvalidArgument { .. } => "invalid_argument",
            StateError::IllegalTransition { .. } => "illegal_transition",
            StateError::UnknownTask { .. } => "unknown_task",
            StateError::ConcurrentModification { .. } => "concurrent_modification",
        }
    }
}

/// # Precondition violations against an admission controller.
///
/// These are programmer errors on the calling side, not expected
/// operational outcomes. Refusals are reported through
/// [`Admission::Refused`](crate::Admission::Refused) instead.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// `remove` was called with a handle this controller never admitted.
    #[error("task '{task_id}' was never admitted on this node")]
    NotAdmitted {
        /// Task id carried by the offending handle.
        task_id: String,
    },
}

impl AdmissionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AdmissionError::NotAdmitted { .. } => "not_admitted",
        }
    }
}

/// # Errors of the dispatcher routing layer.
///
/// Wraps the record and admission errors so callers of the narrow
/// external interfaces handle one type.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// No admission controller is registered for the named node.
    #[error("no such node: {id}")]
    UnknownNode {
        /// Node id that failed to resolve.
        id: String,
    },

    /// A task-record operation failed.
    #[error(transparent)]
    State(#[from] StateError),

    /// An admission precondition was violated.
    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

impl GridError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use gridvisor::GridError;
    ///
    /// let err = GridError::UnknownNode { id: "node-1".into() };
    /// assert_eq!(err.as_label(), "unknown_node");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            GridError::UnknownNode { .. } => "unknown_node",
            GridError::State(e) => e.as_label(),
            GridError::Admission(e) => e.as_label(),
        }
    }
}
