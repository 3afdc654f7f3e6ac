//! # Runtime events emitted by the dispatcher.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Domain events**: task records and admission decisions (created,
//!   state changed, admitted, refused, released)
//! - **Self-diagnostics**: subscriber overflow/panic reports
//!
//! The [`Event`] struct carries optional metadata such as the task,
//! context, and node ids involved, the new lifecycle state, and a
//! human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that
//! increases monotonically. Use `seq` to restore the exact order when
//! events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use gridvisor::{Event, EventKind, TaskState};
//!
//! let ev = Event::new(EventKind::StateChanged)
//!     .with_task("t1")
//!     .with_state(TaskState::Running)
//!     .with_reason("process started");
//!
//! assert_eq!(ev.kind, EventKind::StateChanged);
//! assert_eq!(ev.task.as_deref(), Some("t1"));
//! assert_eq!(ev.state, Some(TaskState::Running));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::admission::{RefusalReason, TaskExclusivity};
use crate::states::TaskState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Domain events ===
    /// A task entry was created and stored.
    ///
    /// Sets: `task`, `context`, `at`, `seq`.
    TaskCreated,

    /// A task entry moved to a new lifecycle state.
    ///
    /// Sets: `task`, `state`, `reason`, `at`, `seq`.
    StateChanged,

    /// A node's controller admitted a task.
    ///
    /// Sets: `task`, `context`, `node`, `exclusivity`, `at`, `seq`.
    TaskAdmitted,

    /// A node's controller refused a task.
    ///
    /// Sets: `task`, `node`, `exclusivity`, `refusal`, `at`, `seq`.
    AdmissionRefused,

    /// A task released its slot on a node.
    ///
    /// Sets: `task`, `node`, `at`, `seq`.
    TaskReleased,

    // === Subscriber self-diagnostics ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`, `at`, `seq`.
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason`, `at`, `seq`.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task id (or subscriber name for self-diagnostics).
    pub task: Option<Arc<str>>,
    /// Task context id.
    pub context: Option<Arc<str>>,
    /// Node id.
    pub node: Option<Arc<str>>,
    /// New lifecycle state (for `StateChanged`).
    pub state: Option<TaskState>,
    /// Exclusivity class presented for admission.
    pub exclusivity: Option<TaskExclusivity>,
    /// Why admission was refused (for `AdmissionRefused`).
    pub refusal: Option<RefusalReason>,
    /// Human-readable reason (transition reasons, overflow details, …).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            context: None,
            node: None,
            state: None,
            exclusivity: None,
            refusal: None,
            reason: None,
        }
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a task context id.
    #[inline]
    pub fn with_context(mut self, context: impl Into<Arc<str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attaches a node id.
    #[inline]
    pub fn with_node(mut self, node: impl Into<Arc<str>>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Attaches a lifecycle state.
    #[inline]
    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches an exclusivity class.
    #[inline]
    pub fn with_exclusivity(mut self, exclusivity: TaskExclusivity) -> Self {
        self.exclusivity = Some(exclusivity);
        self
    }

    /// Attaches a refusal reason.
    #[inline]
    pub fn with_refusal(mut self, refusal: RefusalReason) -> Self {
        self.refusal = Some(refusal);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}
