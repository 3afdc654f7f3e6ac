//! # gridvisor
//!
//! **Gridvisor** is the coordination core of a distributed benchmarking
//! grid: a task manager places units of work ("tasks") onto worker nodes
//! ("host runtimes"), which execute them as external processes. This
//! crate owns the two hardest pieces of that system — the global
//! lifecycle state machine governing a task's life from creation to
//! termination, and the host-local admission control deciding, under
//! concurrent requests, what is allowed to run where.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ TaskEntry #1 │   │ TaskEntry #2 │   │ TaskEntry #3 │
//!     │ (TaskStore)  │   │ (TaskStore)  │   │ (TaskStore)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (routing layer)                                       │
//! │  - TaskStore (shared task map, atomic transitions)                │
//! │  - node registry (one AdmissionController per node)               │
//! │  - StatusBoard (cluster-visible node occupancy)                   │
//! │  - Bus (broadcast events) + SubscriberSet (fan-out)               │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Admission    │   │ Admission    │   │ Admission    │
//!     │ Ctrl (n1)    │   │ Ctrl (n2)    │   │ Ctrl (n3)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┴──────────────────┘
//!                               ▼
//!                          StatusBoard
//!                 {task count, mode, bound id} per node
//! ```
//!
//! ### Lifecycle
//! ```text
//! CREATED ──► SUBMITTED ──► SCHEDULED ──► ACCEPTED ──► RUNNING ──► FINISHED
//!                 ▲    ▲        │ ▲  │        │            ▲
//!                 │    │        ▼ │  │        ▼            │
//!                 │    └──── (retry)│      WAITING ────────┘
//!                 │                 │        │
//!                 └─────────────────┘        ▼
//!                  (host declined)       SCHEDULED
//!
//! every non-terminal state ──► ABORTED (external cancellation)
//! ```
//!
//! ## Features
//! | Area           | Description                                            | Key types                                  |
//! |----------------|--------------------------------------------------------|--------------------------------------------|
//! | **Lifecycle**  | Legal state transitions as an explicit table.          | [`TaskState`]                              |
//! | **Records**    | Task entries with an append-only audit trail.          | [`TaskEntry`], [`StateChangeLog`], [`TaskStore`] |
//! | **Admission**  | Per-node exclusivity-aware gatekeeping.                | [`AdmissionController`], [`TaskHandle`], [`Admission`] |
//! | **Status**     | Cluster-visible mirror of node occupancy.              | [`NodeStatus`], [`StatusBoard`]            |
//! | **Events**     | Broadcast bus + non-blocking subscriber fan-out.       | [`Bus`], [`Event`], [`Subscribe`]          |
//! | **Errors**     | Typed errors for records, admission, and routing.      | [`StateError`], [`AdmissionError`], [`GridError`] |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use gridvisor::{
//!     Dispatcher, GridConfig, Subscribe, RunningTracker, TaskDescriptor, TaskExclusivity,
//!     TaskState,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tracker = Arc::new(RunningTracker::new());
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![tracker.clone()];
//!     let dispatcher = Dispatcher::new(GridConfig::default(), subs);
//!     dispatcher.register_node("node-1");
//!
//!     // Submit one exclusive task and walk it through its life.
//!     let td = TaskDescriptor::new("io-bench", "/opt/bench/io")
//!         .with_exclusivity(TaskExclusivity::Exclusive);
//!     let entry = dispatcher.create_task(td, "ctx-1")?;
//!     let id = entry.id().to_string();
//!
//!     dispatcher.advance_state(&id, TaskState::Submitted, "queued")?;
//!     dispatcher.advance_state(&id, TaskState::Scheduled, "placed on node-1")?;
//!     dispatcher.store().assign_runtime(&id, "node-1")?;
//!
//!     let handle = entry.handle();
//!     assert!(dispatcher.request_admission("node-1", &handle)?.is_admitted());
//!
//!     dispatcher.store().set_accepted(&id)?;
//!     dispatcher.store().set_running(&id)?;
//!     dispatcher.store().set_finished(&id, 0)?;
//!     dispatcher.notify_task_ended("node-1", &handle)?;
//!     Ok(())
//! }
//! ```

pub mod admission;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod records;
pub mod states;
pub mod subscribers;

// ---- Public re-exports ----

pub use admission::{
    Admission, AdmissionController, NodeStatus, RefusalReason, StatusBoard, TaskExclusivity,
    TaskHandle,
};
pub use config::GridConfig;
pub use error::{AdmissionError, GridError, StateError};
pub use events::{Bus, Event, EventKind};
pub use grid::Dispatcher;
pub use records::{StateChangeEntry, StateChangeLog, TaskDescriptor, TaskEntry, TaskStore};
pub use states::TaskState;
pub use subscribers::{LogWriter, RunningTracker, Subscribe, SubscriberSet};
