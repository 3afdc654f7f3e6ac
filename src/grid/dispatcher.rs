//! # Dispatcher: the narrow interface layer of the grid core.
//!
//! The [`Dispatcher`] owns the pieces the rest of the system talks to:
//! the shared [`TaskStore`], the per-node [`AdmissionController`]
//! registry, the cluster-visible [`StatusBoard`], the event [`Bus`], and
//! a [`SubscriberSet`] fed from it.
//!
//! ## High-level architecture
//! ```text
//! placement layer ── request_admission(node, handle) ──┐
//! process supervision ── notify_task_ended(node, h) ───┤
//! cluster scheduler ── advance_state(task, state) ─────┤
//!                                                      ▼
//!                                              ┌──────────────┐
//!                                              │  Dispatcher  │
//!                                              └──────┬───────┘
//!                    ┌────────────────┬───────────────┤
//!                    ▼                ▼               ▼
//!            TaskStore        AdmissionController   Bus ──► SubscriberSet
//!            (shared map)     (one per node)        │       (fan-out)
//!                                     │             └──► extra receivers
//!                                     ▼
//!                                StatusBoard
//! ```
//!
//! ## Rules
//! - Admission refusal is returned as an ordinary negative outcome; the
//!   caller re-places the task elsewhere.
//! - Every accepted call publishes exactly one domain event.
//! - Controllers are explicitly constructed via
//!   [`Dispatcher::register_node`] and owned by the dispatcher; tests may
//!   run several dispatchers (and thus several controller sets) in one
//!   process.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use gridvisor::{Dispatcher, GridConfig, LogWriter, Subscribe, TaskDescriptor, TaskState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let dispatcher = Dispatcher::new(GridConfig::default(), subs);
//!     dispatcher.register_node("node-1");
//!
//!     let td = TaskDescriptor::new("warmup", "/bin/true");
//!     let entry = dispatcher.create_task(td, "ctx-1")?;
//!     dispatcher.advance_state(entry.id(), TaskState::Submitted, "queued")?;
//!
//!     let admission = dispatcher.request_admission("node-1", &entry.handle())?;
//!     assert!(admission.is_admitted());
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::admission::{Admission, AdmissionController, NodeStatus, StatusBoard, TaskHandle};
use crate::config::GridConfig;
use crate::error::GridError;
use crate::events::{Bus, Event, EventKind};
use crate::records::{TaskDescriptor, TaskEntry, TaskStore};
use crate::states::TaskState;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Routes placement, supervision, and scheduler calls to the shared
/// store and the per-node controllers, publishing an event per outcome.
///
/// Must be created within a Tokio runtime (the subscriber fan-out spawns
/// workers).
pub struct Dispatcher {
    bus: Bus,
    store: TaskStore,
    board: StatusBoard,
    nodes: RwLock<HashMap<String, Arc<AdmissionController>>>,
    subs: Arc<SubscriberSet>,
    listener_token: CancellationToken,
}

impl Dispatcher {
    /// Creates a dispatcher and wires `subscribers` to its event bus.
    pub fn new(cfg: GridConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Arc<Self> {
        let bus = Bus::new(cfg.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));

        let dispatcher = Arc::new(Self {
            bus,
            store: TaskStore::new(),
            board: StatusBoard::new(),
            nodes: RwLock::new(HashMap::new()),
            subs,
            listener_token: CancellationToken::new(),
        });
        dispatcher.spawn_subscriber_listener();
        dispatcher
    }

    /// Returns the event bus, e.g. to attach extra receivers.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the shared task store.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Returns the cluster-visible status board.
    pub fn board(&self) -> &StatusBoard {
        &self.board
    }

    /// Constructs (or returns) the admission controller for `node_id`.
    ///
    /// Registration is idempotent: a node re-registering after a restart
    /// keeps its existing controller.
    pub fn register_node(&self, node_id: &str) -> Arc<AdmissionController> {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(nodes.entry(node_id.to_string()).or_insert_with(|| {
            debug!(node = node_id, "node registered");
            Arc::new(AdmissionController::new(node_id, self.board.clone()))
        }))
    }

    /// Returns the controller for `node_id`, if registered.
    pub fn node(&self, node_id: &str) -> Option<Arc<AdmissionController>> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes.get(node_id).cloned()
    }

    /// Builds a task entry, stores it, and announces it.
    pub fn create_task(
        &self,
        descriptor: TaskDescriptor,
        context_id: impl Into<String>,
    ) -> Result<TaskEntry, GridError> {
        let entry = TaskEntry::new(descriptor, context_id)?;
        self.store.insert(entry.clone());
        self.bus.publish(
            Event::new(EventKind::TaskCreated)
                .with_task(entry.id())
                .with_context(entry.context_id()),
        );
        Ok(entry)
    }

    /// Asks the named node whether `handle` may start executing there.
    ///
    /// A refusal is a normal outcome and is returned (and published), not
    /// raised; only an unregistered node is an error.
    pub fn request_admission(
        &self,
        node_id: &str,
        handle: &TaskHandle,
    ) -> Result<Admission, GridError> {
        let controller = self.node(node_id).ok_or_else(|| GridError::UnknownNode {
            id: node_id.to_string(),
        })?;

        let admission = controller.try_admit(handle);
        match admission {
            Admission::Admitted => {
                self.bus.publish(
                    Event::new(EventKind::TaskAdmitted)
                        .with_task(handle.task_id())
                        .with_context(handle.context_id())
                        .with_node(node_id)
                        .with_exclusivity(handle.exclusivity()),
                );
            }
            Admission::Refused(reason) => {
                self.bus.publish(
                    Event::new(EventKind::AdmissionRefused)
                        .with_task(handle.task_id())
                        .with_node(node_id)
                        .with_exclusivity(handle.exclusivity())
                        .with_refusal(reason),
                );
            }
        }
        Ok(admission)
    }

    /// Releases the slot `handle` held on the named node, once the
    /// underlying process is confirmed stopped.
    pub fn notify_task_ended(
        &self,
        node_id: &str,
        handle: &TaskHandle,
    ) -> Result<NodeStatus, GridError> {
        let controller = self.node(node_id).ok_or_else(|| GridError::UnknownNode {
            id: node_id.to_string(),
        })?;

        let status = controller.remove(handle).inspect_err(|e| {
            error!(
                node = node_id,
                task = handle.task_id(),
                error = %e,
                "removal of a handle that was never admitted"
            );
        })?;

        self.bus.publish(
            Event::new(EventKind::TaskReleased)
                .with_task(handle.task_id())
                .with_node(node_id),
        );
        Ok(status)
    }

    /// Moves the stored task entry into `target`, recording `reason`.
    pub fn advance_state(
        &self,
        task_id: &str,
        target: TaskState,
        reason: impl Into<String>,
    ) -> Result<TaskEntry, GridError> {
        let reason = reason.into();
        let entry = self.store.transition(task_id, target, reason.clone())?;
        self.bus.publish(
            Event::new(EventKind::StateChanged)
                .with_task(task_id)
                .with_state(target)
                .with_reason(reason),
        );
        Ok(entry)
    }

    /// Stops forwarding bus events to the subscriber set.
    ///
    /// Already-queued events are still drained by the workers.
    pub fn shutdown(&self) {
        self.listener_token.cancel();
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget), until shutdown or bus closure.
    fn spawn_subscriber_listener(self: &Arc<Self>) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        let token = self.listener_token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::TaskExclusivity;
    use crate::error::{AdmissionError, StateError};

    fn dispatcher() -> Arc<Dispatcher> {
        Dispatcher::new(GridConfig::default(), Vec::new())
    }

    fn descriptor(exclusivity: TaskExclusivity) -> TaskDescriptor {
        TaskDescriptor::new("bench", "/opt/bench/run").with_exclusivity(exclusivity)
    }

    #[tokio::test]
    async fn test_unknown_node_is_an_error() {
        let d = dispatcher();
        let handle = TaskHandle::new("t1", "c1", TaskExclusivity::NonExclusive);

        let err = d.request_admission("nowhere", &handle).unwrap_err();
        assert_eq!(
            err,
            GridError::UnknownNode {
                id: "nowhere".into()
            }
        );
    }

    #[tokio::test]
    async fn test_full_placement_flow_updates_record_and_board() {
        let d = dispatcher();
        d.register_node("n1");

        let entry = d
            .create_task(descriptor(TaskExclusivity::NonExclusive), "c1")
            .unwrap();
        let id = entry.id().to_string();

        d.advance_state(&id, TaskState::Submitted, "queued").unwrap();
        d.advance_state(&id, TaskState::Scheduled, "placed on n1")
            .unwrap();
        d.store().assign_runtime(&id, "n1").unwrap();

        let handle = entry.handle();
        assert!(d.request_admission("n1", &handle).unwrap().is_admitted());
        assert!(handle.is_accepted());
        assert_eq!(d.board().get("n1").unwrap().task_count, 1);

        d.store().set_accepted(&id).unwrap();
        d.store().set_running(&id).unwrap();
        d.store().set_finished(&id, 0).unwrap();

        let status = d.notify_task_ended("n1", &handle).unwrap();
        assert_eq!(status.task_count, 0);
        assert_eq!(status.exclusivity, "NON_EXCLUSIVE");

        let finished = d.store().get(&id).unwrap();
        assert_eq!(finished.state(), TaskState::Finished);
        assert_eq!(finished.exit_code(), Some(0));
    }

    #[tokio::test]
    async fn test_refusal_is_returned_not_raised() {
        let d = dispatcher();
        d.register_node("n1");

        let owner = TaskHandle::new("t1", "c1", TaskExclusivity::Exclusive);
        assert!(d.request_admission("n1", &owner).unwrap().is_admitted());

        let latecomer = TaskHandle::new("t2", "c1", TaskExclusivity::NonExclusive);
        let admission = d.request_admission("n1", &latecomer).unwrap();
        assert!(!admission.is_admitted());
        assert!(!latecomer.is_accepted());
    }

    #[tokio::test]
    async fn test_remove_of_unadmitted_handle_propagates_loudly() {
        let d = dispatcher();
        d.register_node("n1");

        let ghost = TaskHandle::new("ghost", "c1", TaskExclusivity::NonExclusive);
        let err = d.notify_task_ended("n1", &ghost).unwrap_err();
        assert_eq!(
            err,
            GridError::Admission(AdmissionError::NotAdmitted {
                task_id: "ghost".into()
            })
        );
    }

    #[tokio::test]
    async fn test_advance_state_propagates_illegal_transition() {
        let d = dispatcher();
        let entry = d
            .create_task(descriptor(TaskExclusivity::NonExclusive), "c1")
            .unwrap();

        let err = d
            .advance_state(entry.id(), TaskState::Running, "too eager")
            .unwrap_err();
        assert_eq!(
            err,
            GridError::State(StateError::IllegalTransition {
                from: TaskState::Created,
                to: TaskState::Running,
            })
        );
    }

    #[tokio::test]
    async fn test_register_node_is_idempotent() {
        let d = dispatcher();
        let a = d.register_node("n1");
        let b = d.register_node("n1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_domain_events_are_published_in_order() {
        let d = dispatcher();
        d.register_node("n1");
        let mut rx = d.bus().subscribe();

        let entry = d
            .create_task(descriptor(TaskExclusivity::Exclusive), "c1")
            .unwrap();
        d.advance_state(entry.id(), TaskState::Submitted, "queued")
            .unwrap();
        let handle = entry.handle();
        d.request_admission("n1", &handle).unwrap();
        d.request_admission("n1", &TaskHandle::new("t2", "c1", TaskExclusivity::NonExclusive))
            .unwrap();
        d.notify_task_ended("n1", &handle).unwrap();

        let mut kinds = Vec::new();
        for _ in 0..5 {
            kinds.push(rx.recv().await.unwrap().kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskCreated,
                EventKind::StateChanged,
                EventKind::TaskAdmitted,
                EventKind::AdmissionRefused,
                EventKind::TaskReleased,
            ]
        );
    }
}
