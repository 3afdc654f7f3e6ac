//! # Per-node admission controller.
//!
//! One [`AdmissionController`] exists per node, constructed at node
//! startup and alive for the node's uptime. It serializes concurrent
//! admit/remove requests into a single consistent decision about how
//! many, and which kind of, tasks occupy the node.
//!
//! ## Regimes
//! - `NON_EXCLUSIVE`: any number of non-exclusive tasks run together.
//! - `EXCLUSIVE`: exactly one task runs; nothing else is admitted.
//! - `CONTEXT_EXCLUSIVE`: any number of tasks run together if every one
//!   of them carries the bound context id.
//!
//! ## Rules
//! - The decision is check-then-act: one mutex spans the whole
//!   decide-and-mutate sequence. Two racing `try_admit` calls can never
//!   both observe an idle node and both claim exclusivity.
//! - Neither operation blocks on I/O or waits; both return as soon as the
//!   lock is acquired and the logic evaluated.
//! - The node-status mirror is written inside the critical section, so it
//!   equals the internal counters after every call returns.
//!
//! ## Example
//! ```rust
//! use gridvisor::{AdmissionController, StatusBoard, TaskExclusivity, TaskHandle};
//!
//! let board = StatusBoard::new();
//! let ctrl = AdmissionController::new("node-1", board.clone());
//!
//! let t1 = TaskHandle::new("t1", "c1", TaskExclusivity::Exclusive);
//! assert!(ctrl.try_admit(&t1).is_admitted());
//!
//! // The node is monopolized; a second task is refused.
//! let t2 = TaskHandle::new("t2", "c1", TaskExclusivity::NonExclusive);
//! assert!(!ctrl.try_admit(&t2).is_admitted());
//!
//! // Releasing the last task resets the node to non-exclusive.
//! ctrl.remove(&t1).unwrap();
//! assert_eq!(board.get("node-1").unwrap().task_count, 0);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::AdmissionError;

use super::exclusivity::TaskExclusivity;
use super::handle::TaskHandle;
use super::status::{NodeStatus, StatusBoard};

/// Outcome of one admission attempt.
///
/// Refusal is an expected, frequent result — the placement layer retries
/// elsewhere — so it is a value, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The task may start occupying an execution slot on this node.
    Admitted,
    /// The task may not run here right now.
    Refused(RefusalReason),
}

impl Admission {
    /// Returns true if the task was admitted.
    #[inline]
    pub fn is_admitted(self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Why an admission attempt was refused.
///
/// Reasons exist for logs and observability only; placement policy must
/// branch on [`Admission::is_admitted`], never on the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    /// Non-exclusive tasks are active; an exclusive class cannot join.
    ExclusivityConflict,
    /// An exclusive task owns the node until it completes.
    NodeExclusive,
    /// The node is bound to a different context, or the task does not
    /// carry the context-exclusive class.
    ContextMismatch,
    /// A task with this id is already admitted here.
    AlreadyAdmitted,
}

impl RefusalReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            RefusalReason::ExclusivityConflict => "exclusivity_conflict",
            RefusalReason::NodeExclusive => "node_exclusive",
            RefusalReason::ContextMismatch => "context_mismatch",
            RefusalReason::AlreadyAdmitted => "already_admitted",
        }
    }
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Occupancy of the node, guarded as one unit.
struct Occupancy {
    /// Ids of admitted tasks. The count *is* this set's size, and removal
    /// of a never-admitted handle is caught by the set.
    admitted: HashSet<String>,
    /// Current concurrency mode.
    mode: TaskExclusivity,
    /// Bound task id (`EXCLUSIVE`) or context id (`CONTEXT_EXCLUSIVE`).
    bound_id: Option<String>,
}

impl Occupancy {
    fn idle() -> Self {
        Self {
            admitted: HashSet::new(),
            mode: TaskExclusivity::NonExclusive,
            bound_id: None,
        }
    }
}

/// Gatekeeper for one node's execution slots.
///
/// Explicitly constructed and explicitly owned — one instance per node
/// process, injected into whatever message-handling code needs it.
/// Multiple instances per test process are fine; they share nothing but
/// the board they are given.
pub struct AdmissionController {
    node_id: String,
    board: StatusBoard,
    occupancy: Mutex<Occupancy>,
}

impl AdmissionController {
    /// Creates an idle controller for `node_id` and publishes its initial
    /// (empty) status on the board.
    pub fn new(node_id: impl Into<String>, board: StatusBoard) -> Self {
        let controller = Self {
            node_id: node_id.into(),
            board,
            occupancy: Mutex::new(Occupancy::idle()),
        };
        controller.board.store(NodeStatus::idle(&controller.node_id));
        controller
    }

    /// Returns the id of the node this controller guards.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Decides whether `handle` may start executing on this node.
    ///
    /// The decision procedure, under the controller's lock:
    /// 1. idle node → admit and adopt the handle's class as the node mode;
    /// 2. mode `NON_EXCLUSIVE` → admit only non-exclusive tasks;
    /// 3. mode `EXCLUSIVE` → refuse everything;
    /// 4. mode `CONTEXT_EXCLUSIVE` → admit only context-exclusive tasks
    ///    bound to the same context id.
    ///
    /// On admission the handle's `accepted` flag is set and the mirrored
    /// node status is updated before this method returns. On refusal
    /// nothing changes anywhere.
    pub fn try_admit(&self, handle: &TaskHandle) -> Admission {
        let mut occ = self.lock();

        if occ.admitted.contains(handle.task_id()) {
            warn!(
                node = %self.node_id,
                task = %handle.task_id(),
                "duplicate admission attempt"
            );
            return Admission::Refused(RefusalReason::AlreadyAdmitted);
        }

        if let Some(reason) = self.decide(&occ, handle) {
            debug!(
                node = %self.node_id,
                task = %handle.task_id(),
                reason = %reason,
                "admission refused"
            );
            return Admission::Refused(reason);
        }

        if occ.admitted.is_empty() {
            occ.mode = handle.exclusivity();
            occ.bound_id = match handle.exclusivity() {
                TaskExclusivity::Exclusive => Some(handle.task_id().to_string()),
                TaskExclusivity::ContextExclusive => Some(handle.context_id().to_string()),
                TaskExclusivity::NonExclusive => None,
            };
        }

        occ.admitted.insert(handle.task_id().to_string());
        handle.mark_accepted();
        self.publish(&occ);

        debug!(
            node = %self.node_id,
            task = %handle.task_id(),
            mode = %occ.mode,
            count = occ.admitted.len(),
            "task admitted"
        );
        Admission::Admitted
    }

    /// Releases the slot held by `handle`.
    ///
    /// When the last task leaves, the node's mode resets to
    /// `NON_EXCLUSIVE` and the bound id clears — a node with zero tasks
    /// has no standing exclusivity claim. While siblings remain, mode and
    /// bound id are left untouched.
    ///
    /// Removing a handle that was never admitted is a caller bug and
    /// fails with [`AdmissionError::NotAdmitted`].
    pub fn remove(&self, handle: &TaskHandle) -> Result<NodeStatus, AdmissionError> {
        let mut occ = self.lock();

        if !occ.admitted.remove(handle.task_id()) {
            return Err(AdmissionError::NotAdmitted {
                task_id: handle.task_id().to_string(),
            });
        }

        if occ.admitted.is_empty() {
            occ.mode = TaskExclusivity::NonExclusive;
            occ.bound_id = None;
        }

        let status = self.publish(&occ);
        debug!(
            node = %self.node_id,
            task = %handle.task_id(),
            count = status.task_count,
            "task removed"
        );
        Ok(status)
    }

    /// Returns the number of currently admitted tasks.
    pub fn task_count(&self) -> usize {
        self.lock().admitted.len()
    }

    /// Returns a copy of the node status as derived from internal state
    /// (not read back from the board).
    pub fn snapshot(&self) -> NodeStatus {
        let occ = self.lock();
        self.status_of(&occ)
    }

    /// Evaluates steps 2–4 of the decision procedure; `None` means admit.
    /// Step 1 (idle node) is the caller's `is_empty` check.
    fn decide(&self, occ: &Occupancy, handle: &TaskHandle) -> Option<RefusalReason> {
        if occ.admitted.is_empty() {
            return None;
        }
        match occ.mode {
            TaskExclusivity::NonExclusive => {
                if handle.exclusivity() == TaskExclusivity::NonExclusive {
                    None
                } else {
                    Some(RefusalReason::ExclusivityConflict)
                }
            }
            TaskExclusivity::Exclusive => Some(RefusalReason::NodeExclusive),
            TaskExclusivity::ContextExclusive => {
                let same_class = handle.exclusivity() == TaskExclusivity::ContextExclusive;
                let same_context = occ.bound_id.as_deref() == Some(handle.context_id());
                if same_class && same_context {
                    None
                } else {
                    Some(RefusalReason::ContextMismatch)
                }
            }
        }
    }

    fn status_of(&self, occ: &Occupancy) -> NodeStatus {
        NodeStatus {
            node_id: self.node_id.clone(),
            task_count: occ.admitted.len(),
            exclusivity: occ.mode.to_string(),
            exclusive_id: occ.bound_id.clone(),
        }
    }

    /// Writes the mirror while the caller still holds the lock.
    fn publish(&self, occ: &Occupancy) -> NodeStatus {
        let status = self.status_of(occ);
        self.board.store(status.clone());
        status
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Occupancy> {
        self.occupancy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    fn controller() -> (AdmissionController, StatusBoard) {
        let board = StatusBoard::new();
        let ctrl = AdmissionController::new("n1", board.clone());
        (ctrl, board)
    }

    fn non_exclusive(task: &str, ctx: &str) -> TaskHandle {
        TaskHandle::new(task, ctx, TaskExclusivity::NonExclusive)
    }

    fn exclusive(task: &str, ctx: &str) -> TaskHandle {
        TaskHandle::new(task, ctx, TaskExclusivity::Exclusive)
    }

    fn context_exclusive(task: &str, ctx: &str) -> TaskHandle {
        TaskHandle::new(task, ctx, TaskExclusivity::ContextExclusive)
    }

    /// Board record must equal the controller's own view at every check.
    fn assert_mirrored(ctrl: &AdmissionController, board: &StatusBoard) {
        assert_eq!(
            board.get(ctrl.node_id()).expect("status published"),
            ctrl.snapshot(),
            "mirror out of sync with controller"
        );
    }

    #[test]
    fn test_non_exclusive_tasks_share_and_exclusive_is_refused() {
        let (ctrl, board) = controller();

        let t1 = non_exclusive("t1", "c1");
        let t2 = non_exclusive("t2", "c1");
        let t3 = exclusive("t3", "c2");

        assert!(ctrl.try_admit(&t1).is_admitted());
        assert_eq!(ctrl.task_count(), 1);
        assert_eq!(ctrl.snapshot().exclusivity, "NON_EXCLUSIVE");

        assert!(ctrl.try_admit(&t2).is_admitted());
        assert_eq!(ctrl.task_count(), 2);

        assert_eq!(
            ctrl.try_admit(&t3),
            Admission::Refused(RefusalReason::ExclusivityConflict)
        );
        assert_eq!(ctrl.task_count(), 2, "refusal must not change the count");
        assert!(!t3.is_accepted());
        assert_mirrored(&ctrl, &board);
    }

    #[test]
    fn test_exclusive_task_monopolizes_node_until_removed() {
        let (ctrl, board) = controller();

        let t1 = exclusive("t1", "c1");
        assert!(ctrl.try_admit(&t1).is_admitted());
        assert!(t1.is_accepted());

        let status = ctrl.snapshot();
        assert_eq!(status.task_count, 1);
        assert_eq!(status.exclusivity, "EXCLUSIVE");
        assert_eq!(status.exclusive_id.as_deref(), Some("t1"));

        assert_eq!(
            ctrl.try_admit(&non_exclusive("t2", "c1")),
            Admission::Refused(RefusalReason::NodeExclusive)
        );
        assert_eq!(
            ctrl.try_admit(&exclusive("t2", "c1")),
            Admission::Refused(RefusalReason::NodeExclusive)
        );

        let status = ctrl.remove(&t1).unwrap();
        assert_eq!(status.task_count, 0);
        assert_eq!(status.exclusivity, "NON_EXCLUSIVE");
        assert!(status.exclusive_id.is_none());
        assert_mirrored(&ctrl, &board);
    }

    #[test]
    fn test_context_exclusive_shares_within_context_only() {
        let (ctrl, board) = controller();

        let t1 = context_exclusive("t1", "c1");
        let t2 = context_exclusive("t2", "c1");
        let t3 = context_exclusive("t3", "c2");

        assert!(ctrl.try_admit(&t1).is_admitted());
        let status = ctrl.snapshot();
        assert_eq!(status.exclusivity, "CONTEXT_EXCLUSIVE");
        assert_eq!(status.exclusive_id.as_deref(), Some("c1"));

        assert!(ctrl.try_admit(&t2).is_admitted());
        assert_eq!(ctrl.task_count(), 2);
        assert_eq!(ctrl.snapshot().exclusive_id.as_deref(), Some("c1"));

        assert_eq!(
            ctrl.try_admit(&t3),
            Admission::Refused(RefusalReason::ContextMismatch)
        );

        // Removing one sibling keeps the context claim in force.
        let status = ctrl.remove(&t2).unwrap();
        assert_eq!(status.task_count, 1);
        assert_eq!(status.exclusivity, "CONTEXT_EXCLUSIVE");
        assert_eq!(status.exclusive_id.as_deref(), Some("c1"));

        // A non-exclusive task from the bound context is still refused.
        assert_eq!(
            ctrl.try_admit(&non_exclusive("t4", "c1")),
            Admission::Refused(RefusalReason::ContextMismatch)
        );
        assert_mirrored(&ctrl, &board);
    }

    #[test]
    fn test_draining_to_zero_releases_context_claim() {
        let (ctrl, _board) = controller();

        let t1 = context_exclusive("t1", "c1");
        assert!(ctrl.try_admit(&t1).is_admitted());
        ctrl.remove(&t1).unwrap();

        // The node is idle again; any class may claim it.
        let t2 = exclusive("t2", "c9");
        assert!(ctrl.try_admit(&t2).is_admitted());
        assert_eq!(ctrl.snapshot().exclusive_id.as_deref(), Some("t2"));
    }

    #[test]
    fn test_remove_of_never_admitted_handle_is_an_error() {
        let (ctrl, _board) = controller();

        let ghost = non_exclusive("ghost", "c1");
        let err = ctrl.remove(&ghost).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::NotAdmitted {
                task_id: "ghost".into()
            }
        );
        assert_eq!(ctrl.task_count(), 0);
    }

    #[test]
    fn test_duplicate_admission_is_refused() {
        let (ctrl, _board) = controller();

        let t1 = non_exclusive("t1", "c1");
        assert!(ctrl.try_admit(&t1).is_admitted());
        assert_eq!(
            ctrl.try_admit(&t1.clone()),
            Admission::Refused(RefusalReason::AlreadyAdmitted)
        );
        assert_eq!(ctrl.task_count(), 1);
    }

    #[test]
    fn test_concurrent_exclusive_admits_elect_exactly_one() {
        const N: usize = 16;

        let (ctrl, board) = controller();
        let handles: Vec<TaskHandle> = (0..N)
            .map(|i| exclusive(&format!("t{i}"), "c1"))
            .collect();

        let barrier = Barrier::new(N);
        std::thread::scope(|s| {
            let barrier = &barrier;
            let ctrl = &ctrl;
            for handle in &handles {
                s.spawn(move || {
                    barrier.wait();
                    ctrl.try_admit(handle)
                });
            }
        });

        let admitted = handles.iter().filter(|h| h.is_accepted()).count();
        assert_eq!(admitted, 1, "exactly one exclusive task may win the node");
        assert_eq!(ctrl.task_count(), 1);
        assert_eq!(board.get("n1").unwrap().exclusivity, "EXCLUSIVE");
        assert_mirrored(&ctrl, &board);
    }

    #[test]
    fn test_mirror_tracks_every_settled_sequence() {
        let (ctrl, board) = controller();

        let t1 = non_exclusive("t1", "c1");
        let t2 = non_exclusive("t2", "c1");

        ctrl.try_admit(&t1);
        assert_mirrored(&ctrl, &board);
        ctrl.try_admit(&t2);
        assert_mirrored(&ctrl, &board);
        ctrl.try_admit(&exclusive("t3", "c2"));
        assert_mirrored(&ctrl, &board);
        ctrl.remove(&t1).unwrap();
        assert_mirrored(&ctrl, &board);
        ctrl.remove(&t2).unwrap();
        assert_mirrored(&ctrl, &board);

        let status = board.get("n1").unwrap();
        assert_eq!(status, NodeStatus::idle("n1"));
    }
}
