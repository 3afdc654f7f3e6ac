//! Host-local admission control.
//!
//! This module decides, per node, which tasks may occupy execution slots
//! at the same time. It groups:
//! - [`TaskExclusivity`] the three concurrency classes a task declares
//! - [`TaskHandle`] the immutable identity a caller presents for admission
//! - [`AdmissionController`] the per-node gatekeeper
//! - [`Admission`] / [`RefusalReason`] the admission outcome
//! - [`NodeStatus`] / [`StatusBoard`] the cluster-visible mirror of each
//!   controller's state
//!
//! ## Architecture
//! ```text
//!  placement layer                 per-node                cluster-visible
//!                                  controller              status
//!  try_admit(handle) ───────► ┌──────────────────┐
//!                             │ Mutex<Occupancy> │ ─────► StatusBoard
//!  remove(handle) ──────────► │  admitted ids    │        {count, mode,
//!                             │  mode, bound id  │         bound id}
//!                             └──────────────────┘
//! ```
//!
//! ## Rules
//! - One lock per controller spans the whole decide-and-mutate sequence;
//!   two concurrent `try_admit` calls can never both observe an idle node.
//! - The status board is written inside the same critical section, so the
//!   mirror equals the internal counters after every call returns.
//! - Refusal is a normal outcome ([`Admission::Refused`]); only removing a
//!   handle that was never admitted is an error.

mod controller;
mod exclusivity;
mod handle;
mod status;

pub use controller::{Admission, AdmissionController, RefusalReason};
pub use exclusivity::TaskExclusivity;
pub use handle::TaskHandle;
pub use status::{NodeStatus, StatusBoard};
