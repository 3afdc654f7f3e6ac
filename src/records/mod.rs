//! Task records: the persistent unit of work and its audit trail.
//!
//! This module groups:
//! - [`TaskDescriptor`] what to execute (the subset this core reads)
//! - [`StateChangeEntry`] / [`StateChangeLog`] the append-only audit
//!   trail of every lifecycle transition and its reason
//! - [`TaskEntry`] one schedulable unit of work
//! - [`TaskStore`] the shared map of entries with atomic transitions
//!
//! ## Rules
//! - An entry is mutated only through the transition operation; the log
//!   append and the state write are one indivisible update.
//! - After at least one transition, the log's last entry always names the
//!   entry's current state; before any transition the log is empty.
//! - Entries are never deleted here — disposal belongs to an external
//!   retention policy.

mod change_log;
mod descriptor;
mod entry;
mod store;

pub use change_log::{StateChangeEntry, StateChangeLog};
pub use descriptor::TaskDescriptor;
pub use entry::TaskEntry;
pub use store::TaskStore;
