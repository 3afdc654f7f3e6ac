//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [created] task=4f1c... context=ctx-1
//! [state] task=4f1c... state=RUNNING reason="Task is going to be run on n1"
//! [admitted] task=4f1c... node=n1 exclusivity=NON_EXCLUSIVE
//! [refused] task=9a2e... node=n1 reason=node_exclusive
//! [released] task=4f1c... node=n1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Not intended for production use — implement a custom [`Subscribe`]
/// for structured logging or metrics collection.
#[derive(Debug, Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskCreated => {
                println!(
                    "[created] task={:?} context={:?}",
                    e.task, e.context
                );
            }
            EventKind::StateChanged => {
                println!(
                    "[state] task={:?} state={:?} reason={:?}",
                    e.task, e.state, e.reason
                );
            }
            EventKind::TaskAdmitted => {
                println!(
                    "[admitted] task={:?} node={:?} exclusivity={:?}",
                    e.task, e.node, e.exclusivity
                );
            }
            EventKind::AdmissionRefused => {
                println!(
                    "[refused] task={:?} node={:?} reason={:?}",
                    e.task, e.node, e.refusal
                );
            }
            EventKind::TaskReleased => {
                println!("[released] task={:?} node={:?}", e.task, e.node);
            }
            EventKind::SubscriberOverflow => {
                println!("[overflow] subscriber={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!("[panic] subscriber={:?} reason={:?}", e.task, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
