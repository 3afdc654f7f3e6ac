//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the dispatcher as tasks are
//! created, admitted, refused, released, and moved through their
//! lifecycle.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: [`Dispatcher`](crate::Dispatcher), subscriber
//!   workers (overflow/panic self-diagnostics).
//! - **Consumers**: [`SubscriberSet`](crate::SubscriberSet) workers and
//!   any direct [`Bus::subscribe`] receiver, e.g.
//!   [`RunningTracker`](crate::RunningTracker).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
