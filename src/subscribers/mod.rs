//! # Event subscribers for the gridvisor runtime.
//!
//! This module provides the [`Subscribe`] trait and built-in
//! implementations for handling runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Dispatcher ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                  ┌─────────┼─────────┐
//!                                                  ▼         ▼         ▼
//!                                             [queue S1] [queue S2] [queue SN]
//!                                                  ▼         ▼         ▼
//!                                             worker S1  worker S2  worker SN
//!                                                  ▼         ▼         ▼
//!                                             on_event() on_event() on_event()
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** — observe and react to events (logging,
//!   metrics, alerts): [`LogWriter`]
//! - **Stateful subscribers** — maintain internal state based on events:
//!   [`RunningTracker`]

mod log;
mod running;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use running::RunningTracker;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
