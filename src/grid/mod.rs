//! Grid core: routing between the placement layer, task records, and
//! per-node admission controllers.
//!
//! The only public API from this module is [`Dispatcher`], which owns the
//! shared task store, the node registry, the status board, and the event
//! bus, and exposes the narrow interfaces the surrounding system calls.

mod dispatcher;

pub use dispatcher::Dispatcher;
