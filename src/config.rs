//! # Global runtime configuration.
//!
//! [`GridConfig`] defines the dispatcher's behavior: event-bus capacity
//! and any future cluster-level tunables.
//!
//! # Example
//! ```
//! use gridvisor::GridConfig;
//!
//! let mut cfg = GridConfig::default();
//! cfg.bus_capacity = 4096;
//! assert_eq!(cfg.bus_capacity, 4096);
//! ```

/// Configuration for the dispatcher and its event bus.
#[derive(Clone, Debug)]
pub struct GridConfig {
    /// Capacity of the event bus channel, shared across all receivers.
    pub bus_capacity: usize,
}

impl Default for GridConfig {
    /// Provides a default configuration:
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self { bus_capacity: 1024 }
    }
}
