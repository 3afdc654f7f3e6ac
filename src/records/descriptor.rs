//! # Task descriptor.
//!
//! [`TaskDescriptor`] carries the payload describing what a task executes.
//! The surrounding system treats most of it as opaque; this core reads
//! only the name (for diagnostics) and the declared
//! [`TaskExclusivity`](crate::TaskExclusivity), which drives admission.
//!
//! ## Example
//! ```rust
//! use gridvisor::{TaskDescriptor, TaskExclusivity};
//!
//! let td = TaskDescriptor::new("matrix-mul", "/opt/bench/matrix")
//!     .with_args(["--size", "4096"])
//!     .with_property("iterations", "10")
//!     .with_exclusivity(TaskExclusivity::ContextExclusive);
//!
//! assert_eq!(td.name, "matrix-mul");
//! assert_eq!(td.exclusivity, TaskExclusivity::ContextExclusive);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::admission::TaskExclusivity;

/// Description of what a task executes and under which concurrency class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Human-readable task name.
    pub name: String,
    /// Command to execute on the host runtime.
    pub command: String,
    /// Command-line arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Free-form key/value properties passed through to the process.
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// Declared concurrency class for admission control.
    #[serde(default)]
    pub exclusivity: TaskExclusivity,
}

impl TaskDescriptor {
    /// Creates a non-exclusive descriptor with no args or properties.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            properties: HashMap::new(),
            exclusivity: TaskExclusivity::default(),
        }
    }

    /// Replaces the argument list.
    #[inline]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one property.
    #[inline]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Sets the concurrency class.
    #[inline]
    pub fn with_exclusivity(mut self, exclusivity: TaskExclusivity) -> Self {
        self.exclusivity = exclusivity;
        self
    }
}
