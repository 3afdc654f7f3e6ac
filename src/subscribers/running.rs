//! # Stateful subscriber that tracks currently running tasks.
//!
//! [`RunningTracker`] maintains an in-memory set of task ids that are in
//! state `RUNNING`, by listening to
//! [`EventKind::StateChanged`](crate::EventKind::StateChanged) events:
//! a change to `RUNNING` inserts the id, a change to a later state
//! (`FINISHED`, `ABORTED`) removes it.
//!
//! Reporting tooling uses the snapshot to answer "what is executing
//! right now?" without touching any controller or the task store.
//!
//! ## Example
//! ```no_run
//! # use gridvisor::{Bus, RunningTracker};
//! # use tokio_util::sync::CancellationToken;
//! # async fn demo() {
//! let bus = Bus::new(1024);
//! let tracker = RunningTracker::new();
//!
//! // Either register it as a subscriber, or give it its own listener:
//! let token = CancellationToken::new();
//! tracker.spawn_listener(bus.subscribe(), token.clone());
//!
//! let running = tracker.snapshot().await;
//! println!("currently running: {running:?}");
//! # }
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::events::{Event, EventKind};
use crate::states::TaskState;

use super::Subscribe;

/// Tracks which tasks are currently running.
///
/// Thread-safe and cloneable — clones share the same internal state.
#[derive(Clone, Default)]
pub struct RunningTracker {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl RunningTracker {
    /// Creates a new, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a background task that consumes events from `rx` and
    /// updates the tracker until `token` is cancelled or the bus closes.
    ///
    /// Use this when the tracker is not registered with a
    /// [`SubscriberSet`](crate::SubscriberSet).
    pub fn spawn_listener(
        &self,
        mut rx: tokio::sync::broadcast::Receiver<Event>,
        token: CancellationToken,
    ) {
        let inner = self.inner.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => Self::apply(&inner, &ev).await,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
            }
        });
    }

    /// Returns a snapshot of currently running task ids.
    pub async fn snapshot(&self) -> Vec<String> {
        let g = self.inner.lock().await;
        g.iter().cloned().collect()
    }

    async fn apply(inner: &Mutex<HashSet<String>>, ev: &Event) {
        if ev.kind != EventKind::StateChanged {
            return;
        }
        let (Some(task), Some(state)) = (&ev.task, ev.state) else {
            return;
        };
        match state {
            TaskState::Running => {
                inner.lock().await.insert(task.to_string());
            }
            TaskState::Finished | TaskState::Aborted => {
                inner.lock().await.remove(task.as_ref());
            }
            _ => {}
        }
    }
}

#[async_trait]
impl Subscribe for RunningTracker {
    async fn on_event(&self, event: &Event) {
        Self::apply(&self.inner, event).await;
    }

    fn name(&self) -> &'static str {
        "running_tracker"
    }
}
