//! # Example: one task's full lifecycle.
//!
//! Creates a task, walks it from `CREATED` to `FINISHED` through the
//! dispatcher, and prints the audit trail at the end. A
//! [`RunningTracker`] shows which tasks are executing mid-flight.

use std::sync::Arc;

use gridvisor::{
    Dispatcher, GridConfig, LogWriter, RunningTracker, Subscribe, TaskDescriptor, TaskState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tracker = Arc::new(RunningTracker::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter), tracker.clone()];
    let dispatcher = Dispatcher::new(GridConfig::default(), subs);
    dispatcher.register_node("node-1");

    let entry = dispatcher.create_task(
        TaskDescriptor::new("sort-bench", "/opt/bench/sort").with_args(["--input", "1e7"]),
        "ctx-sorting",
    )?;
    let id = entry.id().to_string();

    dispatcher.advance_state(&id, TaskState::Submitted, "queued for placement")?;
    dispatcher.advance_state(&id, TaskState::Scheduled, "placed on node-1")?;
    dispatcher.store().assign_runtime(&id, "node-1")?;

    let handle = entry.handle();
    assert!(dispatcher.request_admission("node-1", &handle)?.is_admitted());

    dispatcher.store().set_accepted(&id)?;
    dispatcher.advance_state(&id, TaskState::Running, "process started")?;

    // Give the fan-out a moment, then peek at what is running.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    println!("running now: {:?}", tracker.snapshot().await);

    dispatcher.advance_state(&id, TaskState::Finished, "exit value 0")?;
    dispatcher.notify_task_ended("node-1", &handle)?;

    let finished = dispatcher
        .store()
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("entry vanished"))?;
    println!("\naudit trail for {}:", finished.id());
    for change in finished.change_log().entries() {
        println!(
            "  {} -> {} ({})",
            change.timestamp().format("%H:%M:%S%.3f"),
            change.state(),
            change.reason()
        );
    }

    dispatcher.shutdown();
    Ok(())
}
