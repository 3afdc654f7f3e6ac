//! # Example: exclusivity-aware placement across nodes.
//!
//! Registers three nodes and walks a mix of exclusivity classes through
//! admission, showing refusals being retried on other nodes.

use std::sync::Arc;

use gridvisor::{
    Admission, Dispatcher, GridConfig, LogWriter, Subscribe, TaskDescriptor, TaskExclusivity,
};

/// Tries each node in order until one admits the handle.
fn place(
    dispatcher: &Dispatcher,
    nodes: &[&str],
    handle: &gridvisor::TaskHandle,
) -> anyhow::Result<Option<String>> {
    for node in nodes {
        match dispatcher.request_admission(node, handle)? {
            Admission::Admitted => return Ok(Some(node.to_string())),
            Admission::Refused(reason) => {
                println!("  {} refused {} ({reason})", node, handle.task_id());
            }
        }
    }
    Ok(None)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let dispatcher = Dispatcher::new(GridConfig::default(), subs);
    let nodes = ["alpha", "beta", "gamma"];
    for node in nodes {
        dispatcher.register_node(node);
    }

    // An exclusive task claims the first node outright.
    let iobench = dispatcher.create_task(
        TaskDescriptor::new("io-bench", "/opt/bench/io")
            .with_exclusivity(TaskExclusivity::Exclusive),
        "ctx-io",
    )?;
    let iobench_handle = iobench.handle();
    println!("placing io-bench (EXCLUSIVE)...");
    let io_node = place(&dispatcher, &nodes, &iobench_handle)?
        .ok_or_else(|| anyhow::anyhow!("no node admitted io-bench"))?;
    println!("  io-bench landed on {io_node}");

    // Context-exclusive siblings pile onto one node together; anything
    // else bounces off both occupied nodes.
    println!("placing ctx-matrix siblings (CONTEXT_EXCLUSIVE)...");
    for name in ["matrix-a", "matrix-b"] {
        let entry = dispatcher.create_task(
            TaskDescriptor::new(name, "/opt/bench/matrix")
                .with_exclusivity(TaskExclusivity::ContextExclusive),
            "ctx-matrix",
        )?;
        let placed = place(&dispatcher, &nodes, &entry.handle())?;
        println!("  {name} landed on {placed:?}");
    }

    println!("placing warmup (NON_EXCLUSIVE)...");
    let warmup = dispatcher.create_task(
        TaskDescriptor::new("warmup", "/bin/true"),
        "ctx-misc",
    )?;
    let placed = place(&dispatcher, &nodes, &warmup.handle())?;
    println!("  warmup landed on {placed:?}");

    // Releasing the exclusive task frees its node for anyone.
    dispatcher.notify_task_ended(&io_node, &iobench_handle)?;

    println!("\nnode occupancy:");
    for status in dispatcher.board().all() {
        println!(
            "  {}: count={} mode={} bound={:?}",
            status.node_id, status.task_count, status.exclusivity, status.exclusive_id
        );
    }

    dispatcher.shutdown();
    Ok(())
}
