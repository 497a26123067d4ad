//! CLI argument parsing and subcommand dispatch.

use batchgate_core::Priority;
use batchgate_engine::Scheduler;

/// Parse CLI arguments and dispatch to the appropriate subcommand.
///
/// Returns `Ok(true)` if a subcommand was handled, `Ok(false)` if `serve`
/// should be started (handled by the caller).
pub async fn dispatch(config: &batchgate_core::Config, args: &[String]) -> anyhow::Result<bool> {
    match args.get(1).map(|s| s.as_str()) {
        None | Some("serve") => Ok(false),
        Some("ingest") => {
            let (priority, ids) = parse_ingest_args(&args[2..])?;
            ingest(config, priority, ids).await?;
            Ok(true)
        }
        _ => {
            print_usage();
            Ok(true)
        }
    }
}

/// `ingest <PRIORITY> <id>...`: ids that parse as JSON (numbers, quoted
/// strings) are kept as such, anything else is taken as a plain string.
fn parse_ingest_args(args: &[String]) -> anyhow::Result<(Priority, Vec<serde_json::Value>)> {
    let Some((priority, ids)) = args.split_first() else {
        anyhow::bail!("Usage: batchgate ingest <HIGH|MEDIUM|LOW> <id>...");
    };
    let priority: Priority = priority.parse()?;
    let ids = ids
        .iter()
        .map(|raw| {
            serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.clone()))
        })
        .collect();
    Ok((priority, ids))
}

/// Run one ingestion in-process and print its final state.
async fn ingest(
    config: &batchgate_core::Config,
    priority: Priority,
    ids: Vec<serde_json::Value>,
) -> anyhow::Result<()> {
    let scheduler = Scheduler::new(config.scheduler.clone());
    let ingestion_id = scheduler.submit(ids, priority)?.to_string();
    tracing::info!("Submitted ingestion {}: waiting for it to finish", ingestion_id);

    let snapshot = scheduler.wait_for(&ingestion_id).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn print_usage() {
    println!("batchgate v{}", env!("CARGO_PKG_VERSION"));
    println!("Usage: batchgate <command>");
    println!("  serve                               Start HTTP server (default)");
    println!("  ingest <HIGH|MEDIUM|LOW> <id>...    Run one ingestion in-process and print its status");
}
