//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::Settings;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::commands::signal::shutdown_signal;
use crate::pipeline::{plan_run, run_once, RunPlan};

/// Execute the `run` command
pub async fn run_command(args: &RunArgs, settings: &Settings) -> Result<()> {
    info!(
        input = %settings.input.dir.display(),
        dry_run = args.dry_run,
        "Settings loaded"
    );

    // Dry run - scan, validate and plan, no network calls
    if args.dry_run {
        let plan = plan_run(settings).await.context("Dry run failed")?;
        print_plan(&plan);
        return Ok(());
    }

    tokio::select! {
        result = run_once(settings) => {
            let stats = result.context("Processing run failed")?;
            if stats.report.is_clean() {
                info!(files = stats.report.succeeded, "Run completed successfully");
            } else {
                warn!(
                    failed = stats.report.failed,
                    invalid = stats.report.invalid,
                    unreadable = stats.report.skipped,
                    "Run completed with files left in place"
                );
            }
            stats.print_summary();
        }
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping run...");
        }
    }

    info!("Task Relay finished");
    Ok(())
}

/// Print the dry-run plan
fn print_plan(plan: &RunPlan) {
    let scan = &plan.scan;
    println!("\n=== Dry Run ===\n");
    println!("Files discovered: {}", scan.discovered);
    println!("  Ready: {}", scan.ready.len());
    println!("  Invalid: {}", scan.invalid.len());
    println!("  Unreadable: {}", scan.skipped.len());

    for issue in scan.invalid.iter().chain(&scan.skipped) {
        println!("  - {}: {}", issue.path.display(), issue.reason);
    }

    println!("\nPreload batches ({}):", plan.chunks.len());
    for chunk in &plan.chunks {
        println!("  - {} ({}): {}", chunk.country, chunk.names.len(), chunk.names.join(", "));
    }

    println!();
}
