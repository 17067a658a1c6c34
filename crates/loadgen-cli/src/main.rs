//! cpuloadgen - programmable CPU load generator
//!
//! Applies the PWM principle to a synthetic Dhrystone-flavored workload to
//! hold selected CPU cores at a requested average load.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod dispatcher;

/// Generate adjustable processing load on selected CPU core(s).
///
/// Load is a percentage between 1 and 100, duration is in seconds.
/// If duration is omitted, load is generated endlessly. With no assignment
/// at all, every online core gets 100% load indefinitely.
#[derive(Debug, Parser)]
#[command(name = "cpuloadgen")]
#[command(about = "Generate adjustable processing load on selected CPU core(s)")]
#[command(version)]
struct Cli {
    /// Load assignments: `cpu<N>=<percent>` and/or `duration=<seconds>`,
    /// in any order (e.g. `cpu3=100 cpu1=50 duration=5`)
    #[arg(value_name = "ASSIGNMENT")]
    assignments: Vec<String>,

    /// Print per-unit run reports as JSON on completion
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.verbose);

    let unit_count = online_units();
    let requests = args::build_requests(&cli.assignments, unit_count)?;

    let summary = dispatcher::run_all(requests);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary.reports)?);
    }

    if !summary.all_succeeded() {
        anyhow::bail!(
            "load generation failed on {} unit(s): {:?}",
            summary.failed_units.len(),
            summary.failed_units
        );
    }
    Ok(())
}

fn online_units() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

fn init_tracing(log_level: &str, verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        match log_level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "info" => tracing::Level::INFO,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("loadgen_core={0},loadgen_cli={0}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
