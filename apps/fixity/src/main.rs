//! fixity - chunked MD5 re-verification worker
//!
//! This is the CLI binary that wires configuration into the workflow and
//! queue crates: `report` runs one verification directly, `run` feeds ids
//! through the in-process queue and drains it with a single worker.

mod cli;
mod error;

use std::process;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};

use fixity_config::Config;
use fixity_queue::{publish_all, MemoryQueue};
use fixity_worker::{QueueWorker, ReportWorkflow};

use crate::cli::{Cli, Commands};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // file config first, environment on top, then validate everything at
    // once so a bare invocation reports every missing field together
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    config.validate()?;

    match cli.command {
        Commands::Report { file_version_id } => report(file_version_id, &config).await,
        Commands::Run { ids } => run_queue(ids, config).await,
    }
}

/// One-shot verification of a single file version
async fn report(file_version_id: String, config: &Config) -> Result<(), CliError> {
    info!("processing file_version_id: {file_version_id}");
    ReportWorkflow::new(file_version_id.clone(), config)?
        .run()
        .await?;
    info!("md5 reported!");
    println!("md5 reported for file_version {file_version_id}");
    Ok(())
}

/// Publish ids from a file or stdin, then drain the queue with one worker
async fn run_queue(ids: Option<std::path::PathBuf>, config: Config) -> Result<(), CliError> {
    let queue = MemoryQueue::new(config.queue.max_deliveries);

    let published = match ids {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await?;
            publish_all(BufReader::new(file), &queue).await?
        }
        None => publish_all(BufReader::new(tokio::io::stdin()), &queue).await?,
    };
    info!(published, "ids published, draining queue");
    queue.close().await;

    let worker = QueueWorker::new(config);
    let summary = worker.run(&queue).await?;

    let dead = queue.dead_letters().await;
    println!(
        "{} acked, {} rejected deliveries, {} dead-lettered",
        summary.acked,
        summary.rejected,
        dead.len()
    );
    for entry in &dead {
        eprintln!(
            "dead-lettered: {} after {} deliveries",
            entry.job.file_version_id, entry.deliveries
        );
    }

    if dead.is_empty() {
        Ok(())
    } else {
        Err(CliError::DeadLetters(dead.len()))
    }
}

fn init_tracing(debug_enabled_flag: bool) {
    let default_filter = if debug_enabled_flag { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
