//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fixity - re-verify uploaded files chunk by chunk and report their MD5
#[derive(Parser)]
#[command(name = "fixity")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chunked MD5 re-verification worker for DDS-style storage services")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Verify one file version and report its MD5
    Report {
        /// File version id to verify
        file_version_id: String,
    },

    /// Publish ids onto an in-process queue and drain it with one worker
    Run {
        /// File of ids, one per line (stdin when omitted)
        #[arg(long, value_name = "PATH")]
        ids: Option<PathBuf>,
    },
}
