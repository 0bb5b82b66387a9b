//! CLI definitions for lembrete-server.

use clap::Parser;
use std::path::PathBuf;

/// Task reminder server with a line-oriented TCP protocol.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen host (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to the JSON task file (overrides config)
    #[arg(short, long)]
    pub tasks_file: Option<PathBuf>,

    /// Seconds between reminder scans (overrides config)
    #[arg(long)]
    pub tick: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,
}
