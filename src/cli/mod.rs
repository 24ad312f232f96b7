//! CLI module for ConcatX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// ConcatX video joiner
///
/// Joins clips with transitions: clip bodies are stream-copied, only the
/// transition regions are re-encoded.
#[derive(Parser, Debug)]
#[command(name = "concatx")]
#[command(about = "ConcatX - Join video clips with transitions, re-encoding only the overlaps")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./concatx.toml when present)
    #[arg(long, global = true, env = "CONCATX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Maximum number of concurrent ffmpeg/ffprobe processes
    #[arg(long, global = true)]
    pub max_concurrency: Option<usize>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Join clips into one file
    Join(args::JoinArgs),
    /// Show the fragment plan without writing anything
    Plan(args::PlanArgs),
    /// Print the duration of each clip
    Probe(args::ProbeArgs),
}
