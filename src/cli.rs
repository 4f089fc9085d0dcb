// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::Target;

/// Command-line arguments for `spectree`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "spectree",
    version,
    about = "Compute per-timestamp variances of directional wave spectra with a distributed task tree.",
    long_about = None
)]
pub struct CliArgs {
    /// Directories scanned recursively for `<station><variable><year>.txt.gz` files.
    #[arg(required = true, value_name = "DIR")]
    pub inputs: Vec<PathBuf>,

    /// Path to a config file (TOML). Defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory receiving the per-year outputs and the logs.
    ///
    /// Overrides `[output].dir`.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of remote worker contexts. Overrides `[runtime].remote_workers`.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Where group tasks run (local or remote). Overrides `[placement].group`.
    #[arg(long, value_name = "TARGET")]
    pub group_placement: Option<Target>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SPECTREE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Scan and print the groups found, without processing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
