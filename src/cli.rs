//! CLI argument parsing for the provenance stamping tool.
//!
//! The CLI is intentionally thin: report assembly lives in the library so the
//! same gathering logic can be embedded in experiment frameworks directly.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "provstamp",
    version,
    about = "Stamp reproducibility provenance onto experiment outputs",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Report(ReportArgs),
    Config(ConfigArgs),
}

/// Report command inputs.
#[derive(Parser, Debug)]
#[command(about = "Gather a provenance report for this process")]
pub struct ReportArgs {
    /// Include environment, platform, accelerator, and asset detail
    #[arg(long)]
    pub full: bool,

    /// Asset file to fingerprint (repeatable)
    #[arg(long, value_name = "PATH")]
    pub asset: Vec<PathBuf>,

    /// Output path for the report JSON (defaults to stdout)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

/// Configuration store inputs.
#[derive(Parser, Debug)]
#[command(about = "Read or write the per-user configuration store")]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the value at a dotted key path
    Get {
        /// Dotted key path, e.g. roots.venv
        key: String,
    },
    /// Set a dotted key path to a string value
    Set {
        /// Dotted key path, e.g. peek.nc
        key: String,
        /// Value to store
        value: String,
    },
}
