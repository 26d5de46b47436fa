use crate::core::types::OutputFormat;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Registered block to stage, check, execute, and sync
    #[arg(value_name = "BLOCK")]
    pub block: String,

    /// Print a summary of each declared output after the run
    #[arg(long)]
    pub inspect: bool,

    /// Stable data directory (default: [paths] data_dir, or ./data)
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Format for the run summary and inspection
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Blocks to run, in registry order (default: every registered block)
    #[arg(value_name = "BLOCK", conflicts_with = "from")]
    pub blocks: Vec<String>,

    /// Run this block and every block registered after it
    #[arg(long, value_name = "BLOCK")]
    pub from: Option<String>,

    /// Skip blocks whose inputs are missing instead of stopping
    #[arg(long)]
    pub skip_missing: bool,

    /// Print a summary of each declared output after every completed block
    #[arg(long)]
    pub inspect: bool,

    /// Stable data directory (default: [paths] data_dir, or ./data)
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Block whose declared outputs should be summarized
    #[arg(value_name = "BLOCK")]
    pub block: String,

    /// Stable data directory (default: [paths] data_dir, or ./data)
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Emit either terminal-friendly text or machine-readable JSON
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Blocks to check (default: every registered block)
    #[arg(value_name = "BLOCK")]
    pub blocks: Vec<String>,

    /// Stable data directory (default: [paths] data_dir, or ./data)
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}
