pub mod args;
pub mod commands;

pub use args::{CheckArgs, InspectArgs, PipelineArgs, RunArgs};
use crate::core::{ConfigLoader, HarnessConfig};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::{Path, PathBuf};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
BLOCK COMMANDS:\n{subcommands}\n\
{after-help}";

const FLOW_HELP: &str = "Typical flow: --list to see blocks, check to see what is missing, run a block with --inspect, then pipeline the rest.";

#[derive(Parser, Debug)]
#[command(name = "blockbench")]
#[command(version = crate::VERSION)]
#[command(about = "Run single pipeline blocks against an isolated staging workspace")]
#[command(help_template = HELP_TEMPLATE)]
pub struct Args {
    /// Print every registered block with its declared inputs and outputs
    #[arg(long)]
    pub list: bool,

    /// Config file (default: ./blockbench.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// `--data-dir` given to the subcommand, if any.
    pub fn data_dir_override(&self) -> Option<&Path> {
        match &self.command {
            Some(Command::Run(args)) => args.data_dir.as_deref(),
            Some(Command::Pipeline(args)) => args.data_dir.as_deref(),
            Some(Command::Inspect(args)) => args.data_dir.as_deref(),
            Some(Command::Check(args)) => args.data_dir.as_deref(),
            None => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Run one block end to end",
        long_about = "Run stages the workspace, refuses to start when a declared input is missing, executes the block's transform, and syncs its outputs back to the data directory.",
        after_help = "Example:\n    blockbench run block1_markets --inspect"
    )]
    Run(RunArgs),
    #[command(
        about = "Run several blocks in registry order",
        long_about = "Pipeline runs the selected blocks (all by default) one after another against a single workspace, so each block sees the outputs of the ones before it.",
        after_help = "Examples:\n    blockbench pipeline\n    blockbench pipeline --from block3_curator_B --skip-missing"
    )]
    Pipeline(PipelineArgs),
    #[command(
        about = "Summarize a block's outputs",
        long_about = "Inspect reads each declared output from the data directory and prints its shape, columns, and first rows. Nothing is written.",
        after_help = "Example:\n    blockbench inspect block1_markets --format json"
    )]
    Inspect(InspectArgs),
    #[command(
        about = "Report which blocks are ready to run",
        long_about = "Check looks for every declared input in the staged workspace and the data directory without staging or running anything.",
        after_help = "Example:\n    blockbench check block2_vaults block3_curator_B"
    )]
    Check(CheckArgs),
}

/// The clap command, with the typical flow and the environment overrides appended to `--help`.
pub fn command() -> clap::Command {
    let mut after = format!("{}\n\nENVIRONMENT:\n", FLOW_HELP);
    for line in ConfigLoader::env_var_documentation() {
        after.push_str("    ");
        after.push_str(line);
        after.push('\n');
    }
    Args::command().after_long_help(after)
}

/// Parse the process arguments, exiting with clap's usage error on bad input.
pub fn parse() -> Args {
    let matches = command().get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

pub fn run(args: Args, config: &HarnessConfig) -> crate::Result<()> {
    let Args { list, command, .. } = args;
    if list {
        return commands::list(config);
    }
    match command {
        Some(Command::Run(run_args)) => commands::run(run_args, config),
        Some(Command::Pipeline(pipeline_args)) => commands::pipeline(pipeline_args, config),
        Some(Command::Inspect(inspect_args)) => commands::inspect(inspect_args, config),
        Some(Command::Check(check_args)) => commands::check(check_args, config),
        None => Ok(()),
    }
}
