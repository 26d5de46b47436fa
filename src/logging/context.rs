use crate::cli::{Args, Command};
use std::env;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Commands that only read (`--list`, `inspect`, `check`); nothing may be written to disk.
    ReadOnly,
    /// Commands that stage and run blocks from an operator's terminal.
    Staging,
    /// Staging commands driven by a script; console logs are silenced.
    Batch,
}

impl ExecutionContext {
    /// Returns `true` when a log file may be created.
    pub fn allows_file(self) -> bool {
        !matches!(self, ExecutionContext::ReadOnly)
    }
}

/// Derive the active execution context from parsed CLI arguments plus overrides.
pub fn detect_context(args: &Args) -> ExecutionContext {
    if args.list {
        return ExecutionContext::ReadOnly;
    }
    match &args.command {
        Some(Command::Run(_)) | Some(Command::Pipeline(_)) => {
            if batch_override_enabled() {
                ExecutionContext::Batch
            } else {
                ExecutionContext::Staging
            }
        }
        Some(Command::Inspect(_)) | Some(Command::Check(_)) | None => ExecutionContext::ReadOnly,
    }
}

fn batch_override_enabled() -> bool {
    env::var("BLOCKBENCH_BATCH")
        .map(|value| value.trim() == "1")
        .unwrap_or(false)
}
