#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::registry::BlockDescriptor;
use crate::core::transform::TransformContext;
use crate::core::workspace::Workspace;
use crate::utils::files;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Result of one successful transform invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub block: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    /// Files in the output area that this run created or rewrote, sorted by name.
    pub produced: Vec<String>,
}

impl ExecutionReport {
    pub fn elapsed_human(&self) -> String {
        // Millisecond precision keeps humantime from printing nanoseconds.
        let rounded = Duration::from_millis(self.elapsed.as_millis() as u64);
        humantime::format_duration(rounded).to_string()
    }
}

/// Runs a block's transform against a staged workspace ("patch-and-run").
///
/// The transform receives the workspace's staged paths explicitly; nothing outside the
/// workspace is handed to it. The block's own declared outputs are removed from the output
/// area first, so a leftover from an earlier run can never pass for a fresh product. Failures
/// come back as `ExecutionError` with the transform's own error as the source, and no retry
/// or cleanup is attempted.
#[derive(Debug, Default)]
pub struct BlockExecutor;

impl BlockExecutor {
    pub fn new() -> Self {
        BlockExecutor
    }

    pub fn run(
        &self,
        block: &BlockDescriptor,
        workspace: &Workspace,
    ) -> Result<ExecutionReport, AppError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("block", name = %block.name, run_id = %run_id);
        let _entered = span.enter();

        for dir in [workspace.input_dir(), workspace.output_dir()] {
            fs::create_dir_all(dir).map_err(|e| AppError::io("create directory", dir, e))?;
        }
        for name in &block.outputs {
            let stale = workspace.output_dir().join(name);
            if stale.is_file() {
                fs::remove_file(&stale)
                    .map_err(|e| AppError::io("remove previous output", &stale, e))?;
            }
        }
        let before = files::stamps(workspace.output_dir())?;

        let ctx = TransformContext {
            block: &block.name,
            inputs: &block.inputs,
            outputs: &block.outputs,
            workspace_root: workspace.root(),
            input_dir: workspace.input_dir(),
            output_dir: workspace.output_dir(),
        };

        tracing::info!(
            transform = %block.transform.kind(),
            input_dir = %workspace.input_dir().display(),
            output_dir = %workspace.output_dir().display(),
            "running block"
        );

        let started_at = Utc::now();
        let start = Instant::now();
        let result = block.transform.run(&ctx);
        let elapsed = start.elapsed();

        match result {
            Ok(()) => {
                let produced: Vec<String> = files::stamps(workspace.output_dir())?
                    .into_iter()
                    .filter(|(name, stamp)| before.get(name) != Some(stamp))
                    .map(|(name, _)| name)
                    .collect();
                tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    produced = produced.len(),
                    "block completed"
                );
                Ok(ExecutionReport {
                    block: block.name.clone(),
                    run_id,
                    started_at,
                    elapsed,
                    produced,
                })
            }
            Err(cause) => {
                tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %cause,
                    "block failed"
                );
                Err(AppError::execution(&block.name, cause)
                    .with_context("run_id", run_id.to_string()))
            }
        }
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
