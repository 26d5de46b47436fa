#![allow(clippy::result_large_err)]

use crate::core::dependency::missing_inputs;
use crate::core::error::AppError;
use crate::core::executor::{BlockExecutor, ExecutionReport};
use crate::core::registry::{BlockDescriptor, BlockRegistry};
use crate::core::sync::{missing_outputs, sync_back, SyncReport};
use crate::core::workspace::{Workspace, WorkspaceManager};
use serde::Serialize;
use std::path::Path;

/// Everything that happened during one end-to-end block run.
#[derive(Debug, Clone, Serialize)]
pub struct BlockRunReport {
    pub execution: ExecutionReport,
    pub sync: SyncReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BlockOutcome {
    Completed(BlockRunReport),
    Skipped { block: String, missing: Vec<String> },
}

impl BlockOutcome {
    pub fn block(&self) -> &str {
        match self {
            BlockOutcome::Completed(report) => &report.execution.block,
            BlockOutcome::Skipped { block, .. } => block,
        }
    }
}

/// Which blocks a pipeline run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineSelection {
    #[default]
    All,
    /// The named blocks, run in registry order.
    Only(Vec<String>),
    /// The named block and every block registered after it.
    From(String),
}

/// Sequences stage → check → execute → sync for blocks of a registry.
pub struct BlockRunner<'a> {
    registry: &'a BlockRegistry,
    workspaces: &'a WorkspaceManager,
    executor: BlockExecutor,
}

impl<'a> BlockRunner<'a> {
    pub fn new(registry: &'a BlockRegistry, workspaces: &'a WorkspaceManager) -> Self {
        BlockRunner {
            registry,
            workspaces,
            executor: BlockExecutor::new(),
        }
    }

    /// Run one block by name. Missing inputs abort before the transform is invoked; declared
    /// outputs the run did not produce are reported as `MissingOutput`.
    pub fn run_block(&self, name: &str, data_dir: &Path) -> Result<BlockRunReport, AppError> {
        let block = self.registry.lookup(name)?;
        let workspace = self.workspaces.setup(data_dir)?;
        self.workspaces.stage_declared(&workspace, &block.inputs)?;
        self.check_and_run(block, &workspace)
    }

    /// Run a selection of blocks in registry order against one workspace. With
    /// `skip_missing`, blocks whose inputs are missing are skipped instead of aborting.
    pub fn run_pipeline(
        &self,
        selection: &PipelineSelection,
        data_dir: &Path,
        skip_missing: bool,
    ) -> Result<Vec<BlockOutcome>, AppError> {
        let blocks = self.select(selection)?;
        let workspace = self.workspaces.setup(data_dir)?;

        let mut outcomes = Vec::with_capacity(blocks.len());
        for block in blocks {
            self.workspaces.stage_declared(&workspace, &block.inputs)?;
            let missing = missing_inputs(block, &workspace, data_dir);
            if !missing.is_empty() {
                if !skip_missing {
                    return Err(AppError::missing_inputs(&block.name, missing));
                }
                tracing::warn!(block = %block.name, missing = ?missing, "skipping block");
                outcomes.push(BlockOutcome::Skipped {
                    block: block.name.clone(),
                    missing,
                });
                continue;
            }
            outcomes.push(BlockOutcome::Completed(
                self.execute_and_sync(block, &workspace)?,
            ));
        }
        Ok(outcomes)
    }

    /// Resolve a selection to descriptors in registry order, failing on unknown names.
    pub fn select(
        &self,
        selection: &PipelineSelection,
    ) -> Result<Vec<&'a BlockDescriptor>, AppError> {
        match selection {
            PipelineSelection::All => Ok(self.registry.list().collect()),
            PipelineSelection::Only(names) => {
                for name in names {
                    self.registry.lookup(name)?;
                }
                Ok(self
                    .registry
                    .list()
                    .filter(|block| names.contains(&block.name))
                    .collect())
            }
            PipelineSelection::From(name) => {
                self.registry.lookup(name)?;
                let start = self.registry.position(name).unwrap_or(0);
                Ok(self.registry.list().skip(start).collect())
            }
        }
    }

    fn check_and_run(
        &self,
        block: &BlockDescriptor,
        workspace: &Workspace,
    ) -> Result<BlockRunReport, AppError> {
        let missing = missing_inputs(block, workspace, workspace.data_dir());
        if !missing.is_empty() {
            return Err(AppError::missing_inputs(&block.name, missing));
        }
        self.execute_and_sync(block, workspace)
    }

    fn execute_and_sync(
        &self,
        block: &BlockDescriptor,
        workspace: &Workspace,
    ) -> Result<BlockRunReport, AppError> {
        let execution = self.executor.run(block, workspace)?;
        let sync = sync_back(workspace, workspace.data_dir(), &execution.produced)?;

        let absent = missing_outputs(block, &sync);
        if !absent.is_empty() {
            return Err(AppError::missing_outputs(&block.name, absent)
                .with_context("synced", sync.count().to_string()));
        }
        Ok(BlockRunReport { execution, sync })
    }
}
