#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::registry::BlockDescriptor;
use crate::core::workspace::Workspace;
use crate::utils::files;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// File names copied into the data directory, sorted.
    pub synced: Vec<String>,
}

impl SyncReport {
    pub fn count(&self) -> usize {
        self.synced.len()
    }
}

/// Copy the files a run produced from the staged output area into `data_dir`, overwriting
/// same-named files.
///
/// `produced` names files inside the output area, normally `ExecutionReport::produced`.
/// Leftovers from earlier runs are not copied, so an operator's edit to the data directory is
/// only replaced by the block that actually rewrites that file. Each synced file is also
/// refreshed in the staged input area so later blocks that run against the same workspace read
/// the new content. Files in `data_dir` that were not produced are left alone.
pub fn sync_back(
    workspace: &Workspace,
    data_dir: &Path,
    produced: &[String],
) -> Result<SyncReport, AppError> {
    let mut report = SyncReport::default();
    let mut names: Vec<&String> = produced.iter().collect();
    names.sort();
    names.dedup();
    for name in names {
        let source = workspace.output_dir().join(name);
        if !source.is_file() {
            tracing::warn!(file = %name, "produced file vanished before sync");
            continue;
        }
        files::copy_file(&source, &data_dir.join(name))?;
        if workspace.input_dir().is_dir() {
            files::copy_file(&source, &workspace.input_dir().join(name))?;
        }
        report.synced.push(name.clone());
    }

    if report.count() > 0 {
        tracing::info!(
            count = report.count(),
            data_dir = %data_dir.display(),
            "synced outputs back"
        );
    }
    Ok(report)
}

/// Declared outputs this run did not deliver, in declaration order.
///
/// A file counts as delivered only when it was synced by the same run, so a copy left in the
/// data directory by an earlier run never satisfies the declaration.
pub fn missing_outputs(block: &BlockDescriptor, sync: &SyncReport) -> Vec<String> {
    block
        .outputs
        .iter()
        .filter(|name| !sync.synced.contains(name))
        .cloned()
        .collect()
}
