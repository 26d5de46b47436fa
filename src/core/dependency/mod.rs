//! Pre-run input checks.
//!
//! A declared input counts as present when a same-named file exists in the workspace's
//! staged input area or directly in the data directory. When both exist the staged copy is
//! the one a transform will read, so it takes precedence.

use crate::core::registry::BlockDescriptor;
use crate::core::types::InputSource;
use crate::core::workspace::Workspace;
use std::path::Path;

/// Locate one input, preferring the staged copy.
pub fn resolve_input(name: &str, workspace: &Workspace, data_dir: &Path) -> Option<InputSource> {
    let staged = workspace.staged_input(name);
    if staged.is_file() {
        return Some(InputSource::Staged(staged));
    }
    let stable = data_dir.join(name);
    if stable.is_file() {
        return Some(InputSource::DataDir(stable));
    }
    None
}

/// Declared inputs found in neither location, in declaration order without repeats.
/// An empty result means the block is ready to run.
pub fn missing_inputs(
    block: &BlockDescriptor,
    workspace: &Workspace,
    data_dir: &Path,
) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for input in &block.inputs {
        if missing.contains(input) {
            continue;
        }
        if resolve_input(input, workspace, data_dir).is_none() {
            missing.push(input.clone());
        }
    }
    missing
}
