#![allow(clippy::result_large_err)]

use super::HarnessConfig;
use crate::core::error::AppError;
use crate::core::transform::TransformSpec;
use std::collections::HashSet;
use std::path::{Component, Path};

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &HarnessConfig) -> Result<(), AppError> {
        let workspace = &config.workspace;
        if workspace.dir_name.trim().is_empty() || workspace.dir_name.contains(['/', '\\']) {
            return Err(AppError::validation(
                "workspace.dir_name must be a single non-empty directory name",
            ));
        }

        check_subdir("workspace.input_subdir", &workspace.input_subdir)?;
        check_subdir("workspace.output_subdir", &workspace.output_subdir)?;
        for extra in &workspace.extra_subdirs {
            check_subdir("workspace.extra_subdirs", extra)?;
        }

        // Outputs are promoted into the input area under the same names.
        if workspace.input_subdir.starts_with(&workspace.output_subdir)
            || workspace.output_subdir.starts_with(&workspace.input_subdir)
        {
            return Err(AppError::validation(
                "workspace.input_subdir and workspace.output_subdir must not overlap",
            ));
        }

        for ext in &workspace.stage_extensions {
            let ext = ext.trim_start_matches('.');
            if ext.is_empty() || ext.contains(['/', '\\', '.', '*']) {
                return Err(AppError::validation(format!(
                    "workspace.stage_extensions: {:?} is not a file extension",
                    ext
                )));
            }
        }

        if config.inspect.preview_rows == 0
            || config.inspect.max_columns == 0
            || config.inspect.max_cell_width < 4
        {
            return Err(AppError::validation(
                "inspect limits must be positive (max_cell_width at least 4)",
            ));
        }

        let mut names = HashSet::new();
        for block in &config.blocks {
            if block.name.trim().is_empty() {
                return Err(AppError::validation("block name cannot be empty"));
            }
            if !names.insert(block.name.as_str()) {
                return Err(AppError::validation(format!(
                    "block {} is registered more than once",
                    block.name
                )));
            }
            for file in block.inputs.iter().chain(block.outputs.iter()) {
                if !is_plain_file_name(file) {
                    return Err(AppError::validation(format!(
                        "block {}: {:?} must be a plain file name",
                        block.name, file
                    )));
                }
            }
            if let TransformSpec::Command { program, .. } = &block.transform {
                if program.trim().is_empty() {
                    return Err(AppError::validation(format!(
                        "block {}: command transform requires a program",
                        block.name
                    )));
                }
            }
        }

        Ok(())
    }
}

fn check_subdir(field: &str, path: &Path) -> Result<(), AppError> {
    let relative = !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !relative {
        return Err(AppError::validation(format!(
            "{} must be a relative path without '..': {}",
            field,
            path.display()
        )));
    }
    Ok(())
}

fn is_plain_file_name(name: &str) -> bool {
    let path = Path::new(name);
    matches!(
        path.components().collect::<Vec<_>>().as_slice(),
        [Component::Normal(_)]
    )
}
