use crate::core::transform::TransformSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Harness configuration loaded from blockbench.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarnessConfig {
    /// Stable data directory settings
    #[serde(default)]
    pub paths: PathsConfig,

    /// Staged workspace layout
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Output inspection limits
    #[serde(default)]
    pub inspect: InspectConfig,

    /// Logging sinks and level
    #[serde(default)]
    pub logging: LoggingSection,

    /// Registered blocks, in pipeline order
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Flat directory holding every declared input and output file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Where the staged tree lives and how it is shaped, relative to the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_dir")]
    pub dir_name: String,

    /// Raw-export path transforms read their inputs from
    #[serde(default = "default_input_subdir")]
    pub input_subdir: PathBuf,

    /// Path transforms write their outputs to before sync-back
    #[serde(default = "default_output_subdir")]
    pub output_subdir: PathBuf,

    /// Additional directories created alongside the input path
    #[serde(default = "default_extra_subdirs")]
    pub extra_subdirs: Vec<PathBuf>,

    /// Extensions `setup` stages from the data directory (case-insensitive; empty stages all)
    #[serde(default = "default_stage_extensions")]
    pub stage_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectConfig {
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    #[serde(default = "default_max_columns")]
    pub max_columns: usize,

    #[serde(default = "default_max_cell_width")]
    pub max_cell_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingSection {
    /// Directory for blockbench.log (default: <workspace>/logs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_file: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_output: Option<String>,
}

/// One `[[blocks]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub inputs: Vec<String>,

    #[serde(default)]
    pub outputs: Vec<String>,

    pub transform: TransformSpec,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_workspace_dir() -> String {
    "_workspace".to_string()
}

fn default_input_subdir() -> PathBuf {
    PathBuf::from("04-data-exports/raw/graphql")
}

fn default_output_subdir() -> PathBuf {
    PathBuf::from("04-data-exports/processed")
}

fn default_extra_subdirs() -> Vec<PathBuf> {
    vec![PathBuf::from("04-data-exports/raw/dune")]
}

fn default_stage_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_preview_rows() -> usize {
    3
}

fn default_max_columns() -> usize {
    10
}

fn default_max_cell_width() -> usize {
    40
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            dir_name: default_workspace_dir(),
            input_subdir: default_input_subdir(),
            output_subdir: default_output_subdir(),
            extra_subdirs: default_extra_subdirs(),
            stage_extensions: default_stage_extensions(),
        }
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        InspectConfig {
            preview_rows: default_preview_rows(),
            max_columns: default_max_columns(),
            max_cell_width: default_max_cell_width(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
