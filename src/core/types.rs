use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    NotFound,
    MissingInput,
    MissingOutput,
    IoError,
    ExecutionError,
    ValidationError,
    InternalError,
}

impl ErrorCategory {
    /// Process exit status reported for errors of this category.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCategory::InternalError => 1,
            ErrorCategory::NotFound => 3,
            ErrorCategory::MissingInput => 4,
            ErrorCategory::IoError => 5,
            ErrorCategory::ExecutionError => 6,
            ErrorCategory::MissingOutput => 7,
            ErrorCategory::ValidationError => 8,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Where a declared input was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "path", rename_all = "snake_case")]
pub enum InputSource {
    /// Copy inside the workspace's staged input area.
    Staged(PathBuf),
    /// Copy directly in the stable data directory.
    DataDir(PathBuf),
}

impl InputSource {
    pub fn path(&self) -> &PathBuf {
        match self {
            InputSource::Staged(path) | InputSource::DataDir(path) => path,
        }
    }
}

/// Output rendering for commands that print reports.
#[derive(Clone, Copy, clap::ValueEnum, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON payload suitable for downstream tooling
    Json,
}
