#![allow(clippy::result_large_err)]

use super::HarnessConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "blockbench.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from an explicit path, or from ./blockbench.toml when none is given.
    /// An explicit path must exist; a missing default file yields defaults.
    /// Environment variables override config file values.
    pub fn load(explicit: Option<&Path>) -> Result<HarnessConfig, AppError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?.ok_or_else(|| {
                AppError::new(
                    ErrorCategory::NotFound,
                    format!("Config file not found: {}", path.display()),
                )
                .with_code("CFG-404")
            })?,
            None => Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?.unwrap_or_default(),
        };

        Self::apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<HarnessConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::io("read config file", path, e))?;

        let config: HarnessConfig = toml::from_str(&content).map_err(|e| {
            AppError::validation(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(config: &mut HarnessConfig) {
        if let Ok(data_dir) = env::var("BLOCKBENCH_DATA_DIR") {
            if !data_dir.trim().is_empty() {
                config.paths.data_dir = PathBuf::from(data_dir);
            }
        }

        if let Ok(level) = env::var("BLOCKBENCH_LOG_LEVEL") {
            if !level.trim().is_empty() {
                config.logging.default_level = Some(level);
            }
        }

        if let Ok(log_dir) = env::var("BLOCKBENCH_LOG_DIR") {
            if !log_dir.trim().is_empty() {
                config.logging.log_dir = Some(PathBuf::from(log_dir));
            }
        }
    }

    /// Data directory for a command: the CLI flag wins over env and config file.
    pub fn resolve_data_dir(config: &HarnessConfig, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.paths.data_dir.clone())
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "BLOCKBENCH_DATA_DIR - Override the stable data directory (default: data)",
            "BLOCKBENCH_LOG_LEVEL - Override the logging level (default: info)",
            "BLOCKBENCH_LOG_DIR - Override the log file directory (default: <workspace>/logs)",
            "BLOCKBENCH_BATCH - Set to 1 to silence console logs and keep only the log file",
            "RUST_LOG - Full tracing filter, takes precedence over BLOCKBENCH_LOG_LEVEL",
        ]
    }
}
