use blockbench::core::config::{ConfigLoader, ConfigValidator};
use blockbench::core::transform::TransformSpec;
use blockbench::core::ErrorCategory;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_blockbench_env() {
    for v in &[
        "BLOCKBENCH_DATA_DIR",
        "BLOCKBENCH_LOG_LEVEL",
        "BLOCKBENCH_LOG_DIR",
        "BLOCKBENCH_BATCH",
    ] {
        env::remove_var(v);
    }
}

const FULL_CONFIG: &str = r#"
[paths]
data_dir = "exports"

[workspace]
dir_name = "_stage"
input_subdir = "raw/graphql"
output_subdir = "processed"
extra_subdirs = ["raw/dune", "raw/manual"]

[inspect]
preview_rows = 5
max_columns = 6
max_cell_width = 24

[logging]
default_level = "debug"
enable_file = false
console_output = "stdout"

[[blocks]]
name = "block1_markets"
description = "Clean raw market exports"
inputs = ["markets.csv"]
outputs = ["markets_clean.csv"]
transform = { kind = "builtin", name = "csv-clean" }

[[blocks]]
name = "block2_vaults"
inputs = ["markets_clean.csv", "vaults.csv"]
outputs = ["vaults_enriched.csv"]

[blocks.transform]
kind = "command"
program = "python3"
args = ["scripts/vaults.py", "--out", "{output_dir}"]
env = { CHAIN = "base" }
"#;

/// Every section of the file is honoured and the result passes validation.
#[test]
#[serial]
fn test_full_config_round_trip() {
    clear_blockbench_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blockbench.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = ConfigLoader::load(Some(&path)).unwrap();
    ConfigValidator::validate(&config).unwrap();

    assert_eq!(config.paths.data_dir, PathBuf::from("exports"));
    assert_eq!(config.workspace.dir_name, "_stage");
    assert_eq!(config.workspace.extra_subdirs.len(), 2);
    assert_eq!(config.inspect.preview_rows, 5);
    assert_eq!(config.logging.enable_file, Some(false));
    assert_eq!(config.blocks.len(), 2);
    match &config.blocks[1].transform {
        TransformSpec::Command { program, args, env } => {
            assert_eq!(program, "python3");
            assert_eq!(args[2], "{output_dir}");
            assert_eq!(env.get("CHAIN").map(String::as_str), Some("base"));
        }
        other => panic!("unexpected transform {:?}", other),
    }
}

#[test]
#[serial]
fn test_defaults_when_sections_missing() {
    clear_blockbench_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blockbench.toml");
    fs::write(&path, "").unwrap();

    let config = ConfigLoader::load(Some(&path)).unwrap();

    assert_eq!(config.paths.data_dir, PathBuf::from("data"));
    assert_eq!(config.workspace.dir_name, "_workspace");
    assert_eq!(
        config.workspace.input_subdir,
        PathBuf::from("04-data-exports/raw/graphql")
    );
    assert_eq!(
        config.workspace.output_subdir,
        PathBuf::from("04-data-exports/processed")
    );
    assert_eq!(config.inspect.max_columns, 10);
    assert_eq!(config.inspect.max_cell_width, 40);
    assert!(config.blocks.is_empty());
}

#[test]
#[serial]
fn test_env_overrides_apply_after_file() {
    clear_blockbench_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blockbench.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    env::set_var("BLOCKBENCH_DATA_DIR", "/srv/exports");
    env::set_var("BLOCKBENCH_LOG_LEVEL", "trace");
    env::set_var("BLOCKBENCH_LOG_DIR", "/var/log/blockbench");
    let config = ConfigLoader::load(Some(&path)).unwrap();
    clear_blockbench_env();

    assert_eq!(config.paths.data_dir, PathBuf::from("/srv/exports"));
    assert_eq!(config.logging.default_level.as_deref(), Some("trace"));
    assert_eq!(
        config.logging.log_dir,
        Some(PathBuf::from("/var/log/blockbench"))
    );
}

#[test]
#[serial]
fn test_blank_env_values_ignored() {
    clear_blockbench_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blockbench.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    env::set_var("BLOCKBENCH_DATA_DIR", "  ");
    let config = ConfigLoader::load(Some(&path)).unwrap();
    clear_blockbench_env();

    assert_eq!(config.paths.data_dir, PathBuf::from("exports"));
}

#[test]
#[serial]
fn test_overlapping_subdirs_rejected() {
    clear_blockbench_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blockbench.toml");
    fs::write(
        &path,
        "[workspace]\ninput_subdir = \"raw\"\noutput_subdir = \"raw/processed\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load(Some(&path)).unwrap();
    let err = ConfigValidator::validate(&config).unwrap_err();

    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert!(err.message.contains("overlap"));
}

#[test]
#[serial]
fn test_nested_file_names_rejected() {
    clear_blockbench_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blockbench.toml");
    fs::write(
        &path,
        r#"
[[blocks]]
name = "b"
inputs = ["../secrets.csv"]
transform = { kind = "builtin", name = "copy" }
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(Some(&path)).unwrap();
    assert!(ConfigValidator::validate(&config).is_err());
}

#[test]
fn test_env_documentation_mentions_every_override() {
    let docs = ConfigLoader::env_var_documentation().join("\n");
    for var in [
        "BLOCKBENCH_DATA_DIR",
        "BLOCKBENCH_LOG_LEVEL",
        "BLOCKBENCH_LOG_DIR",
        "BLOCKBENCH_BATCH",
    ] {
        assert!(docs.contains(var), "{} undocumented", var);
    }
}
