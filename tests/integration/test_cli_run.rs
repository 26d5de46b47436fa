use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BIN: &str = "blockbench";

const CONFIG: &str = r#"
[[blocks]]
name = "block1_markets"
description = "Clean raw market exports"
inputs = ["markets.csv"]
outputs = ["markets_clean.csv"]
transform = { kind = "builtin", name = "csv-clean" }
"#;

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("blockbench.toml"), CONFIG).unwrap();
    fs::create_dir(temp_dir.path().join("data")).unwrap();
    temp_dir
}

fn write_markets(data_dir: &Path) {
    let mut content = String::from("id,chain,symbol,tvl\n");
    for i in 0..10 {
        content.push_str(&format!("{},base,TK{},{}\n", i, i, i * 10));
    }
    fs::write(data_dir.join("markets.csv"), content).unwrap();
}

fn blockbench(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN).expect("binary should build");
    cmd.current_dir(project.path())
        .env_remove("BLOCKBENCH_DATA_DIR")
        .env_remove("BLOCKBENCH_BATCH")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_run_reports_missing_inputs() {
    let project = project();

    blockbench(&project)
        .args(["run", "block1_markets"])
        .assert()
        .failure()
        .code(4)
        .stderr(contains("missing: markets.csv"))
        .stdout(contains("Completed").not());

    assert!(!project.path().join("data/markets_clean.csv").exists());
}

#[test]
fn test_run_with_inspect_prints_summary() {
    let project = project();
    write_markets(&project.path().join("data"));

    blockbench(&project)
        .args(["run", "block1_markets", "--inspect"])
        .assert()
        .success()
        .stdout(contains("Completed block1_markets"))
        .stdout(contains("Synced 1 file(s)"))
        .stdout(contains("markets_clean.csv: 10 rows × 4 cols"))
        .stdout(contains("Columns: id, chain, symbol, tvl"))
        .stdout(contains("Preview:"));

    assert!(project.path().join("data/markets_clean.csv").is_file());
    assert!(project
        .path()
        .join("data/_workspace/logs/blockbench.log")
        .is_file());
}

#[test]
fn test_data_dir_flag_overrides_config() {
    let project = project();
    let elsewhere = project.path().join("elsewhere");
    fs::create_dir(&elsewhere).unwrap();
    write_markets(&elsewhere);

    blockbench(&project)
        .args(["run", "block1_markets", "--data-dir"])
        .arg(&elsewhere)
        .assert()
        .success();

    assert!(elsewhere.join("markets_clean.csv").is_file());
    assert!(!project.path().join("data/markets_clean.csv").exists());
}

#[test]
fn test_unknown_block_lists_choices() {
    let project = project();

    blockbench(&project)
        .args(["run", "block9_nope"])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("Unknown block: block9_nope"))
        .stderr(contains("Available blocks: block1_markets"));
}

#[test]
fn test_no_command_prints_usage() {
    let project = project();

    blockbench(&project)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Usage"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let project = project();

    blockbench(&project)
        .args(["--config", "missing.toml", "--list"])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("Config file not found"));
}

#[test]
fn test_check_lists_missing_inputs_without_staging() {
    let project = project();

    blockbench(&project)
        .arg("check")
        .assert()
        .failure()
        .code(4)
        .stdout(contains("block1_markets: missing markets.csv"));

    assert!(!project.path().join("data/_workspace").exists());
}

#[test]
fn test_inspect_json_reports_not_found() {
    let project = project();

    let output = blockbench(&project)
        .args(["inspect", "block1_markets", "--format", "json"])
        .output()
        .expect("should run");

    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["block"], "block1_markets");
    assert_eq!(payload["outputs"][0]["status"], "not_found");
    assert_eq!(payload["outputs"][0]["file"], "markets_clean.csv");
}

#[test]
fn test_batch_mode_logs_to_file_only() {
    let project = project();
    write_markets(&project.path().join("data"));

    blockbench(&project)
        .env("BLOCKBENCH_BATCH", "1")
        .args(["run", "block1_markets"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    let log = fs::read_to_string(project.path().join("data/_workspace/logs/blockbench.log"))
        .unwrap();
    assert!(log.contains("block completed"));
}

#[cfg(unix)]
#[test]
fn test_command_transform_failure_exits_with_execution_code() {
    let project = project();
    fs::write(
        project.path().join("blockbench.toml"),
        r#"
[[blocks]]
name = "block2_vaults"
outputs = ["vaults.csv"]
transform = { kind = "command", program = "sh", args = ["-c", "echo boom >&2; exit 3"] }
"#,
    )
    .unwrap();

    blockbench(&project)
        .args(["run", "block2_vaults"])
        .assert()
        .failure()
        .code(6)
        .stderr(contains("Block block2_vaults failed"));
}

#[cfg(unix)]
#[test]
fn test_command_transform_writes_to_output_dir() {
    let project = project();
    fs::write(
        project.path().join("blockbench.toml"),
        r#"
[[blocks]]
name = "block2_vaults"
outputs = ["vaults.csv"]
transform = { kind = "command", program = "sh", args = ["-c", "printf 'id\n1\n' > \"$BLOCKBENCH_OUTPUT_DIR/vaults.csv\""] }
"#,
    )
    .unwrap();

    blockbench(&project)
        .args(["run", "block2_vaults", "--format", "json"])
        .assert()
        .success()
        .stdout(contains("\"synced\""));

    assert_eq!(
        fs::read_to_string(project.path().join("data/vaults.csv")).unwrap(),
        "id\n1\n"
    );
}

#[test]
fn test_pipeline_skip_is_reported_as_warning() {
    let project = project();

    blockbench(&project)
        .args(["pipeline", "--skip-missing"])
        .assert()
        .success()
        .stdout(contains("block1_markets: skipped (missing: markets.csv)"))
        .stdout(contains("Pipeline finished: 0 completed, 1 skipped"))
        .stderr(contains("[WARNING] Block block1_markets was skipped"))
        .stderr(contains("missing inputs: markets.csv"));
}
