use blockbench::core::transform::{BuiltinKind, BuiltinTransform, Transform, TransformContext};
use blockbench::core::{
    missing_inputs, BlockDescriptor, BlockRegistry, BlockRunner, ErrorCategory, Inspector,
    OutputSummary, WorkspaceManager,
};
use std::error::Error as _;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn markets_registry() -> BlockRegistry {
    BlockRegistry::new(vec![BlockDescriptor::new(
        "block1_markets",
        Arc::new(BuiltinTransform::new(BuiltinKind::CsvClean)),
    )
    .with_description("Clean raw market exports")
    .with_inputs(["markets.csv"])
    .with_outputs(["markets_clean.csv"])])
    .unwrap()
}

fn write_markets(dir: &std::path::Path, rows: usize) {
    let mut content = String::from("id,chain,symbol,tvl\n");
    for i in 0..rows {
        content.push_str(&format!("{}, base ,TK{},{}\n", i, i, i * 1000));
    }
    fs::write(dir.join("markets.csv"), content).unwrap();
}

#[test]
fn test_missing_input_refuses_to_run() {
    let temp_dir = TempDir::new().unwrap();
    let registry = markets_registry();
    let manager = WorkspaceManager::default();

    let err = BlockRunner::new(&registry, &manager)
        .run_block("block1_markets", temp_dir.path())
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::MissingInput);
    assert_eq!(err.subjects, vec!["markets.csv"]);
    assert_ne!(err.exit_code(), 0);
    assert!(!temp_dir.path().join("markets_clean.csv").exists());
    let staged_outputs = fs::read_dir(manager.locate(temp_dir.path()).output_dir())
        .unwrap()
        .count();
    assert_eq!(staged_outputs, 0);
}

#[test]
fn test_run_syncs_output_and_inspection_reports_shape() {
    let temp_dir = TempDir::new().unwrap();
    write_markets(temp_dir.path(), 10);
    let registry = markets_registry();
    let manager = WorkspaceManager::default();

    let report = BlockRunner::new(&registry, &manager)
        .run_block("block1_markets", temp_dir.path())
        .unwrap();

    assert_eq!(report.execution.block, "block1_markets");
    assert_eq!(report.sync.synced, vec!["markets_clean.csv"]);
    let cleaned = fs::read_to_string(temp_dir.path().join("markets_clean.csv")).unwrap();
    assert!(cleaned.starts_with("id,chain,symbol,tvl\n0,base,TK0,0\n"));

    let block = registry.lookup("block1_markets").unwrap();
    let summaries = Inspector::default().summarize(block, temp_dir.path());
    let [OutputSummary::Found(table)] = summaries.as_slice() else {
        panic!("expected one found summary, got {:?}", summaries);
    };
    assert_eq!(table.rows, 10);
    assert_eq!(table.columns, 4);
    assert_eq!(table.preview.len(), 3);
}

#[test]
fn test_rerun_is_repeatable() {
    let temp_dir = TempDir::new().unwrap();
    write_markets(temp_dir.path(), 4);
    let registry = markets_registry();
    let manager = WorkspaceManager::default();
    let runner = BlockRunner::new(&registry, &manager);

    runner.run_block("block1_markets", temp_dir.path()).unwrap();
    let first = fs::read_to_string(temp_dir.path().join("markets_clean.csv")).unwrap();
    runner.run_block("block1_markets", temp_dir.path()).unwrap();
    let second = fs::read_to_string(temp_dir.path().join("markets_clean.csv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_unknown_block_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let registry = markets_registry();
    let manager = WorkspaceManager::default();

    let err = BlockRunner::new(&registry, &manager)
        .run_block("block7_unknown", temp_dir.path())
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::NotFound);
    assert_eq!(err.subjects, vec!["block1_markets"]);
    assert!(!manager.locate(temp_dir.path()).root().exists());
}

#[test]
fn test_missing_set_matches_every_removed_subset() {
    let inputs = ["a.csv", "b.csv", "c.csv"];
    let block = BlockDescriptor::new("b", Arc::new(BuiltinTransform::new(BuiltinKind::Copy)))
        .with_inputs(inputs);

    for mask in 0u8..8 {
        let temp_dir = TempDir::new().unwrap();
        let workspace = WorkspaceManager::default().setup(temp_dir.path()).unwrap();
        let mut expected = Vec::new();
        for (i, name) in inputs.iter().enumerate() {
            if mask & (1 << i) != 0 {
                expected.push(name.to_string());
            } else if i % 2 == 0 {
                fs::write(workspace.staged_input(name), "x\n").unwrap();
            } else {
                fs::write(temp_dir.path().join(name), "x\n").unwrap();
            }
        }

        assert_eq!(
            missing_inputs(&block, &workspace, temp_dir.path()),
            expected,
            "mask {:03b}",
            mask
        );
    }
}

#[derive(Debug)]
struct ExplodingTransform;

impl Transform for ExplodingTransform {
    fn kind(&self) -> String {
        "test:exploding".to_string()
    }

    fn run(&self, ctx: &TransformContext<'_>) -> anyhow::Result<()> {
        fs::write(ctx.output_path("partial.csv"), "half\n")?;
        anyhow::bail!("division by zero in tvl column")
    }
}

#[test]
fn test_transform_failure_keeps_cause_and_skips_sync() {
    let temp_dir = TempDir::new().unwrap();
    let registry = BlockRegistry::new(vec![BlockDescriptor::new(
        "block4_exploding",
        Arc::new(ExplodingTransform),
    )
    .with_outputs(["partial.csv"])])
    .unwrap();
    let manager = WorkspaceManager::default();

    let err = BlockRunner::new(&registry, &manager)
        .run_block("block4_exploding", temp_dir.path())
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::ExecutionError);
    assert_eq!(
        err.source().unwrap().to_string(),
        "division by zero in tvl column"
    );
    assert!(!temp_dir.path().join("partial.csv").exists());
    assert!(manager
        .locate(temp_dir.path())
        .output_dir()
        .join("partial.csv")
        .is_file());
}

#[derive(Debug)]
struct SilentTransform;

impl Transform for SilentTransform {
    fn kind(&self) -> String {
        "test:silent".to_string()
    }

    fn run(&self, _ctx: &TransformContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn test_undelivered_output_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let registry = BlockRegistry::new(vec![BlockDescriptor::new(
        "block5_silent",
        Arc::new(SilentTransform),
    )
    .with_outputs(["never.csv"])])
    .unwrap();
    let manager = WorkspaceManager::default();

    let err = BlockRunner::new(&registry, &manager)
        .run_block("block5_silent", temp_dir.path())
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::MissingOutput);
    assert_eq!(err.subjects, vec!["never.csv"]);
    assert_eq!(err.exit_code(), 7);
}

/// Writes `file` into the output area on its first `limit` runs, then writes nothing.
#[derive(Debug)]
struct WriterTransform {
    file: &'static str,
    limit: usize,
    runs: AtomicUsize,
}

impl WriterTransform {
    fn new(file: &'static str, limit: usize) -> Self {
        WriterTransform {
            file,
            limit,
            runs: AtomicUsize::new(0),
        }
    }
}

impl Transform for WriterTransform {
    fn kind(&self) -> String {
        "test:writer".to_string()
    }

    fn run(&self, ctx: &TransformContext<'_>) -> anyhow::Result<()> {
        if self.runs.fetch_add(1, Ordering::SeqCst) < self.limit {
            fs::write(ctx.output_path(self.file), "id\n1\n")?;
        }
        Ok(())
    }
}

#[test]
fn test_later_block_does_not_resync_earlier_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let registry = BlockRegistry::new(vec![
        BlockDescriptor::new("block_a", Arc::new(WriterTransform::new("a.csv", usize::MAX)))
            .with_outputs(["a.csv"]),
        BlockDescriptor::new("block_b", Arc::new(WriterTransform::new("b.csv", usize::MAX)))
            .with_outputs(["b.csv"]),
    ])
    .unwrap();
    let manager = WorkspaceManager::default();
    let runner = BlockRunner::new(&registry, &manager);

    runner.run_block("block_a", temp_dir.path()).unwrap();
    fs::write(temp_dir.path().join("a.csv"), "id\n1\n2\n").unwrap();
    let report = runner.run_block("block_b", temp_dir.path()).unwrap();

    assert_eq!(report.sync.synced, vec!["b.csv"]);
    assert_eq!(report.execution.produced, vec!["b.csv"]);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("a.csv")).unwrap(),
        "id\n1\n2\n"
    );
}

#[test]
fn test_output_left_by_earlier_run_is_still_missing() {
    let temp_dir = TempDir::new().unwrap();
    let registry = BlockRegistry::new(vec![BlockDescriptor::new(
        "block6_flaky",
        Arc::new(WriterTransform::new("flaky.csv", 1)),
    )
    .with_outputs(["flaky.csv"])])
    .unwrap();
    let manager = WorkspaceManager::default();
    let runner = BlockRunner::new(&registry, &manager);

    let first = runner.run_block("block6_flaky", temp_dir.path()).unwrap();
    assert_eq!(first.sync.synced, vec!["flaky.csv"]);

    let err = runner
        .run_block("block6_flaky", temp_dir.path())
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::MissingOutput);
    assert_eq!(err.subjects, vec!["flaky.csv"]);
    assert!(!manager
        .locate(temp_dir.path())
        .output_dir()
        .join("flaky.csv")
        .exists());
}

#[test]
fn test_declared_non_csv_input_is_staged_for_run() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("prices.json"), "{\"eth\": 1}").unwrap();
    let registry = BlockRegistry::new(vec![BlockDescriptor::new(
        "block7_prices",
        Arc::new(WriterTransform::new("prices.csv", usize::MAX)),
    )
    .with_inputs(["prices.json"])
    .with_outputs(["prices.csv"])])
    .unwrap();
    let manager = WorkspaceManager::default();

    BlockRunner::new(&registry, &manager)
        .run_block("block7_prices", temp_dir.path())
        .unwrap();

    let workspace = manager.locate(temp_dir.path());
    assert!(workspace.staged_input("prices.json").is_file());
}
