use crate::{
    cli::args::{CheckArgs, InspectArgs, PipelineArgs, RunArgs},
    core::{
        missing_inputs, AppError, BlockOutcome, BlockRegistry, BlockRunReport, BlockRunner,
        ConfigLoader, DefaultErrorReporter, ErrorCategory, ErrorReporter, HarnessConfig, Inspector,
        OutputFormat, PipelineSelection, WorkspaceLayout, WorkspaceManager,
    },
    Result,
};
use serde_json::json;

fn workspace_manager(config: &HarnessConfig) -> WorkspaceManager {
    WorkspaceManager::new(WorkspaceLayout::from(&config.workspace))
}

/// Print every registered block in stage order. Reads nothing from disk besides the config.
pub fn list(config: &HarnessConfig) -> Result<()> {
    let registry = BlockRegistry::from_config(config)?;
    if registry.is_empty() {
        println!("No blocks registered. Add [[blocks]] entries to the config file.");
        return Ok(());
    }

    let width = registry
        .list()
        .map(|block| block.name.len())
        .max()
        .unwrap_or(0);
    for block in registry.list() {
        if block.description.is_empty() {
            println!("{}", block.name);
        } else {
            println!("{:<width$}  {}", block.name, block.description, width = width);
        }
        println!("    inputs: {}", joined_or_none(&block.inputs));
        println!("    outputs: {}", joined_or_none(&block.outputs));
    }
    Ok(())
}

pub fn run(args: RunArgs, config: &HarnessConfig) -> Result<()> {
    let registry = BlockRegistry::from_config(config)?;
    let manager = workspace_manager(config);
    let data_dir = ConfigLoader::resolve_data_dir(config, args.data_dir.as_deref());

    let block = registry.lookup(&args.block)?;
    if args.format == OutputFormat::Text {
        print_banner(&block.name, &block.description);
    }

    let report = BlockRunner::new(&registry, &manager).run_block(&args.block, &data_dir)?;
    let inspector = Inspector::new(config.inspect.clone());
    let outputs = args.inspect.then(|| inspector.summarize(block, &data_dir));

    match args.format {
        OutputFormat::Text => {
            print_run_summary(&report, &data_dir.display().to_string());
            if let Some(outputs) = outputs {
                println!("\nOutputs:");
                print!("{}", inspector.render_text(&outputs));
            }
        }
        OutputFormat::Json => {
            let payload = json!({
                "report": report,
                "outputs": outputs,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

pub fn pipeline(args: PipelineArgs, config: &HarnessConfig) -> Result<()> {
    let registry = BlockRegistry::from_config(config)?;
    let manager = workspace_manager(config);
    let data_dir = ConfigLoader::resolve_data_dir(config, args.data_dir.as_deref());

    let selection = match (&args.from, args.blocks.is_empty()) {
        (Some(from), _) => PipelineSelection::From(from.clone()),
        (None, true) => PipelineSelection::All,
        (None, false) => PipelineSelection::Only(args.blocks.clone()),
    };

    let outcomes = BlockRunner::new(&registry, &manager).run_pipeline(
        &selection,
        &data_dir,
        args.skip_missing,
    )?;

    let inspector = Inspector::new(config.inspect.clone());
    let reporter = DefaultErrorReporter::new();
    let mut completed = 0usize;
    for outcome in &outcomes {
        match outcome {
            BlockOutcome::Completed(report) => {
                completed += 1;
                println!(
                    "{}: completed in {}, {} file(s) synced",
                    report.execution.block,
                    report.execution.elapsed_human(),
                    report.sync.count()
                );
                if args.inspect {
                    let block = registry.lookup(&report.execution.block)?;
                    let summaries = inspector.summarize(block, &data_dir);
                    print!("{}", inspector.render_text(&summaries));
                }
            }
            BlockOutcome::Skipped { block, missing } => {
                println!("{}: skipped (missing: {})", block, missing.join(", "));
                reporter.report_warning(
                    &format!("Block {} was skipped", block),
                    Some(format!("missing inputs: {}", missing.join(", "))),
                );
            }
        }
    }
    println!(
        "Pipeline finished: {} completed, {} skipped",
        completed,
        outcomes.len() - completed
    );
    Ok(())
}

pub fn inspect(args: InspectArgs, config: &HarnessConfig) -> Result<()> {
    let registry = BlockRegistry::from_config(config)?;
    let data_dir = ConfigLoader::resolve_data_dir(config, args.data_dir.as_deref());
    let block = registry.lookup(&args.block)?;

    let inspector = Inspector::new(config.inspect.clone());
    let outputs = inspector.summarize(block, &data_dir);
    match args.format {
        OutputFormat::Text => {
            println!("Block: {}", block.name);
            if outputs.is_empty() {
                println!("  (no declared outputs)");
            }
            print!("{}", inspector.render_text(&outputs));
        }
        OutputFormat::Json => {
            let payload = json!({
                "block": block.name,
                "data_dir": data_dir,
                "outputs": outputs,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

/// Report readiness without staging. Fails with `MissingInput` when any checked block
/// lacks an input; the error's subjects are every missing file across those blocks.
pub fn check(args: CheckArgs, config: &HarnessConfig) -> Result<()> {
    let registry = BlockRegistry::from_config(config)?;
    let manager = workspace_manager(config);
    let data_dir = ConfigLoader::resolve_data_dir(config, args.data_dir.as_deref());
    let workspace = manager.locate(&data_dir);

    let selection = if args.blocks.is_empty() {
        PipelineSelection::All
    } else {
        PipelineSelection::Only(args.blocks.clone())
    };
    let blocks = BlockRunner::new(&registry, &manager).select(&selection)?;

    let mut not_ready = Vec::new();
    let mut all_missing: Vec<String> = Vec::new();
    for block in blocks {
        let missing = missing_inputs(block, &workspace, &data_dir);
        if missing.is_empty() {
            println!("{}: ready", block.name);
            continue;
        }
        println!("{}: missing {}", block.name, missing.join(", "));
        for name in missing {
            if !all_missing.contains(&name) {
                all_missing.push(name);
            }
        }
        not_ready.push(block.name.clone());
    }

    if not_ready.is_empty() {
        return Ok(());
    }
    let mut error = AppError::new(
        ErrorCategory::MissingInput,
        format!("{} block(s) not ready: {}", not_ready.len(), not_ready.join(", ")),
    );
    error.subjects = all_missing;
    Err(error.into())
}

fn print_banner(name: &str, description: &str) {
    let title = if description.is_empty() {
        name.to_string()
    } else {
        format!("{}: {}", name, description)
    };
    println!("{}", "=".repeat(title.chars().count()));
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
}

fn print_run_summary(report: &BlockRunReport, data_dir: &str) {
    println!(
        "Completed {} in {} (run {})",
        report.execution.block,
        report.execution.elapsed_human(),
        report.execution.run_id
    );
    if report.sync.count() == 0 {
        println!("No outputs produced in the workspace");
    } else {
        println!(
            "Synced {} file(s) to {}: {}",
            report.sync.count(),
            data_dir,
            report.sync.synced.join(", ")
        );
    }
}

fn joined_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
