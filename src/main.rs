use blockbench::cli::{self, Args};
use blockbench::core::{
    AppError, ConfigLoader, ConfigValidator, DefaultErrorReporter, ErrorReporter,
    WorkspaceLayout, WorkspaceManager,
};
use blockbench::logging::{self, LoggingConfig, LoggingGuard};
use std::process::ExitCode;

const USAGE_EXIT_CODE: u8 = 2;

fn main() -> ExitCode {
    let args = cli::parse();
    if !args.list && args.command.is_none() {
        let mut command = cli::command();
        eprintln!("error: nothing to do; pass --list or a command such as `run <BLOCK>`\n");
        eprintln!("{}", command.render_usage());
        eprintln!("\nFor more information, try '--help'.");
        return ExitCode::from(USAGE_EXIT_CODE);
    }

    let mut logging_guard = None;
    match execute(args, &mut logging_guard) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error = match err.downcast::<AppError>() {
                Ok(app_error) => app_error,
                Err(other) => AppError::from(other),
            };
            tracing::error!(code = %error.code, category = %error.category, "{}", error.message);
            DefaultErrorReporter::new().report_error(&error);
            ExitCode::from(error.exit_code())
        }
    }
}

fn execute(args: Args, logging_guard: &mut Option<LoggingGuard>) -> blockbench::Result<()> {
    let config = ConfigLoader::load(args.config.as_deref())?;
    ConfigValidator::validate(&config)?;

    let data_dir = ConfigLoader::resolve_data_dir(&config, args.data_dir_override());
    let default_log_dir = WorkspaceManager::new(WorkspaceLayout::from(&config.workspace))
        .locate(&data_dir)
        .log_dir();
    let logging_config = LoggingConfig::from_section(&config.logging)?;
    *logging_guard = Some(logging::init(
        logging::detect_context(&args),
        &logging_config,
        &default_log_dir,
    )?);

    tracing::debug!(data_dir = %data_dir.display(), "configuration loaded");
    cli::run(args, &config)
}
