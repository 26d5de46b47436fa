use crate::core::types::ErrorCategory;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    pub context: BTreeMap<String, String>,
    /// Block names or filenames the error is about, in reporting order.
    pub subjects: Vec<String>,
    pub recovery_suggestions: Vec<String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let code = match category {
            ErrorCategory::NotFound => "BLK-404",
            ErrorCategory::MissingInput => "BLK-IN",
            ErrorCategory::MissingOutput => "BLK-OUT",
            ErrorCategory::IoError => "IO_ERROR",
            ErrorCategory::ExecutionError => "BLK-EXEC",
            ErrorCategory::ValidationError => "CFG-INVALID",
            ErrorCategory::InternalError => "INTERNAL",
        };
        AppError {
            category,
            code: code.to_string(),
            message: message.into(),
            context: BTreeMap::new(),
            subjects: vec![],
            recovery_suggestions: vec![],
            occurred_at: Utc::now(),
            source: None,
        }
    }

    /// The requested block is not registered; `available` lists every valid name.
    pub fn block_not_found(name: &str, available: Vec<String>) -> Self {
        let mut error = AppError::new(
            ErrorCategory::NotFound,
            format!("Unknown block: {}", name),
        );
        error.add_context("block", name);
        error.subjects = available;
        error.recovery_suggestions =
            vec!["Use --list to see the registered blocks".to_string()];
        error
    }

    pub fn missing_inputs(block: &str, missing: Vec<String>) -> Self {
        let mut error = AppError::new(
            ErrorCategory::MissingInput,
            format!("Cannot run {}: missing inputs: {}", block, missing.join(", ")),
        );
        error.add_context("block", block);
        error.subjects = missing;
        error.recovery_suggestions = vec![
            "Run the upstream blocks first".to_string(),
            "Or place the missing files in the data directory".to_string(),
        ];
        error
    }

    pub fn missing_outputs(block: &str, missing: Vec<String>) -> Self {
        let mut error = AppError::new(
            ErrorCategory::MissingOutput,
            format!(
                "{} finished but did not produce: {}",
                block,
                missing.join(", ")
            ),
        );
        error.add_context("block", block);
        error.subjects = missing;
        error
    }

    pub fn io(action: &str, path: &Path, err: std::io::Error) -> Self {
        let mut error = AppError::new(
            ErrorCategory::IoError,
            format!("Failed to {} {}: {}", action, path.display(), err),
        );
        error.add_context("path", &path.display().to_string());
        error.subjects = vec![path.display().to_string()];
        error.recovery_suggestions = vec!["Check file permissions and free disk space".to_string()];
        error.source = Some(anyhow::Error::new(err));
        error
    }

    /// Wraps a transform failure, keeping the original cause as the error source.
    pub fn execution(block: &str, cause: anyhow::Error) -> Self {
        let mut error = AppError::new(
            ErrorCategory::ExecutionError,
            format!("Block {} failed", block),
        );
        error.add_context("block", block);
        error.source = Some(cause);
        error
    }

    pub fn validation<T: Into<String>>(message: T) -> Self {
        AppError::new(ErrorCategory::ValidationError, message)
    }

    pub fn with_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }

    pub fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {:#}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|err| {
            let inner: &(dyn std::error::Error + Send + Sync + 'static) = err.as_ref();
            inner as &(dyn std::error::Error + 'static)
        })
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        let mut error = AppError::new(ErrorCategory::InternalError, e.to_string());
        error.code = "ANYHOW_ERROR".to_string();
        error.source = Some(e);
        error
    }
}

pub trait ErrorReporter {
    fn report_error(&self, error: &AppError);
    fn report_warning(&self, message: &str, context: Option<String>);
}

pub struct DefaultErrorReporter;

impl DefaultErrorReporter {
    pub fn new() -> Self {
        DefaultErrorReporter
    }
}

impl Default for DefaultErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for DefaultErrorReporter {
    fn report_error(&self, error: &AppError) {
        eprintln!("[ERROR] {}: {}", error.code, error.message);
        match error.category {
            ErrorCategory::NotFound => {
                if error.subjects.is_empty() {
                    eprintln!("  No blocks are registered");
                } else {
                    eprintln!("  Available blocks: {}", error.subjects.join(", "));
                }
            }
            ErrorCategory::MissingInput => {
                for name in &error.subjects {
                    eprintln!("  missing: {}", name);
                }
            }
            ErrorCategory::MissingOutput => {
                for name in &error.subjects {
                    eprintln!("  not produced: {}", name);
                }
            }
            _ => {}
        }
        if let Some(ref source) = error.source {
            eprintln!("  Caused by: {:#}", source);
        }
        for suggestion in &error.recovery_suggestions {
            eprintln!("  hint: {}", suggestion);
        }
    }

    fn report_warning(&self, message: &str, context: Option<String>) {
        eprintln!("[WARNING] {}", message);
        if let Some(ref ctx) = context {
            eprintln!("  Context: {}", ctx);
        }
    }
}
