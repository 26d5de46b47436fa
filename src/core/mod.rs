pub mod config;
pub mod dependency;
pub mod error;
pub mod executor;
pub mod inspector;
pub mod orchestrator;
pub mod registry;
pub mod sync;
pub mod transform;
pub mod types;
pub mod workspace;

pub use config::{ConfigLoader, ConfigValidator, HarnessConfig};
pub use dependency::{missing_inputs, resolve_input};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter};
pub use executor::{BlockExecutor, ExecutionReport};
pub use inspector::{Inspector, OutputSummary, TableSummary};
pub use orchestrator::{BlockOutcome, BlockRunReport, BlockRunner, PipelineSelection};
pub use registry::{BlockDescriptor, BlockRegistry};
pub use sync::{missing_outputs, sync_back, SyncReport};
pub use transform::{Transform, TransformContext, TransformSpec};
pub use types::*;
pub use workspace::{Workspace, WorkspaceLayout, WorkspaceManager};
