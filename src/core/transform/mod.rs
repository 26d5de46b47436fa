//! Transform capabilities: the per-block logic the executor runs against a staged workspace.
//!
//! A transform never discovers paths on its own. Everything it may touch is handed to it
//! through [`TransformContext`], so the same transform runs unchanged against a throwaway
//! staging tree or a full pipeline checkout.

pub mod builtin;
pub mod command;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use builtin::{BuiltinKind, BuiltinTransform};
pub use command::CommandTransform;

/// Paths and declarations injected into a transform for one block run.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub block: &'a str,
    pub inputs: &'a [String],
    pub outputs: &'a [String],
    pub workspace_root: &'a Path,
    pub input_dir: &'a Path,
    pub output_dir: &'a Path,
}

impl TransformContext<'_> {
    /// Staged location of a declared input.
    pub fn input_path(&self, name: &str) -> PathBuf {
        self.input_dir.join(name)
    }

    /// Staged location where a declared output must be written.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

/// A block's transformation routine.
///
/// Implementations read declared inputs from `ctx.input_dir`, write declared outputs to
/// `ctx.output_dir`, and report failure through the returned error instead of exiting.
pub trait Transform: Send + Sync + fmt::Debug {
    /// Short label used in logs.
    fn kind(&self) -> String;

    fn run(&self, ctx: &TransformContext<'_>) -> anyhow::Result<()>;
}

/// Transform declaration as written in `blockbench.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformSpec {
    /// External program run with the workspace root as working directory.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: BTreeMap<String, String>,
    },
    /// Transform compiled into the harness.
    Builtin { name: BuiltinKind },
}

impl TransformSpec {
    pub fn build(&self) -> Arc<dyn Transform> {
        match self {
            TransformSpec::Command { program, args, env } => Arc::new(CommandTransform::new(
                program.clone(),
                args.clone(),
                env.clone(),
            )),
            TransformSpec::Builtin { name } => Arc::new(BuiltinTransform::new(*name)),
        }
    }
}
