use super::{Transform, TransformContext};
use std::collections::BTreeMap;
use std::path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}")]
    Exit { program: String, status: String },
}

/// Runs an external program as a block's transform.
///
/// Staged paths reach the program twice: through `{input_dir}`, `{output_dir}`, `{workspace}`
/// and `{block}` placeholders in its arguments, and through `BLOCKBENCH_*` environment
/// variables. The program's stdout and stderr go straight to the operator's terminal.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl CommandTransform {
    pub fn new(program: String, args: Vec<String>, env: BTreeMap<String, String>) -> Self {
        Self { program, args, env }
    }

    /// Arguments with placeholders replaced by the staged paths of `ctx`.
    pub fn resolved_args(&self, ctx: &TransformContext<'_>) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| substitute(arg, ctx))
            .collect()
    }

    fn injected_env(ctx: &TransformContext<'_>) -> Vec<(&'static str, String)> {
        vec![
            ("BLOCKBENCH_BLOCK", ctx.block.to_string()),
            ("BLOCKBENCH_WORKSPACE", ctx.workspace_root.display().to_string()),
            ("BLOCKBENCH_INPUT_DIR", ctx.input_dir.display().to_string()),
            ("BLOCKBENCH_OUTPUT_DIR", ctx.output_dir.display().to_string()),
            ("BLOCKBENCH_INPUTS", ctx.inputs.join(",")),
            ("BLOCKBENCH_OUTPUTS", ctx.outputs.join(",")),
        ]
    }
}

impl Transform for CommandTransform {
    fn kind(&self) -> String {
        format!("command:{}", self.program)
    }

    fn run(&self, ctx: &TransformContext<'_>) -> anyhow::Result<()> {
        // The child runs from the workspace root, so relative staged paths would no longer
        // point where the harness staged them.
        let workspace_root = path::absolute(ctx.workspace_root)?;
        let input_dir = path::absolute(ctx.input_dir)?;
        let output_dir = path::absolute(ctx.output_dir)?;
        let ctx = &TransformContext {
            workspace_root: &workspace_root,
            input_dir: &input_dir,
            output_dir: &output_dir,
            ..*ctx
        };

        let args = self.resolved_args(ctx);
        tracing::debug!(
            program = %self.program,
            args = ?args,
            cwd = %ctx.workspace_root.display(),
            "spawning transform command"
        );

        let start = Instant::now();
        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(ctx.workspace_root)
            .envs(Self::injected_env(ctx))
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        tracing::debug!(
            program = %self.program,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "transform command exited"
        );

        if !status.success() {
            return Err(CommandError::Exit {
                program: self.program.clone(),
                status: status.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn substitute(arg: &str, ctx: &TransformContext<'_>) -> String {
    arg.replace("{input_dir}", &ctx.input_dir.display().to_string())
        .replace("{output_dir}", &ctx.output_dir.display().to_string())
        .replace("{workspace}", &ctx.workspace_root.display().to_string())
        .replace("{block}", ctx.block)
}
