#![allow(clippy::result_large_err)]

use crate::core::config::WorkspaceConfig;
use crate::core::error::AppError;
use crate::utils::files;
use std::fs;
use std::path::{Path, PathBuf};

/// Shape of the staged tree, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub dir_name: String,
    pub input_subdir: PathBuf,
    pub output_subdir: PathBuf,
    pub extra_subdirs: Vec<PathBuf>,
    /// Lowercase extensions without the dot; empty means every file is staged.
    pub stage_extensions: Vec<String>,
}

impl WorkspaceLayout {
    /// Whether `setup` stages a data-directory file with this name.
    pub fn stages(&self, path: &Path) -> bool {
        if self.stage_extensions.is_empty() {
            return true;
        }
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.stage_extensions.contains(&ext))
    }
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        WorkspaceLayout::from(&WorkspaceConfig::default())
    }
}

impl From<&WorkspaceConfig> for WorkspaceLayout {
    fn from(config: &WorkspaceConfig) -> Self {
        WorkspaceLayout {
            dir_name: config.dir_name.clone(),
            input_subdir: config.input_subdir.clone(),
            output_subdir: config.output_subdir.clone(),
            extra_subdirs: config.extra_subdirs.clone(),
            stage_extensions: config
                .stage_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

/// Handle to a staged tree rooted inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    data_dir: PathBuf,
    root: PathBuf,
    input_dir: PathBuf,
    output_dir: PathBuf,
    extra_dirs: Vec<PathBuf>,
}

impl Workspace {
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Staged raw-export path transforms read inputs from.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Staged path transforms write outputs to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn extra_dirs(&self) -> &[PathBuf] {
        &self.extra_dirs
    }

    pub fn staged_input(&self, name: &str) -> PathBuf {
        self.input_dir.join(name)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}

pub struct WorkspaceManager {
    layout: WorkspaceLayout,
}

impl WorkspaceManager {
    pub fn new(layout: WorkspaceLayout) -> Self {
        WorkspaceManager { layout }
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Compute the workspace paths for `data_dir` without touching the filesystem.
    pub fn locate(&self, data_dir: &Path) -> Workspace {
        let root = data_dir.join(&self.layout.dir_name);
        Workspace {
            data_dir: data_dir.to_path_buf(),
            input_dir: root.join(&self.layout.input_subdir),
            output_dir: root.join(&self.layout.output_subdir),
            extra_dirs: self
                .layout
                .extra_subdirs
                .iter()
                .map(|sub| root.join(sub))
                .collect(),
            root,
        }
    }

    /// Create the staged tree under `data_dir` and stage every top-level file of `data_dir`
    /// with a staged extension that is not already staged. Idempotent; never deletes or
    /// overwrites staged files.
    pub fn setup(&self, data_dir: &Path) -> Result<Workspace, AppError> {
        let workspace = self.locate(data_dir);

        let dirs = [workspace.input_dir(), workspace.output_dir()]
            .into_iter()
            .chain(workspace.extra_dirs().iter().map(PathBuf::as_path));
        for dir in dirs {
            fs::create_dir_all(dir).map_err(|e| AppError::io("create directory", dir, e))?;
        }

        let mut staged = 0usize;
        for source in files::list_files(data_dir)? {
            if !self.layout.stages(&source) {
                continue;
            }
            let Some(name) = source.file_name() else {
                continue;
            };
            if stage_if_absent(&source, &workspace.input_dir().join(name))? {
                staged += 1;
            }
        }

        tracing::info!(
            workspace = %workspace.root().display(),
            staged,
            "workspace ready"
        );
        Ok(workspace)
    }

    /// Stage the named files from the data directory when they exist there but not in the
    /// staged input area. Covers declared inputs whose extension `setup` does not stage.
    pub fn stage_declared(
        &self,
        workspace: &Workspace,
        names: &[String],
    ) -> Result<usize, AppError> {
        let mut staged = 0usize;
        for name in names {
            let source = workspace.data_dir().join(name);
            if !source.is_file() {
                continue;
            }
            if stage_if_absent(&source, &workspace.staged_input(name))? {
                staged += 1;
            }
        }
        if staged > 0 {
            tracing::debug!(staged, "staged declared inputs");
        }
        Ok(staged)
    }
}

fn stage_if_absent(source: &Path, target: &Path) -> Result<bool, AppError> {
    if target.exists() {
        return Ok(false);
    }
    files::copy_file(source, target)?;
    Ok(true)
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self::new(WorkspaceLayout::default())
    }
}
