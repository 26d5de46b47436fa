#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What a file looked like at one point in time, enough to tell whether it was rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Regular files directly inside `dir`, sorted by name. A missing directory has no files.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AppError::io("scan directory", dir, e))? {
        let entry = entry.map_err(|e| AppError::io("scan directory", dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| AppError::io("read metadata of", &entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Stamp of every regular file directly inside `dir`, keyed by file name.
pub fn stamps(dir: &Path) -> Result<BTreeMap<String, FileStamp>, AppError> {
    let mut stamps = BTreeMap::new();
    for path in list_files(dir)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        let metadata = fs::metadata(&path).map_err(|e| AppError::io("read metadata of", &path, e))?;
        stamps.insert(
            name.to_string_lossy().to_string(),
            FileStamp {
                modified: metadata.modified().ok(),
                len: metadata.len(),
            },
        );
    }
    Ok(stamps)
}

/// Byte-for-byte copy, replacing `to` if it exists.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64, AppError> {
    fs::copy(from, to).map_err(|e| {
        let mut error = AppError::io("copy", from, e);
        error.add_context("destination", &to.display().to_string());
        error
    })
}
