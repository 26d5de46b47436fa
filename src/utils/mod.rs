//! Utility helpers: flat-directory file operations shared by staging, sync, and inspection.
pub mod files;

pub use files::{copy_file, list_files, stamps, FileStamp};
