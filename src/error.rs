use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Directory not found: {path}\nMake sure the path exists and you have read permissions.")]
    RootNotFound { path: PathBuf },

    #[error("Not a directory: {path}\nBoth sides of a merge must be directories.")]
    NotADirectory { path: PathBuf },

    #[error("Failed to read directory: {path}\nCause: {source}\nCheck that the directory exists and you have read permissions.")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read file: {path}\nCause: {source}\nThe file may have been removed or its permissions changed during the merge.")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to copy file: {path}\nCause: {source}\nCheck disk space and write permissions on the destination.")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove: {path}\nCause: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to set timestamps on {path}: {source}")]
    TimestampApply {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid path: {path}\nThe entry does not live under the directory being scanned.")]
    InvalidPath { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Format bytes for human-readable display
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
