use crate::error::{Result, SyncError};
use crate::fs_util::Timestamps;
use crate::path::{RelPath, Root};
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub relative_path: RelPath,
    pub size: u64,
    pub times: Timestamps,
    pub is_dir: bool,
}

pub struct Scanner<'a> {
    root: &'a Root,
}

impl<'a> Scanner<'a> {
    pub fn new(root: &'a Root) -> Self {
        Self { root }
    }

    /// Every entry below the root (files and directories, hidden included),
    /// excluding the root itself
    pub fn scan(&self) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(self.root.path())
            .min_depth(1)
            .sort_by_file_name();

        for result in walker {
            let entry = result.map_err(|e| {
                let path = e
                    .path()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| self.root.path().to_path_buf());
                SyncError::ReadDir {
                    path,
                    source: e.into(),
                }
            })?;

            let path = entry.path().to_path_buf();
            let metadata = std::fs::metadata(&path).map_err(|e| SyncError::ReadDir {
                path: path.clone(),
                source: e,
            })?;
            let times = Timestamps::from_metadata(&metadata).map_err(|e| SyncError::ReadDir {
                path: path.clone(),
                source: e,
            })?;

            entries.push(FileEntry {
                relative_path: self.root.relativize(&path)?,
                path,
                size: metadata.len(),
                times,
                is_dir: metadata.is_dir(),
            });
        }

        tracing::debug!("Scanned {} entries under {}", entries.len(), self.root);
        Ok(entries)
    }
}
