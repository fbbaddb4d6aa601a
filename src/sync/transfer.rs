use super::output::{Reporter, SyncEvent};
use super::scanner::FileEntry;
use crate::error::{Result, SyncError};
use crate::fs_util::{apply_timestamps, Timestamps};
use crate::path::{Root, Side};
use std::path::Path;

/// Writes carried-over timestamps onto a freshly copied file
pub type ApplyTimestamps = fn(&Path, &Timestamps) -> std::io::Result<()>;

/// Result of copying a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Directories are never copied on their own
    Skipped,
    Copied { bytes: u64, timestamps_applied: bool },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferStats {
    pub files: usize,
    pub bytes: u64,
    pub timestamp_errors: usize,
}

impl TransferStats {
    pub fn record(&mut self, outcome: CopyOutcome) {
        if let CopyOutcome::Copied {
            bytes,
            timestamps_applied,
        } = outcome
        {
            self.files += 1;
            self.bytes += bytes;
            if !timestamps_applied {
                self.timestamp_errors += 1;
            }
        }
    }
}

/// Copies files between the two roots, carrying their timestamps along
pub struct Transferrer {
    dry_run: bool,
    apply_times: ApplyTimestamps,
}

impl Transferrer {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            apply_times: apply_timestamps,
        }
    }

    #[cfg(test)]
    pub fn with_timestamp_applier(mut self, apply: ApplyTimestamps) -> Self {
        self.apply_times = apply;
        self
    }

    /// Copy every non-directory entry from side `from` into `dest_root`
    pub fn copy_all(
        &self,
        entries: &[FileEntry],
        from: Side,
        dest_root: &Root,
        reporter: &mut dyn Reporter,
    ) -> Result<TransferStats> {
        let mut stats = TransferStats::default();
        for entry in entries {
            stats.record(self.copy_file(entry, from, dest_root, reporter)?);
        }
        Ok(stats)
    }

    /// Copy one entry to the same relative location under `dest_root`.
    ///
    /// Missing parent directories are created. A failure to apply timestamps
    /// is reported and otherwise ignored; the copied content is kept.
    pub fn copy_file(
        &self,
        entry: &FileEntry,
        from: Side,
        dest_root: &Root,
        reporter: &mut dyn Reporter,
    ) -> Result<CopyOutcome> {
        if entry.is_dir {
            return Ok(CopyOutcome::Skipped);
        }

        let dest_path = dest_root.resolve(&entry.relative_path);
        let copy_event = SyncEvent::Copy {
            path: entry.relative_path.clone(),
            from,
            to: from.other(),
            size: entry.size,
        };

        if self.dry_run {
            tracing::info!("Would copy: {} -> {}", entry.path.display(), dest_path.display());
            reporter.report(&copy_event);
            return Ok(CopyOutcome::Copied {
                bytes: entry.size,
                timestamps_applied: true,
            });
        }

        // Read before copying so the copy itself does not bump the source atime we carry over
        let times = Timestamps::read(&entry.path).map_err(|e| SyncError::Read {
            path: entry.path.clone(),
            source: e,
        })?;

        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::Copy {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let bytes = std::fs::copy(&entry.path, &dest_path).map_err(|e| SyncError::Copy {
            path: entry.path.clone(),
            source: e,
        })?;
        tracing::debug!("Copied: {} -> {}", entry.path.display(), dest_path.display());
        reporter.report(&copy_event);

        let timestamps_applied = match (self.apply_times)(&dest_path, &times) {
            Ok(()) => true,
            Err(e) => {
                let err = SyncError::TimestampApply {
                    path: dest_path.clone(),
                    source: e,
                };
                reporter.report(&SyncEvent::TimestampError {
                    path: dest_path,
                    error: err.to_string(),
                    times,
                });
                false
            }
        };

        Ok(CopyOutcome::Copied {
            bytes,
            timestamps_applied,
        })
    }
}
