use crate::fs_util::Timestamps;
use crate::path::{RelPath, Side};
use serde::Serialize;
use std::path::PathBuf;

/// Structured events produced during a merge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    Start {
        a: PathBuf,
        b: PathBuf,
        dry_run: bool,
    },
    /// A file or marker was removed while propagating a delete marker
    Delete {
        path: RelPath,
        side: Side,
    },
    /// A file was copied from one side to the other
    Copy {
        path: RelPath,
        from: Side,
        to: Side,
        size: u64,
    },
    /// Both sides hold byte-identical content
    InSync {
        path: RelPath,
    },
    /// Differing content; the side with the later modification time won
    Resolved {
        path: RelPath,
        winner: Side,
    },
    /// Differing content with identical modification times; nothing was changed
    Ambiguous {
        path: RelPath,
        modified_ms: i64,
    },
    /// A directory on one side and a file on the other; nothing was changed
    TypeMismatch {
        path: RelPath,
        dir_side: Side,
    },
    /// Content was copied but its timestamps could not be applied
    TimestampError {
        path: PathBuf,
        error: String,
        times: Timestamps,
    },
    Summary {
        scanned_a: usize,
        scanned_b: usize,
        copied_a_to_b: usize,
        copied_b_to_a: usize,
        in_sync: usize,
        resolved: usize,
        ambiguous: usize,
        type_mismatches: usize,
        deleted: usize,
        timestamp_errors: usize,
        bytes_copied: u64,
        duration_secs: f64,
    },
}

/// Receives merge events as they happen
pub trait Reporter {
    fn report(&mut self, event: &SyncEvent);
}

/// Writes events to the tracing log
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Start { a, b, .. } => {
                tracing::debug!("Merging {} <-> {}", a.display(), b.display());
            }
            SyncEvent::Delete { path, side } => {
                tracing::info!("Deleted {} from {}", path, side);
            }
            SyncEvent::Copy { path, from, to, .. } => {
                tracing::info!("Copied {} ({} -> {})", path, from, to);
            }
            SyncEvent::InSync { path } => {
                tracing::debug!("Contents match: {}", path);
            }
            SyncEvent::Resolved { path, winner } => {
                tracing::info!("Conflict on {}: newer copy in {} wins", path, winner);
            }
            SyncEvent::Ambiguous { path, modified_ms } => {
                tracing::warn!(
                    "Conflict on {} left unresolved: contents differ but both modified at {} ms",
                    path,
                    modified_ms
                );
            }
            SyncEvent::TypeMismatch { path, dir_side } => {
                tracing::warn!(
                    "Skipping {}: directory in {}, file in {}",
                    path,
                    dir_side,
                    dir_side.other()
                );
            }
            SyncEvent::TimestampError { path, error, times } => {
                tracing::error!(
                    "Failed to set timestamps on {}: {} (mtime={} atime={} btime={:?})",
                    path.display(),
                    error,
                    times.modified_ms,
                    times.accessed_ms,
                    times.created_ms
                );
            }
            SyncEvent::Summary {
                copied_a_to_b,
                copied_b_to_a,
                ambiguous,
                ..
            } => {
                tracing::info!(
                    "Merge complete: {} copied a -> b, {} copied b -> a, {} unresolved",
                    copied_a_to_b,
                    copied_b_to_a,
                    ambiguous
                );
            }
        }
    }
}

/// Emits events as NDJSON on stdout
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&mut self, event: &SyncEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{}", json);
        }
    }
}

/// Collects events in memory
impl Reporter for Vec<SyncEvent> {
    fn report(&mut self, event: &SyncEvent) {
        self.push(event.clone());
    }
}
