pub mod classify;
pub mod hash;
pub mod markers;
pub mod output;
pub mod resolver;
pub mod scanner;
pub mod transfer;

use crate::error::Result;
use crate::path::{RelPath, Root, Side};
use classify::classify;
use markers::DeletionPropagator;
use output::{Reporter, SyncEvent};
use resolver::{resolve, Resolution};
use scanner::{FileEntry, Scanner};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use transfer::{TransferStats, Transferrer};

#[derive(Debug, Default, Clone)]
pub struct MergeStats {
    pub scanned_a: usize,
    pub scanned_b: usize,
    pub copied_a_to_b: usize,
    pub copied_b_to_a: usize,
    pub bytes_copied: u64,
    pub in_sync: usize,
    pub resolved: usize,
    pub ambiguous: usize,
    pub type_mismatches: usize,
    pub deleted: usize,
    pub timestamp_errors: usize,
    pub duration: Duration,
}

impl MergeStats {
    /// True when the run changed nothing on disk (or would change nothing, in dry-run)
    pub fn is_noop(&self) -> bool {
        self.copied_a_to_b == 0 && self.copied_b_to_a == 0 && self.deleted == 0
    }

    fn summary_event(&self) -> SyncEvent {
        SyncEvent::Summary {
            scanned_a: self.scanned_a,
            scanned_b: self.scanned_b,
            copied_a_to_b: self.copied_a_to_b,
            copied_b_to_a: self.copied_b_to_a,
            in_sync: self.in_sync,
            resolved: self.resolved,
            ambiguous: self.ambiguous,
            type_mismatches: self.type_mismatches,
            deleted: self.deleted,
            timestamp_errors: self.timestamp_errors,
            bytes_copied: self.bytes_copied,
            duration_secs: self.duration.as_secs_f64(),
        }
    }
}

/// Two-way merge of a pair of directory trees
pub struct MergeEngine {
    dry_run: bool,
    marker_suffix: String,
}

impl MergeEngine {
    pub fn new(dry_run: bool, marker_suffix: impl Into<String>) -> Self {
        Self {
            dry_run,
            marker_suffix: marker_suffix.into(),
        }
    }

    /// Merge `a` and `b` so both end up with the same files.
    ///
    /// Order: delete markers, scan, copy one-sided entries both ways, then
    /// resolve paths present on both sides. The first fatal error stops the
    /// run; files already copied stay copied.
    pub fn merge(&self, a: &Path, b: &Path, reporter: &mut dyn Reporter) -> Result<MergeStats> {
        let start = Instant::now();
        let root_a = Root::open(a)?;
        let root_b = Root::open(b)?;

        tracing::info!("Starting merge: {} <-> {}", root_a, root_b);
        reporter.report(&SyncEvent::Start {
            a: root_a.path().to_path_buf(),
            b: root_b.path().to_path_buf(),
            dry_run: self.dry_run,
        });

        let propagator = DeletionPropagator::new(&self.marker_suffix, self.dry_run);
        let deletions = propagator.run(&root_a, &root_b, reporter)?;

        let mut entries_a = Scanner::new(&root_a).scan()?;
        let mut entries_b = Scanner::new(&root_b).scan()?;
        if !deletions.targets.is_empty() {
            // Only non-empty in dry-run; a real pass already removed them
            entries_a.retain(|e| !propagator.covers(&deletions, &e.relative_path));
            entries_b.retain(|e| !propagator.covers(&deletions, &e.relative_path));
        }
        tracing::info!(
            "Found {} items in a, {} items in b",
            entries_a.len(),
            entries_b.len()
        );

        let by_path_a = index(&entries_a);
        let by_path_b = index(&entries_b);

        let mut classification = classify(&entries_a, &entries_b);
        tracing::debug!(
            "{} only in a, {} only in b, {} in both",
            classification.only_a.len(),
            classification.only_b.len(),
            classification.conflicts.len()
        );

        // Contents of a directory facing a file on the other side stay put;
        // copying them would need the file to become a directory
        let mismatched: Vec<&RelPath> = classification
            .conflicts
            .iter()
            .filter(|path| match (by_path_a.get(*path), by_path_b.get(*path)) {
                (Some(ea), Some(eb)) => ea.is_dir != eb.is_dir,
                _ => false,
            })
            .collect();
        if !mismatched.is_empty() {
            let under_mismatch =
                |e: &FileEntry| mismatched.iter().any(|m| e.relative_path.starts_with(m));
            classification.only_a.retain(|e| !under_mismatch(e));
            classification.only_b.retain(|e| !under_mismatch(e));
        }

        let transferrer = Transferrer::new(self.dry_run);
        let mut a_to_b =
            transferrer.copy_all(&classification.only_a, Side::A, &root_b, reporter)?;
        let mut b_to_a =
            transferrer.copy_all(&classification.only_b, Side::B, &root_a, reporter)?;

        let mut stats = MergeStats {
            scanned_a: entries_a.len(),
            scanned_b: entries_b.len(),
            deleted: deletions.removed,
            ..Default::default()
        };

        for path in &classification.conflicts {
            let (Some(&ea), Some(&eb)) = (by_path_a.get(path), by_path_b.get(path)) else {
                continue;
            };

            match resolve(ea, eb)? {
                Resolution::BothDirectories => {}
                Resolution::TypeMismatch { dir_side } => {
                    stats.type_mismatches += 1;
                    reporter.report(&SyncEvent::TypeMismatch {
                        path: path.clone(),
                        dir_side,
                    });
                }
                Resolution::InSync => {
                    stats.in_sync += 1;
                    reporter.report(&SyncEvent::InSync { path: path.clone() });
                }
                Resolution::Ambiguous => {
                    stats.ambiguous += 1;
                    reporter.report(&SyncEvent::Ambiguous {
                        path: path.clone(),
                        modified_ms: ea.times.modified_ms,
                    });
                }
                Resolution::Copy { from } => {
                    stats.resolved += 1;
                    reporter.report(&SyncEvent::Resolved {
                        path: path.clone(),
                        winner: from,
                    });
                    let (entry, dest_root, direction): (_, _, &mut TransferStats) = match from {
                        Side::A => (ea, &root_b, &mut a_to_b),
                        Side::B => (eb, &root_a, &mut b_to_a),
                    };
                    direction.record(transferrer.copy_file(entry, from, dest_root, reporter)?);
                }
            }
        }

        stats.copied_a_to_b = a_to_b.files;
        stats.copied_b_to_a = b_to_a.files;
        stats.bytes_copied = a_to_b.bytes + b_to_a.bytes;
        stats.timestamp_errors = a_to_b.timestamp_errors + b_to_a.timestamp_errors;
        stats.duration = start.elapsed();

        tracing::info!(
            "Merge complete: {} copied a -> b, {} copied b -> a, {} in sync, {} unresolved",
            stats.copied_a_to_b,
            stats.copied_b_to_a,
            stats.in_sync,
            stats.ambiguous
        );
        reporter.report(&stats.summary_event());

        Ok(stats)
    }
}

fn index(entries: &[FileEntry]) -> HashMap<&RelPath, &FileEntry> {
    entries.iter().map(|e| (&e.relative_path, e)).collect()
}
