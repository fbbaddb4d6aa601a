// Delete markers
//
// A zero-length file named `<name><suffix>` on either side asks for `<name>`
// to be removed from both sides. Markers are consumed by the same pass, so
// they never outlive the merge that processed them.

use super::output::{Reporter, SyncEvent};
use super::scanner::Scanner;
use crate::error::{Result, SyncError};
use crate::path::{RelPath, Root, Side};
use std::collections::BTreeSet;
use std::ffi::OsString;

pub const DEFAULT_MARKER_SUFFIX: &str = ".dirmerge-delete";

/// What a deletion pass touched
#[derive(Debug, Default)]
pub struct DeletionReport {
    /// Targets named by at least one marker
    pub targets: BTreeSet<RelPath>,
    /// Files, directories and markers actually removed (or that would be, in dry-run)
    pub removed: usize,
}

pub struct DeletionPropagator<'a> {
    suffix: &'a str,
    dry_run: bool,
}

impl<'a> DeletionPropagator<'a> {
    pub fn new(suffix: &'a str, dry_run: bool) -> Self {
        Self { suffix, dry_run }
    }

    /// The path a marker asks to delete, or `None` if `rel` is not a marker
    pub fn marker_target(&self, rel: &RelPath) -> Option<RelPath> {
        let name = rel.file_name()?.to_str()?;
        let target = name.strip_suffix(self.suffix)?;
        if target.is_empty() {
            return None;
        }
        Some(rel.with_file_name(target))
    }

    pub fn marker_for(&self, target: &RelPath) -> RelPath {
        let mut name = target
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(OsString::new);
        name.push(self.suffix);
        target.with_file_name(name)
    }

    /// Whether `rel` was removed by this pass: a target, something inside a
    /// target directory, or a marker for a target
    pub fn covers(&self, report: &DeletionReport, rel: &RelPath) -> bool {
        if report.targets.iter().any(|t| rel.starts_with(t)) {
            return true;
        }
        self.marker_target(rel)
            .is_some_and(|t| report.targets.contains(&t))
    }

    /// Find markers under both roots and remove their targets and every
    /// marker copy from both roots. Missing paths are skipped.
    pub fn run(&self, a: &Root, b: &Root, reporter: &mut dyn Reporter) -> Result<DeletionReport> {
        let mut report = DeletionReport::default();

        for root in [a, b] {
            for entry in Scanner::new(root).scan()? {
                if entry.is_dir {
                    continue;
                }
                if let Some(target) = self.marker_target(&entry.relative_path) {
                    tracing::debug!("Delete marker found: {} in {}", entry.relative_path, root);
                    report.targets.insert(target);
                }
            }
        }

        for target in &report.targets {
            let marker = self.marker_for(target);
            for (side, root) in [(Side::A, a), (Side::B, b)] {
                for rel in [target, &marker] {
                    if self.remove(root, rel)? {
                        reporter.report(&SyncEvent::Delete {
                            path: rel.clone(),
                            side,
                        });
                        report.removed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    fn remove(&self, root: &Root, rel: &RelPath) -> Result<bool> {
        let path = root.resolve(rel);
        let remove_err = |e| SyncError::Remove {
            path: path.clone(),
            source: e,
        };

        let meta = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(remove_err(e)),
        };

        if self.dry_run {
            tracing::info!("Would delete: {}", path.display());
            return Ok(true);
        }

        let result = if meta.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };

        match result {
            Ok(()) => {
                tracing::debug!("Deleted: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(remove_err(e)),
        }
    }
}
