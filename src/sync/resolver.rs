// Conflict resolution for paths present under both roots
//
// Identical content is left alone. Otherwise the later modification time
// wins; equal times with differing content are reported and left as is.

use super::hash::ContentHash;
use super::scanner::FileEntry;
use crate::error::Result;
use crate::path::Side;
use std::cmp::Ordering;

/// Decision for one conflicting path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Directories merge through the files they contain
    BothDirectories,
    /// A directory on `dir_side`, a file on the other
    TypeMismatch { dir_side: Side },
    /// Byte-identical content
    InSync,
    /// Copy the winning side over the other
    Copy { from: Side },
    /// Contents differ but modification times are equal
    Ambiguous,
}

/// Decide what to do with a path that exists under both roots.
///
/// Hashes are only computed for file/file pairs.
pub fn resolve(a: &FileEntry, b: &FileEntry) -> Result<Resolution> {
    match (a.is_dir, b.is_dir) {
        (true, true) => return Ok(Resolution::BothDirectories),
        (true, false) => return Ok(Resolution::TypeMismatch { dir_side: Side::A }),
        (false, true) => return Ok(Resolution::TypeMismatch { dir_side: Side::B }),
        (false, false) => {}
    }

    let hash_a = ContentHash::from_file(&a.path)?;
    let hash_b = ContentHash::from_file(&b.path)?;
    tracing::trace!("{}: a={} b={}", a.relative_path, hash_a, hash_b);
    if hash_a == hash_b {
        return Ok(Resolution::InSync);
    }

    Ok(match a.times.modified_ms.cmp(&b.times.modified_ms) {
        Ordering::Greater => Resolution::Copy { from: Side::A },
        Ordering::Less => Resolution::Copy { from: Side::B },
        Ordering::Equal => Resolution::Ambiguous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_util::Timestamps;
    use crate::path::RelPath;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn entry(path: &Path, rel: &str, modified_ms: i64) -> FileEntry {
        FileEntry {
            path: path.to_path_buf(),
            relative_path: RelPath::parse(rel),
            size: 0,
            times: Timestamps {
                modified_ms,
                accessed_ms: modified_ms,
                created_ms: None,
            },
            is_dir: path.is_dir(),
        }
    }

    fn pair(content_a: &str, content_b: &str) -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, content_a).unwrap();
        fs::write(&b, content_b).unwrap();
        (temp, a, b)
    }

    #[test]
    fn test_identical_content_is_in_sync() {
        let (_temp, a, b) = pair("same", "same");
        let r = resolve(&entry(&a, "/f", 1000), &entry(&b, "/f", 5000)).unwrap();
        assert_eq!(r, Resolution::InSync);
    }

    #[test]
    fn test_newer_a_wins() {
        let (_temp, a, b) = pair("hello", "world");
        let r = resolve(&entry(&a, "/f", 5000), &entry(&b, "/f", 1000)).unwrap();
        assert_eq!(r, Resolution::Copy { from: Side::A });
    }

    #[test]
    fn test_newer_b_wins() {
        let (_temp, a, b) = pair("hello", "world");
        let r = resolve(&entry(&a, "/f", 1000), &entry(&b, "/f", 5000)).unwrap();
        assert_eq!(r, Resolution::Copy { from: Side::B });
    }

    #[test]
    fn test_equal_mtime_different_content_is_ambiguous() {
        let (_temp, a, b) = pair("hello", "world");
        let r = resolve(&entry(&a, "/f", 3000), &entry(&b, "/f", 3000)).unwrap();
        assert_eq!(r, Resolution::Ambiguous);
    }

    #[test]
    fn test_both_directories_skip() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();
        let r = resolve(&entry(&a, "/d", 0), &entry(&b, "/d", 0)).unwrap();
        assert_eq!(r, Resolution::BothDirectories);
    }

    #[test]
    fn test_dir_vs_file_is_type_mismatch() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::write(&a, "file").unwrap();
        fs::create_dir(&b).unwrap();
        let r = resolve(&entry(&a, "/x", 0), &entry(&b, "/x", 0)).unwrap();
        assert_eq!(r, Resolution::TypeMismatch { dir_side: Side::B });
    }

    #[test]
    fn test_unreadable_file_propagates() {
        let (_temp, a, b) = pair("hello", "world");
        fs::remove_file(&b).unwrap();
        let mut missing = entry(&b, "/f", 0);
        missing.is_dir = false;
        assert!(resolve(&entry(&a, "/f", 0), &missing).is_err());
    }
}
