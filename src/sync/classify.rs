// Partition two scans into one-sided entries and conflicts
//
// A conflict is any relative path present under both roots, whatever its
// type. Directories count toward presence; the resolver decides what to do
// with them.

use super::scanner::FileEntry;
use crate::path::RelPath;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Default)]
pub struct Classification {
    /// Paths present under both roots, ordered and deduplicated
    pub conflicts: BTreeSet<RelPath>,
    /// Entries found only under root A
    pub only_a: Vec<FileEntry>,
    /// Entries found only under root B
    pub only_b: Vec<FileEntry>,
}

pub fn classify(a: &[FileEntry], b: &[FileEntry]) -> Classification {
    let a_paths: HashSet<&RelPath> = a.iter().map(|e| &e.relative_path).collect();
    let b_paths: HashSet<&RelPath> = b.iter().map(|e| &e.relative_path).collect();

    let conflicts: BTreeSet<RelPath> = a_paths
        .intersection(&b_paths)
        .map(|p| (*p).clone())
        .collect();

    let only_a = a
        .iter()
        .filter(|e| !conflicts.contains(&e.relative_path))
        .cloned()
        .collect();
    let only_b = b
        .iter()
        .filter(|e| !conflicts.contains(&e.relative_path))
        .cloned()
        .collect();

    Classification {
        conflicts,
        only_a,
        only_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_util::Timestamps;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn entry(rel: &str, is_dir: bool) -> FileEntry {
        let relative_path = RelPath::parse(rel);
        FileEntry {
            path: PathBuf::from("/root").join(relative_path.as_path()),
            relative_path,
            size: 0,
            times: Timestamps {
                modified_ms: 0,
                accessed_ms: 0,
                created_ms: None,
            },
            is_dir,
        }
    }

    #[test]
    fn test_classify_basic() {
        let a = vec![entry("/shared.txt", false), entry("/only-a.txt", false)];
        let b = vec![entry("/shared.txt", false), entry("/only-b.txt", false)];

        let result = classify(&a, &b);

        assert_eq!(result.conflicts.len(), 1);
        assert!(result.conflicts.contains(&RelPath::parse("/shared.txt")));
        assert_eq!(result.only_a.len(), 1);
        assert_eq!(result.only_a[0].relative_path, RelPath::parse("/only-a.txt"));
        assert_eq!(result.only_b.len(), 1);
        assert_eq!(result.only_b[0].relative_path, RelPath::parse("/only-b.txt"));
    }

    #[test]
    fn test_directories_count_as_present() {
        let a = vec![entry("/docs", true), entry("/docs/a.txt", false)];
        let b = vec![entry("/docs", true)];

        let result = classify(&a, &b);

        assert!(result.conflicts.contains(&RelPath::parse("/docs")));
        assert_eq!(result.only_a.len(), 1);
        assert_eq!(result.only_a[0].relative_path, RelPath::parse("/docs/a.txt"));
        assert!(result.only_b.is_empty());
    }

    #[test]
    fn test_exact_match_only() {
        let a = vec![entry("/README.md", false)];
        let b = vec![entry("/readme.md", false)];

        let result = classify(&a, &b);

        assert!(result.conflicts.is_empty());
        assert_eq!(result.only_a.len(), 1);
        assert_eq!(result.only_b.len(), 1);
    }

    #[test]
    fn test_empty_sides() {
        let result = classify(&[], &[]);
        assert!(result.conflicts.is_empty());
        assert!(result.only_a.is_empty());
        assert!(result.only_b.is_empty());
    }

    proptest! {
        #[test]
        fn prop_every_entry_lands_in_exactly_one_bucket(
            a_names in proptest::collection::btree_set("[a-d]{1,2}", 0..12),
            b_names in proptest::collection::btree_set("[a-d]{1,2}", 0..12),
        ) {
            let a: Vec<FileEntry> = a_names.iter().map(|n| entry(n, false)).collect();
            let b: Vec<FileEntry> = b_names.iter().map(|n| entry(n, false)).collect();

            let result = classify(&a, &b);

            let expected: BTreeSet<RelPath> = a_names
                .intersection(&b_names)
                .map(|n| RelPath::parse(n))
                .collect();
            prop_assert_eq!(&result.conflicts, &expected);
            prop_assert_eq!(result.only_a.len() + result.conflicts.len(), a.len());
            prop_assert_eq!(result.only_b.len() + result.conflicts.len(), b.len());
            for e in result.only_a.iter().chain(result.only_b.iter()) {
                prop_assert!(!result.conflicts.contains(&e.relative_path));
            }
        }
    }
}
