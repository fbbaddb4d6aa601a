use crate::error::{Result, SyncError};
use serde::{Serialize, Serializer};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Which of the two merged trees an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::A => "a",
            Side::B => "b",
        }
    }

    pub fn other(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path identifying an entry independently of the root it was found under.
///
/// Only normal components are kept, so `/notes.txt`, `notes.txt` and
/// `./notes.txt` all name the same entry. Displayed with a leading `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelPath(PathBuf);

impl RelPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let normalized = path
            .as_ref()
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect::<PathBuf>();
        Self(normalized)
    }

    /// Parse the leading-separator form used in messages (`/dir/file.txt`)
    pub fn parse(s: &str) -> Self {
        Self::new(Path::new(s))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn file_name(&self) -> Option<&OsStr> {
        self.0.file_name()
    }

    /// Component-wise prefix test (`/docs` covers `/docs/a.txt`, not `/docs2`)
    pub fn starts_with(&self, base: &RelPath) -> bool {
        self.0.starts_with(&base.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Same parent directory, different final component
    pub fn with_file_name(&self, name: impl AsRef<OsStr>) -> Self {
        Self(self.0.with_file_name(name))
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("/");
        }
        for part in self.0.components() {
            write!(f, "/{}", part.as_os_str().to_string_lossy())?;
        }
        Ok(())
    }
}

impl Serialize for RelPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A validated, canonical directory root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    path: PathBuf,
}

impl Root {
    /// Check that `path` is an existing directory and resolve it to canonical form
    pub fn open(path: &Path) -> Result<Self> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(SyncError::NotADirectory {
                    path: path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::RootNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(SyncError::ReadDir {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        }

        let path = std::fs::canonicalize(path).map_err(|e| SyncError::ReadDir {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strip the root prefix from an absolute path found under it
    pub fn relativize(&self, absolute: &Path) -> Result<RelPath> {
        absolute
            .strip_prefix(&self.path)
            .map(RelPath::new)
            .map_err(|_| SyncError::InvalidPath {
                path: absolute.to_path_buf(),
            })
    }

    /// Absolute location of `rel` under this root
    pub fn resolve(&self, rel: &RelPath) -> PathBuf {
        self.path.join(rel.as_path())
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
