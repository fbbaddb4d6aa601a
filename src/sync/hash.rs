//! Content hashing for conflict detection (BLAKE3, 256-bit)

use crate::error::{Result, SyncError};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Digest of a file's full contents
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a file by path, streaming it through a 64KB buffer
    ///
    /// Any failure to open or read is a [`SyncError::Read`]; it is not retried.
    pub fn from_file(path: &Path) -> Result<Self> {
        let read_err = |e| SyncError::Read {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = std::fs::File::open(path).map_err(read_err)?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; 64 * 1024];

        loop {
            let bytes_read = file.read(&mut buffer).map_err(read_err)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(Self(*hasher.finalize().as_bytes()))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "ContentHash({})", &hex[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
