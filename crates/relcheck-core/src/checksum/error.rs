//! Error type for CRC32 computation and verification.

use std::io;
use std::path::{Path, PathBuf};

use crate::control::Cancelled;

/// Error returned by the checksum engine. Cancellation is its own variant so
/// callers can stop a batch without reporting an integrity failure.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("{}: directory, not a regular file", path.display())]
    NotAFile { path: PathBuf },

    /// Open/stat/seek/read failure on the file being hashed.
    #[error("{}: {op}: {source}", path.display())]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// A chunk ended before its planned length (file shrank while hashing).
    #[error("{}: incomplete read: expected {expected} bytes, got {received}", path.display())]
    ShortRead {
        path: PathBuf,
        expected: u64,
        received: u64,
    },

    #[error("{}: crc mismatch: expected {expected:08x}, got {actual:08x}", path.display())]
    Mismatch {
        path: PathBuf,
        expected: u32,
        actual: u32,
    },

    /// A chunk worker died or the result channel closed early.
    #[error("{}: checksum worker failed: {reason}", path.display())]
    Worker { path: PathBuf, reason: String },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl ChecksumError {
    /// Wraps an I/O error, unwrapping cancellation raised inside a reader.
    pub(crate) fn io(path: &Path, op: &'static str, source: io::Error) -> Self {
        if let Some(reason) = cancelled_from_io(&source) {
            return ChecksumError::Cancelled(reason);
        }
        ChecksumError::Io {
            path: path.to_path_buf(),
            op,
            source,
        }
    }

    pub fn cancelled(&self) -> Option<Cancelled> {
        match self {
            ChecksumError::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled().is_some()
    }

    /// File the error refers to (`None` for cancellation).
    pub fn path(&self) -> Option<&Path> {
        match self {
            ChecksumError::NotAFile { path }
            | ChecksumError::Io { path, .. }
            | ChecksumError::ShortRead { path, .. }
            | ChecksumError::Mismatch { path, .. }
            | ChecksumError::Worker { path, .. } => Some(path),
            ChecksumError::Cancelled(_) => None,
        }
    }
}

fn cancelled_from_io(e: &io::Error) -> Option<Cancelled> {
    e.get_ref()
        .and_then(|inner| inner.downcast_ref::<Cancelled>())
        .copied()
}
