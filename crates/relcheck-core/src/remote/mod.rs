//! Verification against checksums recorded by a remote database (srrDB).
//!
//! Local media files name their release through their parent directory.
//! Each distinct release is looked up; every archived file the records list
//! must exist locally with the exact declared size and, unless a fast check
//! was requested, the declared CRC32.

mod record;
mod source;
mod verify;

pub use record::{ArchivedFile, RemoteRecord};
pub use source::{FetchError, RecordSource, SrrDb};
pub use verify::{check_release, fetch_records, release_candidates, verify_record, RemoteReport};

use crate::checksum::ChecksumError;
use crate::control::Cancelled;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("nothing found on srrdb for {}", candidates.join(", "))]
    NothingFound { candidates: Vec<String> },

    #[error("verify srr {record}: file {file} not found in release")]
    MissingFile { record: String, file: String },

    #[error("verify srr {record}: srr check failed: size mismatch for {file}: expected {expected}, got {actual}")]
    SizeMismatch {
        record: String,
        file: String,
        expected: i64,
        actual: u64,
    },

    #[error("verify srr {record}: {file}: parse crc {crc:?}: {source}")]
    BadCrc {
        record: String,
        file: String,
        crc: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("verify srr {record}: srr check failed: crc mismatch for {file}: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch {
        record: String,
        file: String,
        expected: u32,
        actual: u32,
    },

    #[error("verify srr {record}: {source}")]
    Checksum {
        record: String,
        #[source]
        source: ChecksumError,
    },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl RemoteError {
    pub fn cancelled(&self) -> Option<Cancelled> {
        match self {
            RemoteError::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled().is_some()
    }
}
