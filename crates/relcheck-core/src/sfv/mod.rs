//! Sidecar (SFV) manifest verification.
//!
//! A manifest lists `<filename> <crc32>` pairs for files next to it. Every
//! listed file is hashed; a mismatch is recorded and checking continues so
//! the report covers the whole manifest. A listed file that does not exist
//! stops that manifest immediately.

mod parse;
mod verify;

pub use parse::{load_manifest, parse_manifest, total_size, SfvEntry};
pub use verify::{check_manifest, check_release, EntryOutcome, ManifestReport, ReleaseReport};

use std::io;
use std::path::PathBuf;

use crate::checksum::ChecksumError;
use crate::control::Cancelled;

#[derive(Debug, thiserror::Error)]
pub enum SfvError {
    #[error("read sfv {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest exists but contains no `<name> <crc>` line.
    #[error("empty sfv file {}: no entries found", path.display())]
    Empty { path: PathBuf },

    #[error("{}: listed file {name}: {source}", manifest.display())]
    MissingFile {
        manifest: PathBuf,
        name: String,
        #[source]
        source: io::Error,
    },

    /// Hashing failed for a reason other than a CRC mismatch.
    #[error("{}: {source}", manifest.display())]
    Checksum {
        manifest: PathBuf,
        #[source]
        source: ChecksumError,
    },

    /// One or more entries did not match; names are `manifest: file`.
    #[error("sfv check failed: {} bad file(s): {}", failed.len(), failed.join(", "))]
    ReleaseFailed { failed: Vec<String> },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl SfvError {
    pub fn cancelled(&self) -> Option<Cancelled> {
        match self {
            SfvError::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled().is_some()
    }
}
