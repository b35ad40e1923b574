use std::io;
use std::path::{Path, PathBuf};

use crate::control::Cancelled;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveSetError {
    #[error("read zip file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{}: read entry {entry}: {source}", path.display())]
    ReadEntry {
        path: PathBuf,
        entry: String,
        #[source]
        source: io::Error,
    },

    /// No `.diz` with a usable `[n/m]` counter (missing, non-numeric or zero).
    #[error("{}: no file count in .diz", path.display())]
    NoCounter { path: PathBuf },

    #[error("{}: no archive in zip", path.display())]
    NoFragment { path: PathBuf },

    /// Two containers of one directory declare different totals.
    #[error("{}: archive total {found} differs from {expected} declared by the first container", path.display())]
    TotalMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("zip check failed in {}: expected {expected} archives, got {actual}", dir.display())]
    CountMismatch {
        dir: PathBuf,
        expected: u32,
        actual: usize,
    },

    #[error("zip check failed in {}: {sizes} different archive sizes, at most 2 expected", dir.display())]
    TooManySizes { dir: PathBuf, sizes: usize },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl ArchiveSetError {
    pub(crate) fn open(path: &Path, source: impl Into<zip::result::ZipError>) -> Self {
        ArchiveSetError::Open {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub fn cancelled(&self) -> Option<Cancelled> {
        match self {
            ArchiveSetError::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled().is_some()
    }
}
