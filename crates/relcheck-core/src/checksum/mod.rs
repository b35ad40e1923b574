//! CRC32 checksum engine.
//!
//! Computes the IEEE CRC32 (the zip/sfv convention) of a file either
//! sequentially or by hashing fixed-size chunks in parallel and combining the
//! partial CRCs in offset order. Both modes honour one [`CancelToken`] and tee
//! every byte read to optional progress observers.

mod combine;
mod error;
mod parallel;
mod plan;
mod pool;
mod reader;
mod sequential;

pub use combine::{crc32_combine, fold_chunks};
pub use error::ChecksumError;
pub use parallel::{crc32_parallel, effective_workers};
pub use plan::{plan_chunks, ChunkResult, FileChunk};
pub use sequential::crc32_sequential;

use std::path::Path;

use crate::control::CancelToken;
use crate::progress::SharedSink;

/// Default chunk size for parallel mode (10 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// One checksum call: which file, how to read it, and what to compare with.
///
/// Build it with struct update syntax over [`ChecksumRequest::new`]:
///
/// ```no_run
/// use relcheck_core::checksum::ChecksumRequest;
/// use relcheck_core::control::CancelToken;
/// use std::path::Path;
///
/// let cancel = CancelToken::new();
/// let crc = ChecksumRequest {
///     parallel: true,
///     workers: 4,
///     ..ChecksumRequest::new(Path::new("release/file.rar"), &cancel)
/// }
/// .compute()?;
/// # Ok::<(), relcheck_core::checksum::ChecksumError>(())
/// ```
#[derive(Clone)]
pub struct ChecksumRequest<'a> {
    pub path: &'a Path,
    /// Expected CRC32; `None` when only computing.
    pub want: Option<u32>,
    pub parallel: bool,
    /// Parallel worker hint; 0 = available parallelism.
    pub workers: usize,
    pub chunk_size: u64,
    pub cancel: &'a CancelToken,
    pub observers: &'a [SharedSink],
}

impl<'a> ChecksumRequest<'a> {
    /// Sequential request with default chunking and no observers.
    pub fn new(path: &'a Path, cancel: &'a CancelToken) -> Self {
        Self {
            path,
            want: None,
            parallel: false,
            workers: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel,
            observers: &[],
        }
    }

    /// CRC32 of the file.
    pub fn compute(&self) -> Result<u32, ChecksumError> {
        if self.parallel {
            crc32_parallel(
                self.path,
                self.workers,
                self.chunk_size,
                self.cancel,
                self.observers,
            )
        } else {
            crc32_sequential(self.path, self.cancel, self.observers)
        }
    }

    /// CRC32 of the file, checked against `want` when set.
    pub fn verify(&self) -> Result<u32, ChecksumError> {
        let actual = self.compute()?;
        match self.want {
            Some(expected) if expected != actual => Err(ChecksumError::Mismatch {
                path: self.path.to_path_buf(),
                expected,
                actual,
            }),
            _ => Ok(actual),
        }
    }
}

/// Size of `path`, rejecting anything that is not a regular file.
pub(crate) fn regular_file_len(path: &Path) -> Result<u64, ChecksumError> {
    let meta = std::fs::metadata(path).map_err(|e| ChecksumError::io(path, "stat", e))?;
    if meta.is_dir() {
        return Err(ChecksumError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(meta.len())
}
