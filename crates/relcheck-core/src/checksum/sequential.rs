//! Front-to-back CRC32 over a single file handle.

use std::fs::File;
use std::path::Path;

use super::error::ChecksumError;
use super::pool;
use super::reader::{stream_into, CancelReader};
use crate::control::CancelToken;
use crate::progress::SharedSink;

/// CRC32 of the file at `path`, read sequentially. The token is checked
/// before every read; bytes are teed to `observers` as they are hashed.
pub fn crc32_sequential(
    path: &Path,
    cancel: &CancelToken,
    observers: &[SharedSink],
) -> Result<u32, ChecksumError> {
    super::regular_file_len(path)?;

    let file = File::open(path).map_err(|e| ChecksumError::io(path, "open", e))?;
    let mut hasher = pool::acquire();
    stream_into(CancelReader::new(file, cancel), &mut hasher, observers)
        .map_err(|e| ChecksumError::io(path, "read", e))?;

    Ok(hasher.crc())
}
