//! Cancellation-aware reader and the shared hash-and-tee read loop.

use std::io::{self, Read};

use crate::control::CancelToken;
use crate::progress::SharedSink;

/// Read buffer per stream. Large enough to keep syscalls cheap, small enough
/// for many concurrent chunk workers.
pub(crate) const BUF_SIZE: usize = 256 * 1024;

/// Wraps a reader and checks the token before every `read`, so a fired
/// token stops I/O before the next call reaches the file.
pub(crate) struct CancelReader<'a, R> {
    inner: R,
    cancel: &'a CancelToken,
}

impl<'a, R> CancelReader<'a, R> {
    pub(crate) fn new(inner: R, cancel: &'a CancelToken) -> Self {
        Self { inner, cancel }
    }
}

impl<R: Read> Read for CancelReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cancel.check().map_err(io::Error::other)?;
        self.inner.read(buf)
    }
}

/// Streams `reader` to EOF through `hasher`, teeing byte counts to
/// `observers`. Returns the number of bytes read.
pub(crate) fn stream_into<R: Read>(
    mut reader: R,
    hasher: &mut crc32fast::Hasher,
    observers: &[SharedSink],
) -> io::Result<u64> {
    let mut buf = vec![0u8; BUF_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        for sink in observers {
            sink.add(n as u64);
        }
        total += n as u64;
    }
    Ok(total)
}
