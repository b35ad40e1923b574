//! Chunk type and chunk planning for parallel hashing.

/// A contiguous slice of a file: `len` bytes starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileChunk {
    /// Start offset (inclusive).
    pub start: u64,
    /// Length in bytes.
    pub len: u64,
}

impl FileChunk {
    /// End offset (exclusive).
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

/// Partial CRC32 of one chunk. Arrives in completion order, not file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkResult {
    pub index: usize,
    pub crc: u32,
    pub len: u64,
}

/// Splits `file_size` bytes into fixed `chunk_size` chunks; the last one may
/// be shorter. An empty file yields a single zero-length chunk so every file
/// has at least one unit of work. A `chunk_size` of 0 is treated as 1.
pub fn plan_chunks(file_size: u64, chunk_size: u64) -> Vec<FileChunk> {
    if file_size == 0 {
        return vec![FileChunk { start: 0, len: 0 }];
    }

    let chunk_size = chunk_size.max(1);
    let count = file_size.div_ceil(chunk_size);
    let mut out = Vec::with_capacity(count as usize);
    let mut offset = 0u64;

    while offset < file_size {
        let len = chunk_size.min(file_size - offset);
        out.push(FileChunk { start: offset, len });
        offset += len;
    }

    out
}
