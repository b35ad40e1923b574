//! Chunked CRC32 with a bounded worker pool.
//!
//! Chunks are queued up front; each worker pops a chunk, opens its own file
//! handle, seeks to the chunk start and hashes exactly `len` bytes. Results
//! come back over a channel in completion order and are slotted by chunk
//! index, so the final fold always runs in file order.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::combine::fold_chunks;
use super::error::ChecksumError;
use super::plan::{plan_chunks, ChunkResult, FileChunk};
use super::pool;
use super::reader::{stream_into, CancelReader};
use crate::control::CancelToken;
use crate::progress::SharedSink;

/// How often the collector wakes up to look at the token while no chunk
/// result is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

type ChunkOutcome = Result<ChunkResult, ChecksumError>;

/// Worker count for a hint: the hint itself if > 0, else the platform's
/// available parallelism.
pub fn effective_workers(hint: usize) -> usize {
    if hint > 0 {
        return hint;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// CRC32 of the file at `path`, hashed in `chunk_size` chunks by up to
/// `workers` threads (0 = available parallelism). The result equals
/// [`crc32_sequential`](super::crc32_sequential) for the same bytes.
///
/// The first error wins: remaining queued chunks are dropped and results
/// still in flight are discarded.
pub fn crc32_parallel(
    path: &Path,
    workers: usize,
    chunk_size: u64,
    cancel: &CancelToken,
    observers: &[SharedSink],
) -> Result<u32, ChecksumError> {
    let file_size = super::regular_file_len(path)?;
    let chunks = plan_chunks(file_size, chunk_size);
    if file_size == 0 {
        cancel.check()?;
        return Ok(0);
    }

    let count = chunks.len();
    let work: Arc<Mutex<VecDeque<(usize, FileChunk)>>> =
        Arc::new(Mutex::new(chunks.into_iter().enumerate().collect()));
    let stop = Arc::new(AtomicBool::new(false));
    let observers: Arc<[SharedSink]> = observers.into();
    let (tx, rx) = mpsc::channel::<ChunkOutcome>();

    let num_workers = effective_workers(workers).min(count);
    tracing::debug!(
        path = %path.display(),
        chunks = count,
        workers = num_workers,
        "parallel crc32"
    );

    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let stop = Arc::clone(&stop);
        let observers = Arc::clone(&observers);
        let cancel = cancel.clone();
        let tx = tx.clone();
        let path = path.to_path_buf();
        handles.push(std::thread::spawn(move || loop {
            if stop.load(Ordering::Relaxed) || cancel.is_cancelled() {
                break;
            }
            let next = match work.lock() {
                Ok(mut q) => q.pop_front(),
                Err(_) => None,
            };
            let Some((index, chunk)) = next else {
                break;
            };
            let res = hash_chunk(&path, index, chunk, &cancel, &observers);
            if tx.send(res).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut slots: Vec<Option<ChunkResult>> = vec![None; count];
    let mut collected = 0u64;
    let mut outcome: Result<(), ChecksumError> = Ok(());
    while collected < file_size {
        if let Err(reason) = cancel.check() {
            outcome = Err(reason.into());
            break;
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(chunk)) => {
                collected += chunk.len;
                slots[chunk.index] = Some(chunk);
            }
            Ok(Err(e)) => {
                outcome = Err(e);
                break;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                outcome = Err(worker_error(
                    path,
                    format!("result channel closed after {} of {} bytes", collected, file_size),
                ));
                break;
            }
        }
    }

    stop.store(true, Ordering::Relaxed);
    drop(rx);
    for h in handles {
        if h.join().is_err() && outcome.is_ok() {
            outcome = Err(worker_error(path, "worker panicked".to_string()));
        }
    }
    outcome?;

    let ordered: Vec<ChunkResult> = slots.into_iter().flatten().collect();
    if ordered.len() != count {
        return Err(worker_error(
            path,
            format!("{} of {} chunks missing", count - ordered.len(), count),
        ));
    }
    Ok(fold_chunks(&ordered))
}

/// Hashes one chunk with its own file handle.
fn hash_chunk(
    path: &Path,
    index: usize,
    chunk: FileChunk,
    cancel: &CancelToken,
    observers: &[SharedSink],
) -> ChunkOutcome {
    let mut file = File::open(path).map_err(|e| ChecksumError::io(path, "open", e))?;
    file.seek(SeekFrom::Start(chunk.start))
        .map_err(|e| ChecksumError::io(path, "seek", e))?;

    let mut hasher = pool::acquire();
    let reader = CancelReader::new(file.take(chunk.len), cancel);
    let received = stream_into(reader, &mut hasher, observers)
        .map_err(|e| ChecksumError::io(path, "read", e))?;
    if received != chunk.len {
        return Err(ChecksumError::ShortRead {
            path: path.to_path_buf(),
            expected: chunk.len,
            received,
        });
    }

    Ok(ChunkResult {
        index,
        crc: hasher.crc(),
        len: received,
    })
}

fn worker_error(path: &Path, reason: String) -> ChecksumError {
    ChecksumError::Worker {
        path: PathBuf::from(path),
        reason,
    }
}
