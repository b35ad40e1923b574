//! Progress reporting for checks (bytes hashed, rate, ETA).
//!
//! The checksum engine tees every byte it reads into zero or more
//! [`ProgressSink`]s. Sinks are shared between chunk workers, so
//! implementations must tolerate concurrent `add` calls.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Incremental byte-count observer.
pub trait ProgressSink: Send + Sync {
    fn add(&self, bytes: u64);
}

/// Shared handle to a progress observer.
pub type SharedSink = Arc<dyn ProgressSink>;

/// Plain concurrent byte counter.
#[derive(Debug, Default)]
pub struct ByteCounter(AtomicU64);

impl ByteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ByteCounter {
    fn add(&self, bytes: u64) {
        self.0.fetch_add(bytes, Ordering::Relaxed);
    }
}

const RUNNING: u8 = 0;
const FINISHED: u8 = 1;
const CANCELLED: u8 = 2;

/// Progress for one verification run: a growable total plus a byte counter.
///
/// Verifiers grow the total as they learn about work (manifest sizes,
/// declared record sizes) and mark the run finished or cancelled at the end.
#[derive(Debug)]
pub struct ProgressTracker {
    total: AtomicU64,
    done: AtomicU64,
    state: AtomicU8,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            total: AtomicU64::new(total),
            done: AtomicU64::new(0),
            state: AtomicU8::new(RUNNING),
            started: Instant::now(),
        }
    }

    pub fn grow_total(&self, bytes: u64) {
        self.total.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Count bytes as done without them passing through the engine
    /// (used by size-only checks).
    pub fn advance(&self, bytes: u64) {
        self.done.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn finish(&self) {
        let _ = self
            .state
            .compare_exchange(RUNNING, FINISHED, Ordering::Relaxed, Ordering::Relaxed);
    }

    pub fn cancel(&self) {
        let _ = self
            .state
            .compare_exchange(RUNNING, CANCELLED, Ordering::Relaxed, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.state.load(Ordering::Relaxed) == FINISHED
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Relaxed) == CANCELLED
    }

    pub fn snapshot(&self) -> ProgressStats {
        ProgressStats {
            bytes_done: self.done.load(Ordering::Relaxed),
            total_bytes: self.total.load(Ordering::Relaxed),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl ProgressSink for ProgressTracker {
    fn add(&self, bytes: u64) {
        self.advance(bytes);
    }
}

/// Snapshot of a run's progress (CLI-friendly).
#[derive(Debug, Clone)]
pub struct ProgressStats {
    pub bytes_done: u64,
    pub total_bytes: u64,
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Hashing rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if nothing has been hashed yet).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_done as f64 / self.total_bytes as f64).min(1.0)
    }
}

/// Human-readable byte count with binary units, e.g. `1.5 GiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
