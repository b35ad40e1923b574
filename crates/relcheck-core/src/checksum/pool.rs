//! Process-wide free list of CRC32 accumulators.
//!
//! Chunk workers take a hasher, use it for one chunk and hand it back reset.
//! Any pooled hasher can serve any chunk.

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Upper bound on idle hashers kept around.
const MAX_POOLED: usize = 64;

static POOL: Lazy<Mutex<Vec<Hasher>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A hasher borrowed from the pool; returned (reset) on drop.
pub(crate) struct PooledHasher {
    inner: Hasher,
}

/// Take a fresh-state hasher from the pool, or build one.
pub(crate) fn acquire() -> PooledHasher {
    let hasher = POOL
        .lock()
        .ok()
        .and_then(|mut pool| pool.pop())
        .unwrap_or_default();
    PooledHasher { inner: hasher }
}

impl PooledHasher {
    /// Current CRC32 of everything fed so far. Does not consume the hasher.
    pub(crate) fn crc(&self) -> u32 {
        self.inner.clone().finalize()
    }
}

impl Deref for PooledHasher {
    type Target = Hasher;

    fn deref(&self) -> &Hasher {
        &self.inner
    }
}

impl DerefMut for PooledHasher {
    fn deref_mut(&mut self) -> &mut Hasher {
        &mut self.inner
    }
}

impl Drop for PooledHasher {
    fn drop(&mut self) {
        let mut hasher = std::mem::take(&mut self.inner);
        hasher.reset();
        if let Ok(mut pool) = POOL.lock() {
            if pool.len() < MAX_POOLED {
                pool.push(hasher);
            }
        }
    }
}
