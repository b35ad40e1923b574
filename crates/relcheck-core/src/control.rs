//! Cancellation tokens shared by the checksum engine and the verifiers.
//!
//! A token is a shared abort flag plus an optional deadline. Every blocking
//! loop (file reads, chunk workers, record fetches) calls [`CancelToken::check`]
//! before its next step and stops with [`Cancelled`] once the flag is set or
//! the deadline has passed. Clones share the flag, so cancelling any clone
//! stops every holder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why an operation stopped early. Never an integrity verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Cancelled {
    /// The token was cancelled explicitly (e.g. Ctrl-C).
    #[error("operation canceled")]
    Canceled,
    /// The token's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Shared cancellation flag with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only stops when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// A token that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Clone sharing this token's flag, with a deadline no later than `timeout`
    /// from now (the earlier of the two deadlines is kept).
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(d) if d < candidate => d,
            _ => candidate,
        };
        Self {
            flag: Arc::clone(&self.flag),
            deadline: Some(deadline),
        }
    }

    /// Request cancellation for every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// The reason this token has fired, if it has. An explicit cancel wins
    /// over an expired deadline.
    pub fn reason(&self) -> Option<Cancelled> {
        if self.flag.load(Ordering::Relaxed) {
            return Some(Cancelled::Canceled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(Cancelled::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// `Err` once the token has fired.
    pub fn check(&self) -> Result<(), Cancelled> {
        match self.reason() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Time left before the deadline (`None` when there is no deadline).
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}
