//! Per-run context handed to every verifier.

use std::path::Path;
use std::sync::Arc;

use crate::checksum::ChecksumRequest;
use crate::config::VerifyConfig;
use crate::control::CancelToken;
use crate::progress::{ProgressTracker, SharedSink};
use crate::storage;

/// Everything a check needs besides its inputs: the immutable config, the
/// run's cancellation token, the read mode resolved for the release's device,
/// and the progress tracker shared by all files of the run.
pub struct Session<'a> {
    pub config: &'a VerifyConfig,
    pub cancel: CancelToken,
    /// Hash with parallel chunked reads.
    pub parallel: bool,
    progress: Arc<ProgressTracker>,
    observers: Vec<SharedSink>,
}

impl<'a> Session<'a> {
    /// Session for a release rooted at `root`. The config's overall timeout,
    /// when set, becomes a deadline on a child of `cancel`.
    pub fn new(config: &'a VerifyConfig, cancel: CancelToken, root: &Path) -> Self {
        let cancel = match config.timeout() {
            Some(timeout) => cancel.child_with_timeout(timeout),
            None => cancel,
        };
        let parallel = storage::use_parallel_read(config.engine.read_mode, root);
        Self::with_progress(config, cancel, parallel, Arc::new(ProgressTracker::new(0)))
    }

    /// Session with an explicit read mode and a caller-owned tracker.
    pub fn with_progress(
        config: &'a VerifyConfig,
        cancel: CancelToken,
        parallel: bool,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        let sink: SharedSink = progress.clone();
        Self {
            config,
            cancel,
            parallel,
            progress,
            observers: vec![sink],
        }
    }

    /// Replaces the run's tracker with a caller-owned one (e.g. one a UI polls).
    pub fn tracked_by(mut self, progress: Arc<ProgressTracker>) -> Self {
        let sink: SharedSink = progress.clone();
        self.observers = vec![sink];
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    pub fn observers(&self) -> &[SharedSink] {
        &self.observers
    }

    /// Checksum request for `path` using this session's engine settings.
    pub fn request<'s>(&'s self, path: &'s Path, want: Option<u32>) -> ChecksumRequest<'s> {
        ChecksumRequest {
            path,
            want,
            parallel: self.parallel,
            workers: self.config.engine.hash_threads,
            chunk_size: self.config.engine.chunk_size,
            cancel: &self.cancel,
            observers: &self.observers,
        }
    }
}
