//! `relcheck crc <file>` – CRC32 of a single file.

use anyhow::Result;
use relcheck_core::config::VerifyConfig;
use relcheck_core::control::CancelToken;
use relcheck_core::progress::ProgressTracker;
use relcheck_core::session::Session;
use std::path::PathBuf;
use std::sync::Arc;

use super::{check_error, run_with_progress};

/// Compute the CRC32 of `path` and print it sfv-style; with `want`, fail on
/// a mismatch.
pub async fn run_crc(
    cfg: VerifyConfig,
    cancel: CancelToken,
    path: PathBuf,
    want: Option<u32>,
) -> Result<()> {
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let tracker = Arc::new(ProgressTracker::new(size));
    let t = Arc::clone(&tracker);
    let p = path.clone();
    let crc = run_with_progress(tracker, move || {
        let session = Session::new(&cfg, cancel, &p).tracked_by(t);
        let result = session.request(&p, want).verify();
        match &result {
            Ok(_) => session.progress().finish(),
            Err(_) => session.progress().cancel(),
        }
        result.map_err(|e| {
            let reason = e.cancelled();
            check_error(e, reason)
        })
    })
    .await?;

    println!("{} {:08x}", path.display(), crc);
    Ok(())
}
