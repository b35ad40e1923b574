//! `relcheck sfv <path>` – check every .sfv manifest in a release.

use anyhow::Result;
use relcheck_core::config::VerifyConfig;
use relcheck_core::control::CancelToken;
use relcheck_core::progress::ProgressTracker;
use relcheck_core::session::Session;
use relcheck_core::sfv;
use relcheck_core::tree::ReleaseTree;
use std::path::PathBuf;
use std::sync::Arc;

use super::{check_error, run_with_progress};

pub async fn run_sfv(cfg: VerifyConfig, cancel: CancelToken, path: PathBuf) -> Result<()> {
    let tracker = Arc::new(ProgressTracker::new(0));
    let t = Arc::clone(&tracker);
    let report = run_with_progress(tracker, move || {
        let tree = ReleaseTree::scan(&path)?;
        let session = Session::new(&cfg, cancel, tree.root()).tracked_by(t);
        sfv::check_release(&session, &tree).map_err(|e| {
            let reason = e.cancelled();
            check_error(e, reason)
        })
    })
    .await?;

    for manifest in &report.manifests {
        println!(
            "OK  {}  ({} files)",
            manifest.manifest.display(),
            manifest.entries.len()
        );
    }
    println!("sfv check passed: {} file(s)", report.files_checked());
    Ok(())
}
