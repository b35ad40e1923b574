//! `relcheck srr <path>` – verify a release against srrDB records.

use anyhow::Result;
use relcheck_core::config::VerifyConfig;
use relcheck_core::control::CancelToken;
use relcheck_core::progress::{format_bytes, ProgressTracker};
use relcheck_core::remote::{self, SrrDb};
use relcheck_core::session::Session;
use relcheck_core::tree::{ReleaseFile, ReleaseTree};
use std::path::PathBuf;
use std::sync::Arc;

use super::{check_error, run_with_progress};

pub async fn run_srr(
    cfg: VerifyConfig,
    cancel: CancelToken,
    path: PathBuf,
    fast: bool,
    extensions: Vec<String>,
) -> Result<()> {
    let tracker = Arc::new(ProgressTracker::new(0));
    let t = Arc::clone(&tracker);
    let report = run_with_progress(tracker, move || {
        let tree = ReleaseTree::scan(&path)?;
        let media: Vec<&ReleaseFile> = tree
            .files()
            .iter()
            .filter(|f| extensions.iter().any(|ext| f.has_extension(ext)))
            .collect();
        if media.is_empty() {
            anyhow::bail!(
                "no media files ({}) in {}",
                extensions.join(", "),
                path.display()
            );
        }

        let source = SrrDb::new(&cfg.remote)?;
        let session = Session::new(&cfg, cancel, tree.root()).tracked_by(t);
        remote::check_release(&session, &source, &tree, &media, fast).map_err(|e| {
            let reason = e.cancelled();
            check_error(e, reason)
        })
    })
    .await?;

    for record in &report.records {
        println!("OK  {}", record);
    }
    println!(
        "srr check passed: {} file(s), {}{}",
        report.files_checked,
        format_bytes(report.bytes),
        if report.fast { " (sizes only)" } else { "" }
    );
    Ok(())
}
