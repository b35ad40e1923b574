//! `relcheck zip <path>` – validate split-archive sets in .zip containers.

use anyhow::{Context, Result};
use relcheck_core::archive_set;
use relcheck_core::config::VerifyConfig;
use relcheck_core::control::CancelToken;
use relcheck_core::progress::ProgressTracker;
use relcheck_core::session::Session;
use relcheck_core::tree::ReleaseTree;
use std::path::PathBuf;
use std::sync::Arc;

use super::{check_error, run_with_progress};

pub async fn run_zip(
    cfg: VerifyConfig,
    cancel: CancelToken,
    path: PathBuf,
    save_nfo: Option<PathBuf>,
) -> Result<()> {
    let tracker = Arc::new(ProgressTracker::new(0));
    let t = Arc::clone(&tracker);
    let out = run_with_progress(tracker, move || {
        let tree = ReleaseTree::scan(&path)?;
        let session = Session::new(&cfg, cancel, tree.root()).tracked_by(t);
        archive_set::check_release(&session, &tree).map_err(|e| {
            let reason = e.cancelled();
            check_error(e, reason)
        })
    })
    .await?;

    for set in &out.sets {
        println!(
            "OK  {}  ({} of {} archives)",
            set.dir.display(),
            set.fragments.len(),
            set.expected_total
        );
    }

    if let Some(dest) = save_nfo {
        match &out.aux {
            Some(nfo) => {
                std::fs::write(&dest, &nfo.content)
                    .with_context(|| format!("write {}", dest.display()))?;
                println!("saved {} to {}", nfo.name, dest.display());
            }
            None => eprintln!("no .nfo found in zip files"),
        }
    }
    println!("zip check passed: {} folder(s)", out.sets.len());
    Ok(())
}
