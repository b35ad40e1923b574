//! Per-directory consistency: fragment count and size spread.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::error::ArchiveSetError;
use super::scan::{scan_container, ArchiveFragment, AuxText};
use crate::control::CancelToken;
use crate::session::Session;
use crate::tree::ReleaseTree;

/// Fragments of one directory, in container name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSetResult {
    pub dir: PathBuf,
    pub fragments: Vec<ArchiveFragment>,
    /// Total declared by the counters (0 when there were no containers).
    pub expected_total: u32,
    pub aux: Option<AuxText>,
}

/// Scans every container of one directory. Containers are visited in file
/// name order and must all declare the same total.
pub fn scan_directory(
    dir: &Path,
    containers: &[PathBuf],
    cancel: &CancelToken,
) -> Result<ArchiveSetResult, ArchiveSetError> {
    let mut ordered: Vec<&PathBuf> = containers.iter().collect();
    ordered.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut fragments = Vec::with_capacity(ordered.len());
    let mut aux: Option<AuxText> = None;
    let mut expected_total = 0u32;

    for path in ordered {
        cancel.check()?;
        let (fragment, found) = scan_container(path, aux.is_none())?;
        if fragments.is_empty() {
            expected_total = fragment.total;
        } else if fragment.total != expected_total {
            return Err(ArchiveSetError::TotalMismatch {
                path: path.clone(),
                expected: expected_total,
                found: fragment.total,
            });
        }
        if aux.is_none() {
            aux = found;
        }
        fragments.push(fragment);
    }

    Ok(ArchiveSetResult {
        dir: dir.to_path_buf(),
        fragments,
        expected_total,
        aux,
    })
}

/// Count must equal the declared total and at most two distinct sizes may
/// occur (full volumes plus a shorter last one).
pub fn validate(result: &ArchiveSetResult) -> Result<(), ArchiveSetError> {
    if result.fragments.len() != result.expected_total as usize {
        return Err(ArchiveSetError::CountMismatch {
            dir: result.dir.clone(),
            expected: result.expected_total,
            actual: result.fragments.len(),
        });
    }
    let sizes: HashSet<u64> = result.fragments.iter().map(|f| f.size).collect();
    if sizes.len() > 2 {
        return Err(ArchiveSetError::TooManySizes {
            dir: result.dir.clone(),
            sizes: sizes.len(),
        });
    }
    Ok(())
}

/// Scan plus validation for one directory.
pub fn check_directory(
    dir: &Path,
    containers: &[PathBuf],
    cancel: &CancelToken,
) -> Result<ArchiveSetResult, ArchiveSetError> {
    let result = scan_directory(dir, containers, cancel)?;
    validate(&result)?;
    Ok(result)
}

/// Validated sets of a release plus the first auxiliary text found.
#[derive(Debug, Clone, Default)]
pub struct ReleaseArchives {
    pub sets: Vec<ArchiveSetResult>,
    pub aux: Option<AuxText>,
}

/// Checks every directory of the release that holds `.zip` containers.
/// The first failing directory ends the run.
pub fn check_release(
    session: &Session<'_>,
    tree: &ReleaseTree,
) -> Result<ReleaseArchives, ArchiveSetError> {
    let started = Instant::now();
    let groups = tree.group_by_dir("zip");
    if groups.is_empty() {
        tracing::warn!(root = %tree.root().display(), "no zip files in release");
    }

    let progress = session.progress();
    progress.grow_total(groups.values().flatten().map(|f| f.size).sum());

    let mut out = ReleaseArchives::default();
    for (dir, files) in &groups {
        tracing::info!(folder = %dir.display(), zips = files.len(), "checking zip files");
        let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
        let result = match check_directory(dir, &paths, &session.cancel) {
            Ok(r) => r,
            Err(e) => {
                progress.cancel();
                return Err(e);
            }
        };
        progress.advance(files.iter().map(|f| f.size).sum());
        tracing::info!(
            folder = %dir.display(),
            archives = result.fragments.len(),
            "zip check complete"
        );
        if out.aux.is_none() {
            out.aux = result.aux.clone();
        }
        out.sets.push(result);
    }

    progress.finish();
    tracing::debug!("zip checks done in {:.1}s", started.elapsed().as_secs_f64());
    Ok(out)
}
