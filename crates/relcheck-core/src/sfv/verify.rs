//! Driving the checksum engine over manifest entries.

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::parse::{load_manifest, total_size, SfvEntry};
use super::SfvError;
use crate::checksum::ChecksumError;
use crate::progress::format_bytes;
use crate::session::Session;
use crate::tree::ReleaseTree;

/// Result of hashing one manifest entry.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub entry: SfvEntry,
    pub actual: u32,
}

impl EntryOutcome {
    pub fn passed(&self) -> bool {
        self.entry.crc == self.actual
    }
}

/// Per-entry results for one manifest.
#[derive(Debug, Clone)]
pub struct ManifestReport {
    pub manifest: PathBuf,
    pub entries: Vec<EntryOutcome>,
}

impl ManifestReport {
    pub fn passed(&self) -> bool {
        self.entries.iter().all(EntryOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.entries.iter().filter(|e| !e.passed())
    }
}

/// Reports for every manifest of a passing release.
#[derive(Debug, Clone, Default)]
pub struct ReleaseReport {
    pub manifests: Vec<ManifestReport>,
}

impl ReleaseReport {
    pub fn files_checked(&self) -> usize {
        self.manifests.iter().map(|m| m.entries.len()).sum()
    }
}

/// Hashes every entry of `manifest`. Mismatches are recorded in the report;
/// a missing listed file, an I/O failure or cancellation ends the manifest
/// with an error.
pub fn check_manifest(session: &Session<'_>, manifest: &Path) -> Result<ManifestReport, SfvError> {
    session.cancel.check()?;
    let entries = load_manifest(manifest)?;
    let size = total_size(&entries);
    session.progress().grow_total(size);
    tracing::debug!(
        manifest = %manifest.display(),
        entries = entries.len(),
        size = %format_bytes(size),
        parallel = session.parallel,
        "checking manifest"
    );

    let mut outcomes = Vec::with_capacity(entries.len());
    for entry in entries {
        let result = session.request(&entry.path, Some(entry.crc)).verify();
        let actual = match result {
            Ok(actual) => actual,
            Err(ChecksumError::Mismatch { actual, .. }) => {
                tracing::error!(
                    manifest = %manifest.display(),
                    file = %entry.name,
                    "crc mismatch: expected {:08x}, got {:08x}",
                    entry.crc,
                    actual
                );
                actual
            }
            Err(ChecksumError::Cancelled(reason)) => return Err(reason.into()),
            Err(source) => {
                return Err(SfvError::Checksum {
                    manifest: manifest.to_path_buf(),
                    source,
                })
            }
        };
        outcomes.push(EntryOutcome { entry, actual });
    }

    Ok(ManifestReport {
        manifest: manifest.to_path_buf(),
        entries: outcomes,
    })
}

/// Checks every `.sfv` manifest in the release. All manifests are checked in
/// full; the release passes only when every entry of every manifest matched.
/// Any error other than a mismatch stops the run at once.
pub fn check_release(session: &Session<'_>, tree: &ReleaseTree) -> Result<ReleaseReport, SfvError> {
    let started = Instant::now();
    let manifests: Vec<_> = tree.files_with_extension("sfv").collect();
    if manifests.is_empty() {
        tracing::warn!(root = %tree.root().display(), "no sfv files in release");
    }

    let mut report = ReleaseReport::default();
    let mut failed = Vec::new();
    for sfv in manifests {
        tracing::info!(sfv = %sfv.name, "starting sfv check");
        let manifest = match check_manifest(session, &sfv.path) {
            Ok(m) => m,
            Err(e) => {
                session.progress().cancel();
                return Err(e);
            }
        };
        if manifest.passed() {
            tracing::info!(sfv = %sfv.name, "check passed");
        } else {
            tracing::error!(sfv = %sfv.name, "check failed");
            failed.extend(
                manifest
                    .failures()
                    .map(|f| format!("{}: {}", sfv.name, f.entry.name)),
            );
        }
        report.manifests.push(manifest);
    }

    session.progress().finish();
    if !failed.is_empty() {
        return Err(SfvError::ReleaseFailed { failed });
    }
    tracing::info!(
        files = report.files_checked(),
        "sfv checks complete in {:.1}s",
        started.elapsed().as_secs_f64()
    );
    Ok(report)
}
