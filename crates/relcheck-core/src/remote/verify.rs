//! Matching remote records against the local tree.

use std::time::Instant;

use super::record::RemoteRecord;
use super::source::{FetchError, RecordSource};
use super::RemoteError;
use crate::checksum::ChecksumError;
use crate::control::CancelToken;
use crate::progress::format_bytes;
use crate::session::Session;
use crate::tree::{ReleaseFile, ReleaseTree};

/// What a passing remote check covered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteReport {
    /// Names of the records that were checked.
    pub records: Vec<String>,
    pub files_checked: usize,
    pub bytes: u64,
    /// Sizes only; no content was read.
    pub fast: bool,
}

/// Distinct parent directory names of `media`, in first-seen order. These
/// are the release names looked up remotely.
pub fn release_candidates<'a>(media: impl IntoIterator<Item = &'a ReleaseFile>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in media.into_iter().filter_map(ReleaseFile::parent_name) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Fetches a record per candidate. Individual lookups that fail are logged
/// and skipped; cancellation stops the loop. No record at all is an error.
pub fn fetch_records(
    source: &dyn RecordSource,
    candidates: &[String],
    cancel: &CancelToken,
) -> Result<Vec<RemoteRecord>, RemoteError> {
    let mut records = Vec::with_capacity(candidates.len());
    for name in candidates {
        match source.fetch(name, cancel) {
            Ok(record) => records.push(record),
            Err(FetchError::Cancelled(reason)) => return Err(reason.into()),
            Err(e) => {
                tracing::error!(release = %name, "no srr record retrieved: {}", e);
            }
        }
    }
    if records.is_empty() {
        return Err(RemoteError::NothingFound {
            candidates: candidates.to_vec(),
        });
    }
    Ok(records)
}

/// Checks every archived file of `record` against the same-named local file.
/// The first missing file, size difference or CRC difference ends the check.
/// With `fast`, only sizes are compared and the tracker is advanced by the
/// declared size.
pub fn verify_record(
    session: &Session<'_>,
    tree: &ReleaseTree,
    record: &RemoteRecord,
    fast: bool,
) -> Result<usize, RemoteError> {
    for declared in &record.archived_files {
        session.cancel.check()?;
        let local = tree
            .find_by_name(&declared.name)
            .ok_or_else(|| RemoteError::MissingFile {
                record: record.name.clone(),
                file: declared.name.clone(),
            })?;

        if u64::try_from(declared.size).ok() != Some(local.size) {
            return Err(RemoteError::SizeMismatch {
                record: record.name.clone(),
                file: declared.name.clone(),
                expected: declared.size,
                actual: local.size,
            });
        }

        if fast {
            session.progress().advance(local.size);
            continue;
        }

        let want = declared.crc32().map_err(|source| RemoteError::BadCrc {
            record: record.name.clone(),
            file: declared.name.clone(),
            crc: declared.crc.clone(),
            source,
        })?;

        match session.request(&local.path, Some(want)).verify() {
            Ok(_) => {}
            Err(ChecksumError::Mismatch {
                expected, actual, ..
            }) => {
                return Err(RemoteError::CrcMismatch {
                    record: record.name.clone(),
                    file: declared.name.clone(),
                    expected,
                    actual,
                })
            }
            Err(ChecksumError::Cancelled(reason)) => return Err(reason.into()),
            Err(source) => {
                return Err(RemoteError::Checksum {
                    record: record.name.clone(),
                    source,
                })
            }
        }
    }
    tracing::debug!(srr = %record.name, "check passed");
    Ok(record.archived_files.len())
}

/// Looks up the releases `media` belongs to and verifies the local files
/// against every record found. One tracker, sized to the sum of declared
/// sizes, covers the whole run and is cancelled on the first failure.
pub fn check_release(
    session: &Session<'_>,
    source: &dyn RecordSource,
    tree: &ReleaseTree,
    media: &[&ReleaseFile],
    fast: bool,
) -> Result<RemoteReport, RemoteError> {
    let started = Instant::now();
    let candidates = release_candidates(media.iter().copied());
    let records = match fetch_records(source, &candidates, &session.cancel) {
        Ok(r) => r,
        Err(e) => {
            session.progress().cancel();
            return Err(e);
        }
    };

    let total: u64 = records.iter().map(RemoteRecord::total_size).sum();
    session.progress().grow_total(total);
    tracing::info!(total_size = %format_bytes(total), fast, "starting srr check");

    let mut report = RemoteReport {
        fast,
        bytes: total,
        ..RemoteReport::default()
    };
    for record in &records {
        match verify_record(session, tree, record, fast) {
            Ok(n) => {
                report.files_checked += n;
                report.records.push(record.name.clone());
            }
            Err(e) => {
                session.progress().cancel();
                return Err(e);
            }
        }
    }

    session.progress().finish();
    tracing::info!("checked srr in {:.1}s", started.elapsed().as_secs_f64());
    Ok(report)
}
