//! Single pass over the entries of one container.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::counter::{classify, parse_counter, EntryKind, VolumeCounter};
use super::error::ArchiveSetError;

/// The payload fragment found in one container, with its volume counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFragment {
    /// Container the fragment was found in.
    pub container: PathBuf,
    /// Fragment entry name, e.g. `archive.r00`.
    pub name: String,
    /// Uncompressed size.
    pub size: u64,
    pub current: u32,
    pub total: u32,
}

/// Auxiliary text (`.nfo`) captured from a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxText {
    pub name: String,
    pub content: Vec<u8>,
}

/// Scans `path` once. The `.nfo` is only read while `want_aux` is set and the
/// first non-empty one is returned.
pub fn scan_container(
    path: &Path,
    want_aux: bool,
) -> Result<(ArchiveFragment, Option<AuxText>), ArchiveSetError> {
    let file = File::open(path).map_err(|e| ArchiveSetError::open(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ArchiveSetError::open(path, e))?;

    let mut counter: Option<VolumeCounter> = None;
    let mut fragment: Option<(String, u64)> = None;
    let mut aux: Option<AuxText> = None;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ArchiveSetError::open(path, e))?;
        let name = entry.name().to_string();
        match classify(&name) {
            EntryKind::Counter => {
                let content = read_entry(path, &name, &mut entry)?;
                let Some(c) = parse_counter(&content) else {
                    return Err(ArchiveSetError::NoCounter {
                        path: path.to_path_buf(),
                    });
                };
                if c.current > 0 {
                    counter = Some(c);
                }
            }
            EntryKind::Aux if want_aux && aux.is_none() => {
                let content = read_entry(path, &name, &mut entry)?;
                if !content.is_empty() {
                    aux = Some(AuxText { name, content });
                }
            }
            EntryKind::Fragment => {
                if let Some((previous, _)) = &fragment {
                    tracing::warn!(
                        zip = %path.display(),
                        previous = %previous,
                        current = %name,
                        "multiple archives in one zip, keeping the last"
                    );
                }
                fragment = Some((name, entry.size()));
            }
            EntryKind::Aux | EntryKind::Other => {}
        }
    }

    let counter = match counter {
        Some(c) if c.total > 0 => c,
        _ => {
            return Err(ArchiveSetError::NoCounter {
                path: path.to_path_buf(),
            })
        }
    };
    let Some((name, size)) = fragment else {
        return Err(ArchiveSetError::NoFragment {
            path: path.to_path_buf(),
        });
    };

    Ok((
        ArchiveFragment {
            container: path.to_path_buf(),
            name,
            size,
            current: counter.current,
            total: counter.total,
        },
        aux,
    ))
}

fn read_entry(path: &Path, name: &str, entry: &mut impl Read) -> Result<Vec<u8>, ArchiveSetError> {
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|source| ArchiveSetError::ReadEntry {
            path: path.to_path_buf(),
            entry: name.to_string(),
            source,
        })?;
    Ok(content)
}
