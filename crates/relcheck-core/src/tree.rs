//! Read-only index of the files in a release.
//!
//! A release is either a directory (walked recursively) or a single file.
//! The index only records what is there; deciding which files matter is left
//! to the verifiers.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One regular file under the release root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFile {
    pub path: PathBuf,
    /// File name (lossy UTF-8).
    pub name: String,
    pub size: u64,
}

impl ReleaseFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name, size }
    }

    /// Lowercased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext.trim_start_matches('.')))
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Name of the containing directory, e.g. the release name for
    /// `Some.Release-GRP/file.mkv`.
    pub fn parent_name(&self) -> Option<String> {
        self.path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Files of one release, sorted by path.
#[derive(Debug, Clone, Default)]
pub struct ReleaseTree {
    root: PathBuf,
    files: Vec<ReleaseFile>,
}

impl ReleaseTree {
    /// Walks `root`. A single file yields a one-entry tree. Symlinks are not
    /// followed; unreadable entries below the root are skipped with a warning.
    pub fn scan(root: &Path) -> Result<Self> {
        let meta = std::fs::metadata(root)
            .with_context(|| format!("release root {}", root.display()))?;
        if meta.is_file() {
            return Ok(Self::from_files(
                root,
                vec![ReleaseFile::new(root, meta.len())],
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let size = entry
                .metadata()
                .with_context(|| format!("stat {}", entry.path().display()))?
                .len();
            files.push(ReleaseFile::new(entry.into_path(), size));
        }
        tracing::debug!(root = %root.display(), files = files.len(), "release scanned");
        Ok(Self::from_files(root, files))
    }

    /// Tree from an already-known file list.
    pub fn from_files(root: impl Into<PathBuf>, mut files: Vec<ReleaseFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            root: root.into(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[ReleaseFile] {
        &self.files
    }

    /// Files whose extension matches `ext` (case-insensitive, leading dot optional).
    pub fn files_with_extension<'a>(
        &'a self,
        ext: &'a str,
    ) -> impl Iterator<Item = &'a ReleaseFile> + 'a {
        self.files.iter().filter(move |f| f.has_extension(ext))
    }

    /// Files with extension `ext`, grouped by containing directory.
    pub fn group_by_dir(&self, ext: &str) -> BTreeMap<PathBuf, Vec<&ReleaseFile>> {
        let mut groups: BTreeMap<PathBuf, Vec<&ReleaseFile>> = BTreeMap::new();
        for f in self.files.iter().filter(|f| f.has_extension(ext)) {
            groups.entry(f.dir().to_path_buf()).or_default().push(f);
        }
        groups
    }

    /// First file named exactly `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&ReleaseFile> {
        self.files.iter().find(|f| f.name == name)
    }

}
