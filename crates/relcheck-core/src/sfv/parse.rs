//! Manifest parsing and entry resolution.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use super::SfvError;

/// `<name><blanks><8 hex>` per line, optionally followed by a `;` comment.
/// Names may contain spaces. Lines starting with `;` (after leading blanks)
/// never match.
static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*([^;\s][^\r\n]*?)[ \t]+([0-9A-Fa-f]{8})[ \t]*(?:;[^\r\n]*)?\r?$")
        .expect("sfv entry regex")
});

/// One manifest line resolved against the manifest's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfvEntry {
    /// Filename as written in the manifest.
    pub name: String,
    pub crc: u32,
    pub path: PathBuf,
    /// On-disk size at resolution time.
    pub size: u64,
}

/// `(name, crc)` pairs in manifest order.
pub fn parse_manifest(text: &str) -> Vec<(String, u32)> {
    ENTRY_RE
        .captures_iter(text)
        .filter_map(|c| {
            let crc = u32::from_str_radix(&c[2], 16).ok()?;
            Some((c[1].to_string(), crc))
        })
        .collect()
}

/// Reads `manifest` and resolves every entry relative to its directory.
/// A listed file that cannot be stat'ed fails the whole manifest.
pub fn load_manifest(manifest: &Path) -> Result<Vec<SfvEntry>, SfvError> {
    let bytes = std::fs::read(manifest).map_err(|source| SfvError::Read {
        path: manifest.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let pairs = parse_manifest(&text);
    if pairs.is_empty() {
        return Err(SfvError::Empty {
            path: manifest.to_path_buf(),
        });
    }

    let base = manifest.parent().unwrap_or(Path::new(""));
    pairs
        .into_iter()
        .map(|(name, crc)| {
            let path = base.join(&name);
            let meta = std::fs::metadata(&path).map_err(|source| SfvError::MissingFile {
                manifest: manifest.to_path_buf(),
                name: name.clone(),
                source,
            })?;
            Ok(SfvEntry {
                name,
                crc,
                path,
                size: meta.len(),
            })
        })
        .collect()
}

/// Sum of entry sizes, used to size the progress tracker.
pub fn total_size(entries: &[SfvEntry]) -> u64 {
    entries.iter().map(|e| e.size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_and_skips_comments() {
        let text = "; generated by cksfv\n\
                    ;test.r00 00000000\n\
                    test.rar D61538EA\n\
                    \n   test.r00\t\tfded8a18\r\n\
                    garbage line\n";
        assert_eq!(
            parse_manifest(text),
            vec![
                ("test.rar".to_string(), 0xd61538ea),
                ("test.r00".to_string(), 0xfded8a18),
            ]
        );
    }

    #[test]
    fn names_may_contain_spaces() {
        let got = parse_manifest("My File 01.mkv 0000abcd\n");
        assert_eq!(got, vec![("My File 01.mkv".to_string(), 0xabcd)]);
    }

    #[test]
    fn trailing_comment_after_crc() {
        let got = parse_manifest("test.rar d61538ea ; signed\ntest.r00 fded8a18;x\n");
        assert_eq!(
            got,
            vec![
                ("test.rar".to_string(), 0xd61538ea),
                ("test.r00".to_string(), 0xfded8a18),
            ]
        );
    }

    #[test]
    fn short_or_long_crc_is_not_an_entry() {
        assert!(parse_manifest("a.rar abc\nb.rar 123456789\n").is_empty());
    }

    #[test]
    fn load_resolves_against_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.rar"), b"test-content\n").unwrap();
        let manifest = dir.path().join("test.sfv");
        std::fs::write(&manifest, "test.rar d61538ea\n").unwrap();

        let entries = load_manifest(&manifest).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, dir.path().join("test.rar"));
        assert_eq!(entries[0].size, 13);
        assert_eq!(entries[0].crc, 3_591_715_050);
        assert_eq!(total_size(&entries), 13);
    }

    #[test]
    fn empty_and_missing_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("empty.sfv");
        std::fs::write(&manifest, "; nothing here\n").unwrap();
        assert!(matches!(
            load_manifest(&manifest).unwrap_err(),
            SfvError::Empty { .. }
        ));

        std::fs::write(&manifest, "gone.rar 00000000\n").unwrap();
        match load_manifest(&manifest).unwrap_err() {
            SfvError::MissingFile { name, .. } => assert_eq!(name, "gone.rar"),
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            load_manifest(&dir.path().join("absent.sfv")).unwrap_err(),
            SfvError::Read { .. }
        ));
    }
}
