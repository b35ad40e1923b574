//! Volume counters (`[01/05]`, `(3|8)`, `{05/12}`) and fragment names.

use once_cell::sync::Lazy;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

static COUNTER_RE: Lazy<BytesRegex> = Lazy::new(|| {
    BytesRegex::new(r"[\[\](){}]([0-9]+)[/|]([0-9]+)[\[\](){}]").expect("counter regex")
});

/// Lowercased extension including the dot, e.g. `.r00`.
static FRAGMENT_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.([rst][0-9]+|rar)$").expect("fragment regex"));

/// `current` of `total` volumes, as declared by a counter entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeCounter {
    pub current: u32,
    pub total: u32,
}

/// First counter in `content`. `None` when nothing matches or a number does
/// not fit.
pub fn parse_counter(content: &[u8]) -> Option<VolumeCounter> {
    let caps = COUNTER_RE.captures(content)?;
    let number = |i: usize| -> Option<u32> { std::str::from_utf8(&caps[i]).ok()?.parse().ok() };
    Some(VolumeCounter {
        current: number(1)?,
        total: number(2)?,
    })
}

/// How an entry inside a container is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// `.diz` description carrying the volume counter.
    Counter,
    /// `.nfo` text.
    Aux,
    /// Split-archive payload: `.rar`, `.rNN`, `.sNN`, `.tNN`.
    Fragment,
    Other,
}

pub fn classify(entry_name: &str) -> EntryKind {
    let ext = match entry_name.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('/') => format!(".{}", ext.to_ascii_lowercase()),
        _ => return EntryKind::Other,
    };
    match ext.as_str() {
        ".diz" => EntryKind::Counter,
        ".nfo" => EntryKind::Aux,
        e if FRAGMENT_EXT_RE.is_match(e) => EntryKind::Fragment,
        _ => EntryKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_styles() {
        assert_eq!(
            parse_counter(b"test [01/05]"),
            Some(VolumeCounter { current: 1, total: 5 })
        );
        assert_eq!(
            parse_counter(b"(3|8) and later [9/9]"),
            Some(VolumeCounter { current: 3, total: 8 })
        );
        assert_eq!(
            parse_counter(b"GRP {05/12} 2024"),
            Some(VolumeCounter { current: 5, total: 12 })
        );
    }

    #[test]
    fn no_counter_cases() {
        assert_eq!(parse_counter(b"no archive count"), None);
        assert_eq!(parse_counter(b""), None);
        assert_eq!(parse_counter(b"test [01/XX]"), None);
        assert_eq!(parse_counter(b"test [XX/02]"), None);
        assert_eq!(parse_counter(b"[1/99999999999]"), None);
    }

    #[test]
    fn counter_in_non_utf8_bytes() {
        let mut content = vec![0xff, 0xfe, b' '];
        content.extend_from_slice(b"[2/3]");
        assert_eq!(
            parse_counter(&content),
            Some(VolumeCounter { current: 2, total: 3 })
        );
    }

    #[test]
    fn entry_classification() {
        assert_eq!(classify("FILE_ID.DIZ"), EntryKind::Counter);
        assert_eq!(classify("grp.nfo"), EntryKind::Aux);
        assert_eq!(classify("archive.rar"), EntryKind::Fragment);
        assert_eq!(classify("archive.r00"), EntryKind::Fragment);
        assert_eq!(classify("archive.S12"), EntryKind::Fragment);
        assert_eq!(classify("archive.t7"), EntryKind::Fragment);
        assert_eq!(classify("archive.u00"), EntryKind::Other);
        assert_eq!(classify("archive.rarx"), EntryKind::Other);
        assert_eq!(classify("README"), EntryKind::Other);
        assert_eq!(classify("dir.rar/readme"), EntryKind::Other);
    }
}
