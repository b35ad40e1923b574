//! Decoded shape of a remote release record.

use serde::{Deserialize, Serialize};

/// Checksums an external database recorded for a release. Only the archived
/// file list is consumed; other fields of the API response are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub name: String,
    #[serde(rename = "archived-files", default)]
    pub archived_files: Vec<ArchivedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedFile {
    pub name: String,
    pub size: i64,
    /// CRC32 as hex, e.g. `"d61538ea"`.
    pub crc: String,
}

impl ArchivedFile {
    /// Declared CRC32. Shorter hex strings are zero-extended on the left.
    pub fn crc32(&self) -> Result<u32, hex::FromHexError> {
        let digits = self.crc.trim();
        let padded;
        let digits = if !digits.is_empty() && digits.len() < 8 {
            padded = format!("{:0>8}", digits);
            padded.as_str()
        } else {
            digits
        };
        let mut bytes = [0u8; 4];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(u32::from_be_bytes(bytes))
    }
}

impl RemoteRecord {
    /// Sum of declared sizes (negative sizes count as 0).
    pub fn total_size(&self) -> u64 {
        self.archived_files
            .iter()
            .map(|f| u64::try_from(f.size).unwrap_or(0))
            .sum()
    }
}
