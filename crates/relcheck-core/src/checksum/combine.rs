//! CRC32 combination: CRC32(A || B) from CRC32(A), CRC32(B) and len(B).

use crc32fast::Hasher;

use super::plan::ChunkResult;

/// CRC32 of the concatenation `prefix || suffix`, given only the two CRCs and
/// the suffix length. Neither input is re-read.
pub fn crc32_combine(prefix_crc: u32, suffix_crc: u32, suffix_len: u64) -> u32 {
    let mut acc = Hasher::new_with_initial(prefix_crc);
    acc.combine(&Hasher::new_with_initial_len(suffix_crc, suffix_len));
    acc.finalize()
}

/// Folds chunk CRCs left to right. `chunks` must be in ascending offset order;
/// the fold starts from the CRC of the empty input (0).
pub fn fold_chunks<'a, I>(chunks: I) -> u32
where
    I: IntoIterator<Item = &'a ChunkResult>,
{
    chunks
        .into_iter()
        .fold(0u32, |acc, c| crc32_combine(acc, c.crc, c.len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_matches_whole_input() {
        let (a, b) = (b"hello ".as_slice(), b"world".as_slice());
        let combined = crc32_combine(crc32fast::hash(a), crc32fast::hash(b), b.len() as u64);
        assert_eq!(combined, crc32fast::hash(b"hello world"));
    }

    #[test]
    fn combine_with_empty_sides() {
        let crc = crc32fast::hash(b"payload");
        assert_eq!(crc32_combine(crc, 0, 0), crc);
        assert_eq!(crc32_combine(0, crc, 7), crc);
    }

    #[test]
    fn combine_is_order_sensitive() {
        let a = crc32fast::hash(b"abc");
        let b = crc32fast::hash(b"xyz");
        assert_ne!(crc32_combine(a, b, 3), crc32_combine(b, a, 3));
    }

    #[test]
    fn fold_chunks_in_offset_order() {
        let data: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        let chunks: Vec<ChunkResult> = data
            .chunks(999)
            .enumerate()
            .map(|(index, part)| ChunkResult {
                index,
                crc: crc32fast::hash(part),
                len: part.len() as u64,
            })
            .collect();
        assert_eq!(fold_chunks(&chunks), crc32fast::hash(&data));
        assert_eq!(fold_chunks(&[]), 0);
    }
}
