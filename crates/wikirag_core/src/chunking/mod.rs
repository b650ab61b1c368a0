use serde::{Deserialize, Serialize};

use crate::domain::Chunk;
use crate::error::AppError;

/// Checked word-window parameters for the chunker.
///
/// Holding a `ChunkWindow` means `0 < chunk_size` and `overlap < chunk_size`,
/// so the window always advances by at least one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChunkWindow")]
pub struct ChunkWindow {
    chunk_size: usize,
    overlap: usize,
}

#[derive(Deserialize)]
struct RawChunkWindow {
    chunk_size: usize,
    overlap: usize,
}

impl TryFrom<RawChunkWindow> for ChunkWindow {
    type Error = AppError;

    fn try_from(raw: RawChunkWindow) -> Result<Self, Self::Error> {
        ChunkWindow::new(raw.chunk_size, raw.overlap)
    }
}

impl ChunkWindow {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, AppError> {
        if chunk_size == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Chunk size must be at least one word",
            ));
        }
        if overlap >= chunk_size {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Chunk overlap must be smaller than chunk size",
            )
            .with_details(format!("chunk_size={chunk_size}; overlap={overlap}")));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Split `text` into overlapping word windows.
    ///
    /// Words are whitespace-delimited and re-joined with single spaces. The last
    /// window may be shorter than `chunk_size`. Blank text yields no chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut out = Vec::with_capacity(words.len().div_ceil(self.stride()));
        let mut start = 0usize;
        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            out.push(Chunk::from_words(words[start..end].join(" ")));
            start += self.stride();
        }
        out
    }
}

/// Validate the window and split in one call.
pub fn split_into_chunks(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, AppError> {
    let window = ChunkWindow::new(chunk_size, overlap)?;
    Ok(window.split(text))
}

/// Newline-delimited paragraphs longer than `min_chars` characters, in order.
pub fn split_paragraphs(text: &str, min_chars: usize) -> Vec<&str> {
    text.lines()
        .filter(|p| p.chars().count() > min_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(Chunk::as_str).collect()
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let err = split_into_chunks("a b c", 3, 3).expect_err("overlap == size");
        assert_eq!(err.code, "CONFIG_INVALID");
        assert!(split_into_chunks("a b c", 3, 7).is_err());
        assert!(split_into_chunks("a b c", 0, 0).is_err());
    }

    #[test]
    fn empty_and_blank_text_yield_no_chunks() {
        assert!(split_into_chunks("", 5, 1).unwrap().is_empty());
        assert!(split_into_chunks(" \n\t ", 5, 1).unwrap().is_empty());
    }

    #[test]
    fn short_text_yields_single_normalized_chunk() {
        let chunks = split_into_chunks("  Albert\tEinstein \n was  here ", 150, 30).unwrap();
        assert_eq!(texts(&chunks), vec!["Albert Einstein was here"]);
    }

    #[test]
    fn windows_overlap_by_exactly_the_configured_words() {
        let text = numbered_words(10);
        let chunks = split_into_chunks(&text, 4, 1).unwrap();
        assert_eq!(
            texts(&chunks),
            vec!["w0 w1 w2 w3", "w3 w4 w5 w6", "w6 w7 w8 w9", "w9"]
        );

    }

    #[test]
    fn consecutive_full_windows_share_overlap_words() {
        let text = numbered_words(200);
        for overlap in [1, 3, 30] {
            let chunks = split_into_chunks(&text, 40, overlap).unwrap();
            for pair in chunks.windows(2) {
                let prev: Vec<&str> = pair[0].as_str().split(' ').collect();
                let next: Vec<&str> = pair[1].as_str().split(' ').collect();
                if next.len() < overlap {
                    // The final window lies entirely inside the previous one.
                    assert_eq!(prev[prev.len() - next.len()..], next[..]);
                    continue;
                }
                assert_eq!(prev[prev.len() - overlap..], next[..overlap], "overlap={overlap}");
            }
        }
    }

    #[test]
    fn chunk_count_and_sizes_follow_the_stride() {
        for (n, size, overlap) in [(1, 3, 1), (7, 3, 1), (100, 10, 3), (150, 150, 30), (301, 150, 30)] {
            let window = ChunkWindow::new(size, overlap).unwrap();
            let chunks = window.split(&numbered_words(n));
            assert_eq!(chunks.len(), n.div_ceil(size - overlap), "n={n} size={size} overlap={overlap}");
            assert!(chunks.iter().all(|c| c.word_count() <= size));
            assert!(chunks.iter().all(|c| c.word_count() > 0));
        }
    }

    #[test]
    fn zero_overlap_partitions_the_words() {
        let text = numbered_words(23);
        let chunks = split_into_chunks(&text, 5, 0).unwrap();
        let rebuilt = chunks
            .iter()
            .map(Chunk::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rebuilt, text);
        assert_eq!(chunks.len(), 5);
    }

    #[test]
    fn paragraphs_are_filtered_by_character_count() {
        let text = "short\n\nexactly twenty chars\nthis line is definitely long enough\n== History ==";
        assert_eq!(
            split_paragraphs(text, 20),
            vec!["this line is definitely long enough"]
        );
        // 20 characters is not strictly greater than 20.
        assert_eq!("exactly twenty chars".chars().count(), 20);
        assert_eq!(split_paragraphs("ééééé", 4), vec!["ééééé"]);
    }

    #[test]
    fn window_deserializes_only_when_valid() {
        let ok: ChunkWindow = serde_json::from_str(r#"{"chunk_size":150,"overlap":30}"#).unwrap();
        assert_eq!(ok.stride(), 120);
        let bad = serde_json::from_str::<ChunkWindow>(r#"{"chunk_size":10,"overlap":10}"#);
        assert!(bad.is_err());
    }
}
