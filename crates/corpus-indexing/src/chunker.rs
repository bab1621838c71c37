//! Word-window chunking.
//!
//! Text is split on whitespace and cut into fixed-size word windows that
//! overlap by a configured amount. The window starts advance by
//! `window - overlap` words, so the same input always yields the same
//! chunks and chunk ids stay stable across runs.

use crate::error::IndexingError;

/// Default words per chunk
pub const DEFAULT_WINDOW: usize = 256;
/// Default words shared between consecutive chunks
pub const DEFAULT_OVERLAP: usize = 40;

/// Sliding word-window chunker.
#[derive(Debug, Clone)]
pub struct Chunker {
    window: usize,
    overlap: usize,
}

impl Chunker {
    /// Build a chunker. The overlap must be strictly smaller than the
    /// window or the window would never advance.
    pub fn new(window: usize, overlap: usize) -> Result<Self, IndexingError> {
        if window == 0 {
            return Err(IndexingError::Config(
                "chunk window must be at least 1 word".to_string(),
            ));
        }
        if overlap >= window {
            return Err(IndexingError::Config(format!(
                "chunk overlap ({overlap}) must be smaller than window ({window})"
            )));
        }
        Ok(Self { window, overlap })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Words between consecutive window starts.
    pub fn stride(&self) -> usize {
        self.window - self.overlap
    }

    /// Split text into overlapping word windows. Whitespace runs collapse
    /// to single spaces; empty or whitespace-only text yields no chunks.
    /// The final chunk keeps whatever words remain past the last full
    /// window.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let stride = self.stride();
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.window).min(words.len());
            chunks.push(words[start..end].join(" "));
            start += stride;
        }
        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(count: usize) -> String {
        (0..count).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(Chunker::new(0, 0), Err(IndexingError::Config(_))));
        assert!(matches!(Chunker::new(10, 10), Err(IndexingError::Config(_))));
        assert!(matches!(Chunker::new(10, 15), Err(IndexingError::Config(_))));
        assert!(Chunker::new(10, 9).is_ok());
    }

    #[test]
    fn test_default_stride() {
        let chunker = Chunker::default();
        assert_eq!(chunker.window(), 256);
        assert_eq!(chunker.overlap(), 40);
        assert_eq!(chunker.stride(), 216);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = Chunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  ").is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("alpha beta gamma");
        assert_eq!(chunks, vec!["alpha beta gamma".to_string()]);
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("alpha\n\nbeta\t gamma");
        assert_eq!(chunks, vec!["alpha beta gamma".to_string()]);
    }

    #[test]
    fn test_300_words_two_chunks_second_starts_at_stride() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk(&numbered_words(300));

        assert_eq!(chunks.len(), 2);
        let first: Vec<&str> = chunks[0].split(' ').collect();
        let second: Vec<&str> = chunks[1].split(' ').collect();
        assert_eq!(first.len(), 256);
        assert_eq!(first[0], "w0");
        assert_eq!(first[255], "w255");
        // Second window starts one stride in and runs to the end
        assert_eq!(second[0], "w216");
        assert_eq!(second.len(), 300 - 216);
        assert_eq!(second[second.len() - 1], "w299");
    }

    #[test]
    fn test_overlap_words_shared_between_chunks() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk(&numbered_words(300));

        let first: Vec<&str> = chunks[0].split(' ').collect();
        let second: Vec<&str> = chunks[1].split(' ').collect();
        // Words 216..256 appear at the tail of the first chunk and the
        // head of the second.
        assert_eq!(&first[216..256], &second[0..40]);
    }

    #[test]
    fn test_exact_window_length() {
        let chunker = Chunker::new(4, 1).unwrap();
        // 4 words, stride 3: windows start at 0 and 3
        let chunks = chunker.chunk("a b c d");
        assert_eq!(chunks, vec!["a b c d".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_stride_exact_multiple() {
        let chunker = Chunker::new(4, 1).unwrap();
        // 3 words fit inside one window
        let chunks = chunker.chunk("a b c");
        assert_eq!(chunks, vec!["a b c".to_string()]);
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let chunker = Chunker::default();
        let text = numbered_words(1000);
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn test_chunk_count_formula() {
        let chunker = Chunker::default();
        for &len in &[1usize, 215, 216, 217, 256, 300, 432, 433, 1000] {
            let chunks = chunker.chunk(&numbered_words(len));
            let expected = len.div_ceil(chunker.stride());
            assert_eq!(chunks.len(), expected, "word count {len}");
        }
    }
}
