//! Text splitting into overlapping chunks for indexing.
//!
//! The splitter is a pure function of its input: it breaks text on paragraph,
//! line, and word boundaries (in that order of preference) and greedily merges
//! the pieces into chunks of at most `chunk_size` characters, carrying
//! `chunk_overlap` characters of trailing context into the next chunk.

use serde::{Deserialize, Serialize};

/// Separators tried in order. A piece that still exceeds the chunk size after
/// the last separator is an atomic token and is emitted as-is.
const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

/// Chunk geometry: target size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl SplitConfig {
    /// Create a new split configuration. The overlap must be smaller than the
    /// chunk size or the merge loop could never make progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        debug_assert!(chunk_overlap < chunk_size);
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Geometry used for documents and web pages.
    pub fn document() -> Self {
        Self::new(1000, 200)
    }

    /// Geometry used for audio/video transcripts.
    pub fn transcript() -> Self {
        Self::new(500, 50)
    }
}

/// Splits text into overlapping chunks.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitConfig,
}

impl TextSplitter {
    /// Create a splitter with the given geometry.
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Split text into chunks of at most `chunk_size` characters, with
    /// consecutive chunks sharing up to `chunk_overlap` characters.
    ///
    /// Deterministic; whitespace-only input yields no chunks. A single token
    /// longer than the chunk size is returned unsplit.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let Some(idx) = separators.iter().position(|sep| text.contains(sep)) else {
            // No separator applies: atomic token, even if oversized.
            return vec![text.to_string()];
        };
        let sep = separators[idx];
        let rest = &separators[idx + 1..];

        let mut chunks = Vec::new();
        let mut good: Vec<String> = Vec::new();

        for piece in text.split(sep).filter(|p| !p.is_empty()) {
            if char_len(piece) <= self.config.chunk_size {
                good.push(piece.to_string());
            } else {
                if !good.is_empty() {
                    chunks.extend(self.merge(&good, sep));
                    good.clear();
                }
                if rest.is_empty() {
                    chunks.push(piece.to_string());
                } else {
                    chunks.extend(self.split_with(piece, rest));
                }
            }
        }

        if !good.is_empty() {
            chunks.extend(self.merge(&good, sep));
        }

        chunks
    }

    /// Greedily merge pieces into chunks, keeping a tail of pieces totalling
    /// at most `chunk_overlap` characters as the start of the next chunk.
    fn merge(&self, pieces: &[String], sep: &str) -> Vec<String> {
        let sep_len = char_len(sep);
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = char_len(piece);
            let extra = if current.is_empty() { 0 } else { sep_len };

            if !current.is_empty() && total + piece_len + extra > self.config.chunk_size {
                chunks.push(current.join(sep));

                // Drop leading pieces until the carried tail fits the overlap
                // budget and leaves room for the incoming piece.
                loop {
                    let extra_now = if current.is_empty() { 0 } else { sep_len };
                    let must_pop = total > self.config.chunk_overlap
                        || (total > 0 && total + piece_len + extra_now > self.config.chunk_size);
                    if !must_pop || current.is_empty() {
                        break;
                    }
                    let first_len = char_len(current[0]);
                    total -= first_len + if current.len() > 1 { sep_len } else { 0 };
                    current.remove(0);
                }
            }

            if !current.is_empty() {
                total += sep_len;
            }
            total += piece_len;
            current.push(piece);
        }

        if !current.is_empty() {
            chunks.push(current.join(sep));
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the original text from overlapping chunks by stripping each
    /// chunk's leading overlap (the longest prefix that is a suffix of the
    /// text accumulated so far).
    fn reconstruct(chunks: &[String], sep: &str) -> String {
        let mut out = chunks[0].clone();
        for chunk in &chunks[1..] {
            let mut overlap = 0;
            for i in (1..=chunk.len()).rev() {
                if chunk.is_char_boundary(i) && out.ends_with(&chunk[..i]) {
                    overlap = i;
                    break;
                }
            }
            if overlap == chunk.len() {
                continue;
            }
            let rest = chunk[overlap..].strip_prefix(sep).unwrap_or(&chunk[overlap..]);
            out.push_str(sep);
            out.push_str(rest);
        }
        out
    }

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = TextSplitter::new(SplitConfig::new(100, 20));
        let chunks = splitter.split("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let splitter = TextSplitter::new(SplitConfig::new(100, 20));
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_word_windowing_with_overlap() {
        let splitter = TextSplitter::new(SplitConfig::new(7, 3));
        let chunks = splitter.split("aa bb cc dd ee");
        assert_eq!(chunks, vec!["aa bb", "bb cc", "cc dd", "dd ee"]);
    }

    #[test]
    fn test_chunk_length_bound() {
        let config = SplitConfig::new(50, 10);
        let splitter = TextSplitter::new(config);
        let text = "the quick brown fox jumps over the lazy dog and keeps on running \
                    through fields of barley under a wide open sky until the sun sets";
        for chunk in splitter.split(text) {
            assert!(
                chunk.chars().count() <= config.chunk_size,
                "chunk too long: {:?}",
                chunk
            );
        }
    }

    #[test]
    fn test_oversized_token_kept_whole() {
        let splitter = TextSplitter::new(SplitConfig::new(10, 2));
        let chunks = splitter.split("short pneumonoultramicroscopicsilicovolcanoconiosis end");
        assert!(chunks.contains(&"pneumonoultramicroscopicsilicovolcanoconiosis".to_string()));
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= 10
                    || *chunk == "pneumonoultramicroscopicsilicovolcanoconiosis"
            );
        }
    }

    #[test]
    fn test_reconstruction_from_overlapping_chunks() {
        let splitter = TextSplitter::new(SplitConfig::new(7, 3));
        let text = "aa bb cc dd ee";
        let chunks = splitter.split(text);
        assert_eq!(reconstruct(&chunks, " "), text);

        let splitter = TextSplitter::new(SplitConfig::new(25, 8));
        let text = "one two three four five six seven eight nine ten";
        let chunks = splitter.split(text);
        assert_eq!(reconstruct(&chunks, " "), text);
    }

    #[test]
    fn test_paragraphs_preferred_over_words() {
        let splitter = TextSplitter::new(SplitConfig::new(30, 5));
        let text = "first paragraph here\n\nsecond paragraph here\n\nthird one";
        let chunks = splitter.split(text);
        // Each paragraph fits on its own; no chunk straddles a paragraph split
        // mid-word.
        assert!(chunks.iter().all(|c| c.chars().count() <= 30));
        assert!(chunks.iter().any(|c| c.contains("first paragraph here")));
        assert!(chunks.iter().any(|c| c.contains("second paragraph here")));
    }

    #[test]
    fn test_deterministic() {
        let splitter = TextSplitter::new(SplitConfig::transcript());
        let text = "word ".repeat(500);
        assert_eq!(splitter.split(&text), splitter.split(&text));
    }

    #[test]
    fn test_transcript_and_document_configs() {
        assert_eq!(SplitConfig::document().chunk_size, 1000);
        assert_eq!(SplitConfig::document().chunk_overlap, 200);
        assert_eq!(SplitConfig::transcript().chunk_size, 500);
        assert_eq!(SplitConfig::transcript().chunk_overlap, 50);
    }
}
