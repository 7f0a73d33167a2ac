//! Sentence chunking.
//!
//! Text is split on Unicode sentence boundaries (UAX #29) and the sentences
//! are grouped, in order, into fixed-size chunks. Every sentence lands in
//! exactly one chunk; only the last chunk may be short.

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// A group of consecutive sentences used as the seed for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Position of this chunk within the text
    pub index: usize,
    /// The sentences, trimmed, in source order
    pub sentences: Vec<String>,
    /// Sentences joined with single spaces
    pub text: String,
}

/// Split text into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split text into sentence groups of `group_size`.
///
/// A `group_size` of zero is treated as one.
pub fn chunk_text(text: &str, group_size: usize) -> Chunks<'_> {
    Chunks {
        sentences: split_sentences(text),
        group_size: group_size.max(1),
    }
}

/// The sentence partition of a text.
///
/// Chunk strings are built lazily on iteration; `iter()` can be called any
/// number of times and always starts from the first chunk.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    sentences: Vec<&'a str>,
    group_size: usize,
}

impl<'a> Chunks<'a> {
    pub fn iter(&self) -> ChunkIter<'_> {
        ChunkIter {
            groups: self.sentences.chunks(self.group_size),
            index: 0,
        }
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Number of chunks: `ceil(sentence_count / group_size)`
    pub fn len(&self) -> usize {
        self.sentences.len().div_ceil(self.group_size)
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

impl<'s, 'a> IntoIterator for &'s Chunks<'a> {
    type Item = Chunk;
    type IntoIter = ChunkIter<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct ChunkIter<'s> {
    groups: std::slice::Chunks<'s, &'s str>,
    index: usize,
}

impl Iterator for ChunkIter<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let group = self.groups.next()?;
        let chunk = Chunk {
            index: self.index,
            sentences: group.iter().map(|s| s.to_string()).collect(),
            text: group.join(" "),
        };
        self.index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.groups.size_hint()
    }
}

impl ExactSizeIterator for ChunkIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Rust is fast. Is it safe? Yes!  ");
        assert_eq!(sentences, vec!["Rust is fast.", "Is it safe?", "Yes!"]);
    }

    #[test]
    fn test_pairs_of_letters() {
        let chunks = chunk_text("A. B. C. D.", 2);
        let texts: Vec<String> = chunks.iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["A. B.", "C. D."]);
    }

    #[test]
    fn test_last_chunk_may_be_short() {
        let text = "One. Two. Three. Four. Five.";
        let chunks = chunk_text(text, 3);
        let collected: Vec<Chunk> = chunks.iter().collect();

        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].sentences.len(), 3);
        assert_eq!(collected[1].sentences, vec!["Four.", "Five."]);
        assert_eq!(collected[1].index, 1);
    }

    #[test]
    fn test_chunk_count_formula() {
        let text = "S1 here. S2 here. S3 here. S4 here. S5 here. S6 here. S7 here.";
        for group_size in 1..=8 {
            let chunks = chunk_text(text, group_size);
            let expected = (chunks.sentence_count() + group_size - 1) / group_size;
            assert_eq!(chunks.len(), expected);
            assert_eq!(chunks.iter().count(), expected);
        }
    }

    #[test]
    fn test_partition_is_lossless() {
        let text = "First point. Second point! Third point? Fourth point. Fifth.";
        let chunks = chunk_text(text, 2);

        let rejoined: Vec<String> = chunks
            .iter()
            .flat_map(|chunk| chunk.sentences.into_iter())
            .collect();
        let original: Vec<String> = split_sentences(text).iter().map(|s| s.to_string()).collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_iteration_restarts() {
        let chunks = chunk_text("A. B. C.", 2);
        let first: Vec<Chunk> = chunks.iter().collect();
        let second: Vec<Chunk> = (&chunks).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let chunks = chunk_text("   ", 3);
        assert!(chunks.is_empty());
        assert_eq!(chunks.len(), 0);
        assert_eq!(chunks.iter().next(), None);
    }

    #[test]
    fn test_zero_group_size_treated_as_one() {
        let chunks = chunk_text("A. B.", 0);
        assert_eq!(chunks.group_size(), 1);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_text_without_terminator_is_one_sentence() {
        let chunks = chunk_text("no punctuation at all", 3);
        let collected: Vec<Chunk> = chunks.iter().collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].text, "no punctuation at all");
    }
}
