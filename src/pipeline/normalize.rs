//! Text normalization: strip surrounding whitespace and bound the length.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;

/// Text that is trimmed and at most the configured number of characters long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl Deref for NormalizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim `raw` and keep at most `max_chars` characters.
///
/// Truncation counts characters, not bytes, and never splits a code point.
/// Whitespace exposed at the cut is trimmed as well.
pub fn normalize(raw: &str, max_chars: usize) -> NormalizedText {
    let trimmed = raw.trim();
    let truncated = match trimmed.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => trimmed[..byte_idx].trim_end(),
        None => trimmed,
    };
    NormalizedText(truncated.to_string())
}

/// Take at most `max_chars` characters, returning whether anything was cut.
pub(crate) fn take_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_whitespace() {
        assert_eq!(normalize("  hello world \n", 100).as_str(), "hello world");
    }

    #[test]
    fn test_truncates_to_max() {
        let text = "abcdefghij".repeat(10);
        let normalized = normalize(&text, 25);
        assert_eq!(normalized.char_len(), 25);
        assert_eq!(normalized.as_str(), &text[..25]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let normalized = normalize("ééééé", 3);
        assert_eq!(normalized.as_str(), "ééé");
    }

    #[test]
    fn test_cut_whitespace_is_trimmed() {
        let normalized = normalize("abc   def", 5);
        assert_eq!(normalized.as_str(), "abc");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize("", 5000).is_empty());
        assert!(normalize(" \t\n ", 5000).is_empty());
    }

    #[test]
    fn test_bounded_and_idempotent_over_strip() {
        let samples = [
            "",
            "   padded   ",
            "A. B. C. D.",
            "  line one\nline two  \n\n",
            "ümlaut and ß in a long sentence that keeps going",
        ];
        for sample in samples {
            for max in [1, 4, 10, 5000] {
                let normalized = normalize(sample, max);
                assert!(normalized.char_len() <= max);
                assert_eq!(normalized, normalize(sample.trim(), max));
                assert_eq!(normalized.as_str(), normalized.trim());
            }
        }
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("hello", 10), ("hello", false));
        assert_eq!(take_chars("hello", 3), ("hel", true));
        assert_eq!(take_chars("hello", 5), ("hello", false));
    }
}
