//! Preview summary shown next to the generated cards.

use super::normalize::take_chars;

/// `"Summary: "` followed by the first `max_chars` characters, with an
/// ellipsis when the text was longer.
pub fn summarize(text: &str, max_chars: usize) -> String {
    let (head, truncated) = take_chars(text, max_chars);
    if truncated {
        format!("Summary: {}...", head)
    } else {
        format!("Summary: {}", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_kept_whole() {
        assert_eq!(summarize("Short text.", 200), "Summary: Short text.");
    }

    #[test]
    fn test_long_text_is_cut_with_ellipsis() {
        let text = "x".repeat(250);
        let summary = summarize(&text, 200);
        assert_eq!(summary, format!("Summary: {}...", "x".repeat(200)));
    }

    #[test]
    fn test_exact_length_has_no_ellipsis() {
        let text = "y".repeat(200);
        assert_eq!(summarize(&text, 200), format!("Summary: {}", text));
    }
}
