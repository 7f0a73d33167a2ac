//! HTML to plain text for pasted notes and XHTML documents.

use regex::Regex;

/// Strip markup and decode entities, keeping one line per block element.
///
/// Script and style bodies are dropped; blank lines are removed.
pub fn strip_html(html: &str) -> String {
    let script = Regex::new(r"(?is)<(?:script|style)\b.*?</(?:script|style)\s*>").unwrap();
    let line_break = Regex::new(r"(?i)<br\s*/?>").unwrap();
    let block_end = Regex::new(r"(?i)</(?:p|div|h[1-6]|li|tr|blockquote|title|section)\s*>").unwrap();
    let tag = Regex::new(r"<[^>]*>").unwrap();

    let text = script.replace_all(html, "");
    let text = line_break.replace_all(&text, "\n");
    let text = block_end.replace_all(&text, "\n");
    let text = tag.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text);

    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
