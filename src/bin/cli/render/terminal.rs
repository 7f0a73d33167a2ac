use batanki_lib::cards::{CardKind, Flashcard};
use batanki_lib::pipeline::Chunk;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

const WRAP_WIDTH: usize = 80;

fn kind_color(kind: CardKind) -> &'static str {
    match kind {
        CardKind::Basic => Color::BLUE,
        CardKind::Cloze => Color::MAGENTA,
        CardKind::Mcq => Color::YELLOW,
        CardKind::Reverse => Color::CYAN,
        CardKind::Memo => Color::GREEN,
        CardKind::ImageOcclusion => Color::GRAY,
    }
}

/// Wrap in a color when enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Render one card as a numbered block
pub fn render_card(number: usize, card: &Flashcard, use_color: bool) -> String {
    let kind = card.kind();
    let mut lines = vec![format!(
        "{} {}",
        paint(&format!("#{}", number), Color::BOLD, use_color),
        paint(&format!("[{}]", kind.label()), kind_color(kind), use_color)
    )];

    lines.extend(wrap_lines(card.prompt(), "  Q: ", WRAP_WIDTH));
    for option in card.lettered_options() {
        lines.extend(wrap_lines(&option, "     ", WRAP_WIDTH));
    }

    let answer = wrap_lines(card.answer(), "  A: ", WRAP_WIDTH);
    if use_color {
        lines.extend(answer.iter().map(|l| paint(l, Color::DIM, true)));
    } else {
        lines.extend(answer);
    }

    lines.join("\n")
}

/// Render one chunk with its sentences listed
pub fn render_chunk(chunk: &Chunk, use_color: bool) -> String {
    let mut lines = vec![paint(
        &format!("Chunk {} ({} sentences)", chunk.index + 1, chunk.sentences.len()),
        Color::BOLD,
        use_color,
    )];
    for sentence in &chunk.sentences {
        lines.extend(wrap_lines(sentence, "  - ", WRAP_WIDTH));
    }
    lines.join("\n")
}

/// Simple word-wrapping for terminal output. Continuation lines are
/// indented to the width of `prefix`.
fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let indent = " ".repeat(prefix.chars().count());
    let effective_width = max_width.saturating_sub(indent.len());

    for line in text.lines() {
        let lead = if lines.is_empty() { prefix } else { indent.as_str() };
        if line.chars().count() <= effective_width {
            lines.push(format!("{}{}", lead, line));
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                let lead = if lines.is_empty() { prefix } else { indent.as_str() };
                lines.push(format!("{}{}", lead, current_line));
                current_line = word.to_string();
            }
        }
        if !current_line.is_empty() {
            let lead = if lines.is_empty() { prefix } else { indent.as_str() };
            lines.push(format!("{}{}", lead, current_line));
        }
    }

    if lines.is_empty() {
        lines.push(prefix.trim_end().to_string());
    }

    lines
}
