//! Delimited text export.
//!
//! One header row, then one row per card. Fields are quoted as needed by the
//! csv writer. MCQ options go in the `details` column joined with `;`; a `;`
//! inside an option is written as `,` so the list splits back cleanly.

use crate::cards::{CardKind, Deck, Flashcard};

use super::{ExportError, Result};

pub const HEADER: [&str; 4] = ["type", "question/front", "answer/back", "details"];

/// Separator for list-valued fields inside one column
pub const LIST_SEPARATOR: char = ';';

pub fn export_csv(deck: &Deck) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for card in &deck.cards {
        let details = join_options(card.options());
        writer.write_record([
            card.kind().label(),
            card.prompt(),
            card.answer(),
            details.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Malformed(e.to_string()))
}

/// Parse a delimited export back into cards.
pub fn parse_csv(content: &str) -> Result<Vec<Flashcard>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?;
    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(ExportError::Malformed(format!(
            "unexpected header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut cards = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();

        let kind: CardKind = record
            .get(0)
            .unwrap_or("")
            .parse()
            .map_err(|e| ExportError::Malformed(format!("row {}: {}", row + 1, e)))?;

        let details = field(3);
        let options = if kind == CardKind::Mcq && !details.is_empty() {
            details.split(LIST_SEPARATOR).map(str::to_string).collect()
        } else {
            Vec::new()
        };

        cards.push(Flashcard::from_parts(kind, field(1), field(2), options));
    }

    Ok(cards)
}

fn join_options(options: &[String]) -> String {
    options
        .iter()
        .map(|option| option.replace(LIST_SEPARATOR, ","))
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR.to_string().as_str())
}
