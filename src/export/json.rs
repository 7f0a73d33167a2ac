//! Structured text export: the cards as a JSON array, four-space indented.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::cards::{Deck, Flashcard};

use super::{ExportError, Result};

pub fn export_json(deck: &Deck) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    deck.cards.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| ExportError::Malformed(e.to_string()))
}

pub fn parse_json(content: &str) -> Result<Vec<Flashcard>> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::demo_cards;

    #[test]
    fn test_array_of_mappings_with_indent() {
        let deck = Deck::new(
            "d",
            vec![Flashcard::Basic {
                front: "Q".to_string(),
                back: "A".to_string(),
            }],
        );
        let json = export_json(&deck).unwrap();
        assert_eq!(
            json,
            "[\n    {\n        \"type\": \"Basic\",\n        \"front\": \"Q\",\n        \"back\": \"A\"\n    }\n]"
        );
    }

    #[test]
    fn test_key_order_is_stable() {
        let deck = Deck::new("d", demo_cards());
        let first = export_json(&deck).unwrap();
        let second = export_json(&deck.clone()).unwrap();
        assert_eq!(first, second);

        let mcq_start = first.find("\"MCQ\"").unwrap();
        let question = first[mcq_start..].find("\"question\"").unwrap();
        let options = first[mcq_start..].find("\"options\"").unwrap();
        let answer = first[mcq_start..].find("\"answer\"").unwrap();
        assert!(question < options && options < answer);
    }

    #[test]
    fn test_parse_back() {
        let deck = Deck::new("d", demo_cards());
        let parsed = parse_json(&export_json(&deck).unwrap()).unwrap();
        assert_eq!(parsed, deck.cards);
    }

    #[test]
    fn test_empty_deck() {
        let deck = Deck::new("d", Vec::new());
        assert_eq!(export_json(&deck).unwrap(), "[]");
    }
}
