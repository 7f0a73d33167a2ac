//! Data models for generated flashcards

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Letters used to label multiple-choice options, in order
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Card kind, used both as the assembly policy and as the export type label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CardKind {
    /// Simple question and answer
    #[default]
    Basic,
    /// Fill-in-the-blank style
    Cloze,
    /// Multiple choice with four lettered options
    Mcq,
    /// Reviewed answer-first
    Reverse,
    /// Prompt for a detailed explanation
    Memo,
    /// Hidden part of an image (placeholder content only)
    ImageOcclusion,
}

impl CardKind {
    pub const ALL: [CardKind; 6] = [
        CardKind::Basic,
        CardKind::Cloze,
        CardKind::Mcq,
        CardKind::Reverse,
        CardKind::Memo,
        CardKind::ImageOcclusion,
    ];

    /// Label written to the `type` column / key of exports
    pub fn label(self) -> &'static str {
        match self {
            CardKind::Basic => "Basic",
            CardKind::Cloze => "Cloze",
            CardKind::Mcq => "MCQ",
            CardKind::Reverse => "Reverse",
            CardKind::Memo => "Memo",
            CardKind::ImageOcclusion => "Image Occlusion",
        }
    }

    /// Stable position of the kind, used to derive per-kind ids
    pub fn ordinal(self) -> i64 {
        match self {
            CardKind::Basic => 0,
            CardKind::Cloze => 1,
            CardKind::Mcq => 2,
            CardKind::Reverse => 3,
            CardKind::Memo => 4,
            CardKind::ImageOcclusion => 5,
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "basic" => Ok(CardKind::Basic),
            "cloze" => Ok(CardKind::Cloze),
            "mcq" | "multiplechoice" => Ok(CardKind::Mcq),
            "reverse" => Ok(CardKind::Reverse),
            "memo" => Ok(CardKind::Memo),
            "imageocclusion" => Ok(CardKind::ImageOcclusion),
            _ => Err(format!("unknown card kind: {}", s)),
        }
    }
}

/// A single flashcard record.
///
/// Serialized with a `type` tag and per-kind field names, so the JSON export
/// reads `{"type": "MCQ", "question": ..., "options": [...], "answer": "B"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Flashcard {
    Basic {
        front: String,
        back: String,
    },
    Cloze {
        text: String,
        answer: String,
    },
    #[serde(rename = "MCQ")]
    Mcq {
        question: String,
        /// Option texts, lettered A-D by position
        options: Vec<String>,
        /// Letter of the correct option
        answer: String,
    },
    Reverse {
        front: String,
        back: String,
    },
    Memo {
        front: String,
        back: String,
    },
    #[serde(rename = "Image Occlusion")]
    ImageOcclusion {
        front: String,
        back: String,
    },
}

impl Flashcard {
    pub fn kind(&self) -> CardKind {
        match self {
            Flashcard::Basic { .. } => CardKind::Basic,
            Flashcard::Cloze { .. } => CardKind::Cloze,
            Flashcard::Mcq { .. } => CardKind::Mcq,
            Flashcard::Reverse { .. } => CardKind::Reverse,
            Flashcard::Memo { .. } => CardKind::Memo,
            Flashcard::ImageOcclusion { .. } => CardKind::ImageOcclusion,
        }
    }

    /// Question / front side
    pub fn prompt(&self) -> &str {
        match self {
            Flashcard::Basic { front, .. }
            | Flashcard::Reverse { front, .. }
            | Flashcard::Memo { front, .. }
            | Flashcard::ImageOcclusion { front, .. } => front,
            Flashcard::Cloze { text, .. } => text,
            Flashcard::Mcq { question, .. } => question,
        }
    }

    /// Answer / back side
    pub fn answer(&self) -> &str {
        match self {
            Flashcard::Basic { back, .. }
            | Flashcard::Reverse { back, .. }
            | Flashcard::Memo { back, .. }
            | Flashcard::ImageOcclusion { back, .. } => back,
            Flashcard::Cloze { answer, .. } | Flashcard::Mcq { answer, .. } => answer,
        }
    }

    /// Multiple-choice options, empty for every other kind
    pub fn options(&self) -> &[String] {
        match self {
            Flashcard::Mcq { options, .. } => options,
            _ => &[],
        }
    }

    /// Options prefixed with their letter, e.g. `"B. Mistral"`
    pub fn lettered_options(&self) -> Vec<String> {
        self.options()
            .iter()
            .zip(OPTION_LETTERS)
            .map(|(option, letter)| format!("{}. {}", letter, option))
            .collect()
    }

    /// Build a card from its kind-independent parts.
    ///
    /// `options` is only used for MCQ cards and ignored otherwise.
    pub fn from_parts(kind: CardKind, prompt: String, answer: String, options: Vec<String>) -> Self {
        match kind {
            CardKind::Basic => Flashcard::Basic { front: prompt, back: answer },
            CardKind::Cloze => Flashcard::Cloze { text: prompt, answer },
            CardKind::Mcq => Flashcard::Mcq { question: prompt, options, answer },
            CardKind::Reverse => Flashcard::Reverse { front: prompt, back: answer },
            CardKind::Memo => Flashcard::Memo { front: prompt, back: answer },
            CardKind::ImageOcclusion => Flashcard::ImageOcclusion { front: prompt, back: answer },
        }
    }

    /// Every field populated; MCQ cards also need four options and an answer
    /// letter that points at one of them.
    pub fn is_complete(&self) -> bool {
        if self.prompt().trim().is_empty() || self.answer().trim().is_empty() {
            return false;
        }
        match self {
            Flashcard::Mcq { options, answer, .. } => {
                options.len() == OPTION_LETTERS.len()
                    && options.iter().all(|o| !o.trim().is_empty())
                    && OPTION_LETTERS
                        .iter()
                        .any(|letter| answer.as_str() == letter.to_string())
            }
            _ => true,
        }
    }
}

/// An ordered collection of cards destined for one export call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub name: String,
    pub cards: Vec<Flashcard>,
}

impl Deck {
    pub fn new(name: impl Into<String>, cards: Vec<Flashcard>) -> Self {
        Self {
            name: name.into(),
            cards,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Index of the first card with an empty field, if any
    pub fn first_incomplete(&self) -> Option<usize> {
        self.cards.iter().position(|card| !card.is_complete())
    }
}
