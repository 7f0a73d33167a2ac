//! Card assembly: turn chunks (or a whole text) into flashcards.
//!
//! Each chunk produces exactly one card of the configured kind. When demo
//! cards are enabled, a fixed set of example cards (one per non-Basic kind)
//! is appended after the generated ones.

use unicode_segmentation::UnicodeSegmentation;

use crate::pipeline::chunker::Chunk;
use crate::pipeline::normalize::take_chars;

use super::models::{CardKind, Flashcard, OPTION_LETTERS};

/// Blank marker substituted into cloze prompts
pub const CLOZE_BLANK: &str = "___";

/// Prompt length used when a chunk has no usable leading fragment
const PROMPT_PREFIX_CHARS: usize = 80;

/// Characters of the document shown on the overview card
const OVERVIEW_CHARS: usize = 100;

/// Words shorter than this are only blanked when nothing longer exists
const MIN_CLOZE_WORD_CHARS: usize = 4;

const OVERVIEW_FRONT: &str = "What is this document about?";

const MEMO_PROMPT_PREFIX: &str = "Explain in detail:";

const MEMO_ANNOTATION: &str = "[Memo] Add your own notes and source references.";

const MCQ_QUESTION_PREFIX: &str = "Which statement is supported by this passage?";

const MCQ_DISTRACTORS: [&str; 3] = [
    "The passage does not mention this topic.",
    "The passage states the opposite.",
    "None of the above.",
];

const OCCLUSION_FRONT: &str = "Identify the hidden part of the image.";

const OCCLUSION_BACK: &str = "The occluded answer details are revealed.";

/// Builds cards for one request.
#[derive(Debug, Clone)]
pub struct CardAssembler {
    kind: CardKind,
    cloze_keywords: Vec<String>,
    include_demo_cards: bool,
}

impl CardAssembler {
    pub fn new(kind: CardKind) -> Self {
        Self {
            kind,
            cloze_keywords: Vec::new(),
            include_demo_cards: false,
        }
    }

    pub fn with_cloze_keywords(mut self, keywords: Vec<String>) -> Self {
        self.cloze_keywords = keywords;
        self
    }

    pub fn with_demo_cards(mut self, include: bool) -> Self {
        self.include_demo_cards = include;
        self
    }

    /// One card per chunk, in chunk order, followed by demo cards if enabled.
    pub fn assemble<I>(&self, chunks: I) -> Vec<Flashcard>
    where
        I: IntoIterator<Item = Chunk>,
    {
        let mut cards: Vec<Flashcard> = chunks
            .into_iter()
            .map(|chunk| self.card_for_chunk(&chunk))
            .collect();
        log::debug!("Assembled {} {} card(s)", cards.len(), self.kind);
        self.append_demo_cards(&mut cards);
        cards
    }

    /// A single overview card for the whole text, followed by demo cards if
    /// enabled. Empty text yields no overview card.
    pub fn assemble_document(&self, text: &str) -> Vec<Flashcard> {
        let mut cards = Vec::new();
        if !text.trim().is_empty() {
            cards.push(overview_card(text));
        }
        self.append_demo_cards(&mut cards);
        cards
    }

    pub fn card_for_chunk(&self, chunk: &Chunk) -> Flashcard {
        match self.kind {
            CardKind::Basic => Flashcard::Basic {
                front: leading_fragment(&chunk.text),
                back: chunk.text.clone(),
            },
            CardKind::Cloze => Flashcard::Cloze {
                text: blank_keyword(&chunk.text, &self.cloze_keywords),
                answer: chunk.text.clone(),
            },
            CardKind::Reverse => Flashcard::Reverse {
                front: leading_fragment(&chunk.text),
                back: chunk.text.clone(),
            },
            CardKind::Memo => Flashcard::Memo {
                front: format!("{} {}", MEMO_PROMPT_PREFIX, leading_fragment(&chunk.text)),
                back: format!("{}\n\n{}", chunk.text, MEMO_ANNOTATION),
            },
            CardKind::Mcq => multiple_choice(chunk),
            CardKind::ImageOcclusion => Flashcard::ImageOcclusion {
                front: OCCLUSION_FRONT.to_string(),
                back: OCCLUSION_BACK.to_string(),
            },
        }
    }

    fn append_demo_cards(&self, cards: &mut Vec<Flashcard>) {
        if self.include_demo_cards {
            cards.extend(demo_cards());
        }
    }
}

/// Fixed example cards, one of each non-Basic kind. Independent of input.
pub fn demo_cards() -> Vec<Flashcard> {
    vec![
        Flashcard::Mcq {
            question: "Which AI engine is used for summarization?".to_string(),
            options: vec![
                "Mistral".to_string(),
                "BART".to_string(),
                "GPT".to_string(),
                "T5".to_string(),
            ],
            answer: "A".to_string(),
        },
        Flashcard::Cloze {
            text: format!("BatAnki is built using {} and Python.", CLOZE_BLANK),
            answer: "Streamlit".to_string(),
        },
        Flashcard::Reverse {
            front: "What is reverse learning in BatAnki?".to_string(),
            back: "It flips Q and A for alternative recall.".to_string(),
        },
        Flashcard::Memo {
            front: "Explain the memo card functionality.".to_string(),
            back: "Provides detailed notes and source references.".to_string(),
        },
        Flashcard::ImageOcclusion {
            front: OCCLUSION_FRONT.to_string(),
            back: OCCLUSION_BACK.to_string(),
        },
    ]
}

/// Overview card: what is the document about, answered by its opening.
pub fn overview_card(text: &str) -> Flashcard {
    let (head, truncated) = take_chars(text, OVERVIEW_CHARS);
    let back = if truncated {
        format!("{}...", head)
    } else {
        head.to_string()
    };
    Flashcard::Basic {
        front: OVERVIEW_FRONT.to_string(),
        back,
    }
}

/// Text before the first period. Chunks without a period, or starting with
/// one, get a fixed-length prefix marked with an ellipsis instead.
fn leading_fragment(text: &str) -> String {
    if let Some(pos) = text.find('.') {
        let fragment = text[..pos].trim();
        if !fragment.is_empty() {
            return fragment.to_string();
        }
    }

    let (head, _) = take_chars(text.trim(), PROMPT_PREFIX_CHARS);
    format!("{}...", head.trim_end())
}

/// Replace the first occurrence of the designated keyword with the blank.
///
/// The keyword is the first configured keyword found as a whole word
/// (case-insensitive); failing that, the longest word of at least
/// `MIN_CLOZE_WORD_CHARS` characters, then the longest word of any length.
/// Ties go to the earliest word. Text without words is blanked entirely.
fn blank_keyword(text: &str, keywords: &[String]) -> String {
    let words: Vec<(usize, &str)> = text.unicode_word_indices().collect();

    let configured = keywords.iter().find_map(|keyword| {
        let keyword = keyword.to_lowercase();
        words
            .iter()
            .find(|(_, word)| word.to_lowercase() == keyword)
            .copied()
    });

    let longest = |min_chars: usize| {
        words
            .iter()
            .filter(|(_, word)| word.chars().count() >= min_chars)
            .fold(None, |best: Option<(usize, &str)>, &(offset, word)| match best {
                Some((_, current)) if current.chars().count() >= word.chars().count() => best,
                _ => Some((offset, word)),
            })
    };

    match configured
        .or_else(|| longest(MIN_CLOZE_WORD_CHARS))
        .or_else(|| longest(1))
    {
        Some((offset, word)) => format!(
            "{}{}{}",
            &text[..offset],
            CLOZE_BLANK,
            &text[offset + word.len()..]
        ),
        None => CLOZE_BLANK.to_string(),
    }
}

/// Question embedding the chunk, the chunk's leading fragment as the correct
/// option, and three fixed distractors. The correct letter rotates with the
/// chunk index.
fn multiple_choice(chunk: &Chunk) -> Flashcard {
    let correct_pos = chunk.index % OPTION_LETTERS.len();
    let mut options: Vec<String> = MCQ_DISTRACTORS.iter().map(|d| d.to_string()).collect();
    options.insert(correct_pos, leading_fragment(&chunk.text));

    Flashcard::Mcq {
        question: format!("{}\n\n\"{}\"", MCQ_QUESTION_PREFIX, chunk.text),
        options,
        answer: OPTION_LETTERS[correct_pos].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::chunker::chunk_text;

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            index,
            sentences: vec![text.to_string()],
            text: text.to_string(),
        }
    }

    #[test]
    fn test_basic_uses_first_fragment() {
        let card = CardAssembler::new(CardKind::Basic)
            .card_for_chunk(&chunk(0, "Rust has ownership. It prevents data races."));
        assert_eq!(
            card,
            Flashcard::Basic {
                front: "Rust has ownership".to_string(),
                back: "Rust has ownership. It prevents data races.".to_string(),
            }
        );
    }

    #[test]
    fn test_basic_falls_back_to_prefix() {
        let text = format!(".{}", "z".repeat(120));
        let card = CardAssembler::new(CardKind::Basic).card_for_chunk(&chunk(0, &text));
        assert_eq!(card.prompt(), format!("{}...", &text[..PROMPT_PREFIX_CHARS]));
        assert_eq!(card.answer(), text);
    }

    #[test]
    fn test_prompt_without_period_differs_from_answer() {
        let chunks = chunk_text("Is Rust memory safe? Yes it is! Really", 3);
        let cards = CardAssembler::new(CardKind::Basic).assemble(&chunks);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].prompt(), "Is Rust memory safe? Yes it is! Really...");
        assert_ne!(cards[0].prompt(), cards[0].answer());

        let long = "word ".repeat(400);
        let card = CardAssembler::new(CardKind::Reverse).card_for_chunk(&chunk(0, long.trim()));
        assert_eq!(card.prompt().chars().count(), PROMPT_PREFIX_CHARS - 1 + 3);
        assert!(card.prompt().len() < card.answer().len());
        assert_ne!(card.prompt(), card.answer());
    }

    #[test]
    fn test_reverse_matches_basic_derivation() {
        let c = chunk(0, "Borrowing is temporary access. It ends at scope exit.");
        let card = CardAssembler::new(CardKind::Reverse).card_for_chunk(&c);
        assert_eq!(card.kind(), CardKind::Reverse);
        assert_eq!(card.prompt(), "Borrowing is temporary access");
        assert_eq!(card.answer(), c.text);
    }

    #[test]
    fn test_cloze_blanks_longest_word() {
        let card = CardAssembler::new(CardKind::Cloze)
            .card_for_chunk(&chunk(0, "Mistral is the engine."));
        assert_eq!(card.prompt(), "___ is the engine.");
        assert_eq!(card.answer(), "Mistral is the engine.");

        let tie = CardAssembler::new(CardKind::Cloze)
            .card_for_chunk(&chunk(0, "Rust traits and enums."));
        assert_eq!(tie.prompt(), "Rust ___ and enums.");
    }

    #[test]
    fn test_cloze_prefers_configured_keyword() {
        let card = CardAssembler::new(CardKind::Cloze)
            .with_cloze_keywords(vec!["absent".to_string(), "IS".to_string()])
            .card_for_chunk(&chunk(0, "Mistral is the engine, this is it."));
        assert_eq!(card.prompt(), "Mistral ___ the engine, this is it.");
    }

    #[test]
    fn test_cloze_short_words_and_no_words() {
        assert_eq!(blank_keyword("I am ok.", &[]), "I ___ ok.");
        assert_eq!(blank_keyword("...", &[]), CLOZE_BLANK);
    }

    #[test]
    fn test_memo_template() {
        let card = CardAssembler::new(CardKind::Memo)
            .card_for_chunk(&chunk(0, "Traits define shared behavior."));
        assert_eq!(card.prompt(), "Explain in detail: Traits define shared behavior");
        assert!(card.answer().starts_with("Traits define shared behavior."));
        assert!(card.answer().ends_with(MEMO_ANNOTATION));
    }

    #[test]
    fn test_mcq_on_single_sentence() {
        let card = CardAssembler::new(CardKind::Mcq)
            .card_for_chunk(&chunk(0, "Mistral is the engine."));
        match &card {
            Flashcard::Mcq { question, options, answer } => {
                assert!(question.contains("Mistral is the engine."));
                assert_eq!(options.len(), 4);
                assert!(!answer.is_empty());
                assert_eq!(answer, "A");
                assert_eq!(options[0], "Mistral is the engine");
            }
            other => panic!("expected MCQ, got {:?}", other),
        }
        assert!(card.is_complete());
    }

    #[test]
    fn test_mcq_correct_letter_rotates() {
        let assembler = CardAssembler::new(CardKind::Mcq);
        let letters: Vec<String> = (0..5)
            .map(|i| assembler.card_for_chunk(&chunk(i, "Fact here.")).answer().to_string())
            .collect();
        assert_eq!(letters, vec!["A", "B", "C", "D", "A"]);

        let third = assembler.card_for_chunk(&chunk(2, "Fact here."));
        assert_eq!(third.options()[2], "Fact here");
    }

    #[test]
    fn test_image_occlusion_is_placeholder() {
        let card = CardAssembler::new(CardKind::ImageOcclusion)
            .card_for_chunk(&chunk(0, "Anything at all."));
        assert_eq!(card.prompt(), OCCLUSION_FRONT);
        assert_eq!(card.answer(), OCCLUSION_BACK);
    }

    #[test]
    fn test_one_card_per_chunk_in_order() {
        let chunks = chunk_text("One. Two. Three. Four. Five.", 2);
        let cards = CardAssembler::new(CardKind::Basic).assemble(&chunks);
        let fronts: Vec<&str> = cards.iter().map(|c| c.prompt()).collect();
        assert_eq!(fronts, vec!["One", "Three", "Five"]);
    }

    #[test]
    fn test_every_kind_produces_complete_cards() {
        let chunks = chunk_text("Ownership moves values. Borrowing lends them. Lifetimes bound them.", 2);
        for kind in CardKind::ALL {
            let cards = CardAssembler::new(kind).with_demo_cards(true).assemble(&chunks);
            assert!(cards.iter().all(Flashcard::is_complete), "{:?}", kind);
        }
    }

    #[test]
    fn test_empty_chunks_yield_demo_only() {
        let chunks = chunk_text("", 3);
        let without = CardAssembler::new(CardKind::Basic).assemble(&chunks);
        assert!(without.is_empty());

        let with = CardAssembler::new(CardKind::Basic).with_demo_cards(true).assemble(&chunks);
        assert_eq!(with, demo_cards());
    }

    #[test]
    fn test_demo_cards_are_input_independent() {
        let assembler = CardAssembler::new(CardKind::Cloze).with_demo_cards(true);
        let a = assembler.assemble(&chunk_text("Alpha beta gamma.", 3));
        let b = assembler.assemble(&chunk_text("Completely different words here. And more.", 1));

        let demo_len = demo_cards().len();
        assert_eq!(a[a.len() - demo_len..], b[b.len() - demo_len..]);

        let kinds: Vec<CardKind> = demo_cards().iter().map(Flashcard::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CardKind::Mcq,
                CardKind::Cloze,
                CardKind::Reverse,
                CardKind::Memo,
                CardKind::ImageOcclusion
            ]
        );
    }

    #[test]
    fn test_document_overview() {
        let text = "d".repeat(150);
        let cards = CardAssembler::new(CardKind::Basic).assemble_document(&text);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].prompt(), OVERVIEW_FRONT);
        assert_eq!(cards[0].answer(), format!("{}...", "d".repeat(100)));

        let short = overview_card("Short doc.");
        assert_eq!(short.answer(), "Short doc.");

        assert!(CardAssembler::new(CardKind::Basic).assemble_document("  ").is_empty());
    }
}
