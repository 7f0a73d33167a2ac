//! Text-to-deck pipeline.
//!
//! Normalizer, Chunker and Card Assembler run in order on one submission.
//! Each run is independent: all state lives in the arguments and the
//! returned outcome.

pub mod chunker;
pub mod normalize;
pub mod summary;

use serde::Serialize;

use crate::cards::{CardAssembler, Deck};
use crate::config::{Granularity, PipelineConfig};
use crate::input::RawInput;

pub use chunker::{chunk_text, split_sentences, Chunk, Chunks};
pub use normalize::{normalize, NormalizedText};
pub use summary::summarize;

/// A deck produced from a non-empty submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDeck {
    pub normalized: NormalizedText,
    pub summary: String,
    pub chunk_count: usize,
    pub deck: Deck,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PipelineOutcome {
    /// Nothing to process; no cards and nothing to export
    AwaitingInput,
    Generated(GeneratedDeck),
}

impl PipelineOutcome {
    pub fn deck(&self) -> Option<&Deck> {
        match self {
            PipelineOutcome::AwaitingInput => None,
            PipelineOutcome::Generated(generated) => Some(&generated.deck),
        }
    }

    pub fn is_awaiting_input(&self) -> bool {
        matches!(self, PipelineOutcome::AwaitingInput)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn assembler(&self) -> CardAssembler {
        CardAssembler::new(self.config.card_kind)
            .with_cloze_keywords(self.config.cloze_keywords.clone())
            .with_demo_cards(self.config.include_demo_cards)
    }

    pub fn run(&self, input: &RawInput) -> PipelineOutcome {
        let normalized = normalize(&input.text, self.config.max_text_length);
        if normalized.is_empty() {
            log::debug!("Empty {} input, awaiting input", input.origin);
            return PipelineOutcome::AwaitingInput;
        }

        let summary = summarize(&normalized, self.config.summary_length);
        let assembler = self.assembler();

        let (chunk_count, cards) = match self.config.granularity {
            Granularity::Chunks => {
                let chunks = chunk_text(&normalized, self.config.chunk_size);
                log::debug!(
                    "{} sentence(s) in {} chunk(s) of up to {}",
                    chunks.sentence_count(),
                    chunks.len(),
                    chunks.group_size()
                );
                (chunks.len(), assembler.assemble(&chunks))
            }
            Granularity::Document => (1, assembler.assemble_document(&normalized)),
        };

        log::debug!(
            "Generated {} card(s) from {} chars of {} input",
            cards.len(),
            normalized.char_len(),
            input.origin
        );

        PipelineOutcome::Generated(GeneratedDeck {
            normalized,
            summary,
            chunk_count,
            deck: Deck::new(&self.config.deck_name, cards),
        })
    }
}
