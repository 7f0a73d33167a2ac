//! BatAnki: turn study text into flashcard decks.
//!
//! A submission flows through `pipeline` (normalize, chunk, assemble) and
//! the resulting `Deck` is handed to `export` for CSV, JSON or Anki package
//! output.

pub mod cards;
pub mod config;
pub mod export;
pub mod input;
pub mod pipeline;

pub use cards::{CardKind, Deck, Flashcard};
pub use config::{Granularity, PipelineConfig};
pub use export::{ExportError, ExportFormat, ExportReport, Exporter};
pub use input::{IngestError, InputOrigin, RawInput};
pub use pipeline::{GeneratedDeck, Pipeline, PipelineOutcome};
