//! Deck export: delimited text, structured text and Anki packages.
//!
//! The binary deck format goes through the `DeckWriter` capability. When no
//! writer is available, `Exporter::export_all` records that format as
//! skipped and still produces the others.

pub mod apkg;
pub mod csv;
pub mod json;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::Deck;

pub use apkg::{AnkiPackageWriter, DeckPackage, DeckWriter, DECK_ID, MODEL_ID};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Export target unavailable: {0}")]
    TargetUnavailable(String),

    #[error("Malformed export data: {0}")]
    Malformed(String),

    #[error("Card {0} has an empty field")]
    IncompleteCard(usize),
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Apkg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Apkg];

    /// Download file name
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "BatAnki_flashcards.csv",
            ExportFormat::Json => "BatAnki_flashcards.json",
            ExportFormat::Apkg => "BatAnki_deck.apkg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Apkg => "application/octet-stream",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Apkg => "apkg",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "apkg" | "anki" => Ok(ExportFormat::Apkg),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// One exported payload, ready to be written or downloaded
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Result of a single format within `export_all`
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    Written(ExportArtifact),
    Skipped { format: ExportFormat, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub outcomes: Vec<ExportOutcome>,
}

impl ExportReport {
    pub fn artifacts(&self) -> impl Iterator<Item = &ExportArtifact> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ExportOutcome::Written(artifact) => Some(artifact),
            ExportOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (ExportFormat, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ExportOutcome::Skipped { format, reason } => Some((*format, reason.as_str())),
            ExportOutcome::Written(_) => None,
        })
    }
}

/// Serializes decks; owns the optional binary deck backend.
pub struct Exporter {
    deck_writer: Option<Box<dyn DeckWriter>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// Exporter backed by the built-in Anki package writer
    pub fn new() -> Self {
        Self {
            deck_writer: Some(Box::new(AnkiPackageWriter)),
        }
    }

    pub fn with_deck_writer(writer: Box<dyn DeckWriter>) -> Self {
        Self {
            deck_writer: Some(writer),
        }
    }

    /// Exporter with no binary deck backend; APKG requests are skipped
    pub fn without_deck_writer() -> Self {
        Self { deck_writer: None }
    }

    pub fn export(&self, deck: &Deck, format: ExportFormat) -> Result<ExportArtifact> {
        if let Some(index) = deck.first_incomplete() {
            return Err(ExportError::IncompleteCard(index));
        }

        let bytes = match format {
            ExportFormat::Csv => csv::export_csv(deck)?.into_bytes(),
            ExportFormat::Json => json::export_json(deck)?.into_bytes(),
            ExportFormat::Apkg => {
                let writer = self.deck_writer.as_ref().ok_or_else(|| {
                    ExportError::TargetUnavailable("no binary deck writer configured".to_string())
                })?;
                writer.write_package(&DeckPackage::from_deck(deck))?
            }
        };

        log::info!("Exported {} card(s) as {} ({} bytes)", deck.len(), format, bytes.len());

        Ok(ExportArtifact {
            format,
            file_name: format.file_name().to_string(),
            bytes,
        })
    }

    /// Export every requested format. A failure of the binary deck backend,
    /// whatever its cause, skips only that format and is reported; any other
    /// failure aborts.
    pub fn export_all(&self, deck: &Deck, formats: &[ExportFormat]) -> Result<ExportReport> {
        if let Some(index) = deck.first_incomplete() {
            return Err(ExportError::IncompleteCard(index));
        }

        let mut report = ExportReport::default();
        for &format in formats {
            match self.export(deck, format) {
                Ok(artifact) => report.outcomes.push(ExportOutcome::Written(artifact)),
                Err(ExportError::TargetUnavailable(reason)) => {
                    log::warn!("Skipping {} export: {}", format, reason);
                    report.outcomes.push(ExportOutcome::Skipped { format, reason });
                }
                Err(e) if format == ExportFormat::Apkg => {
                    log::warn!("Skipping {} export: {}", format, e);
                    report.outcomes.push(ExportOutcome::Skipped {
                        format,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }
}
