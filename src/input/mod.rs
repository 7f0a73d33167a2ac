//! Input boundary: raw text from uploads, manual entry, pastes and links.
//!
//! Decoding never fabricates content. Sources whose decoder is not linked
//! into this build (PDF, OCR, speech, video transcripts) report a distinct
//! `IngestError` instead of placeholder text.

pub mod decode;
pub mod html;
pub mod models;

use thiserror::Error;

pub use decode::{decode_docx, decode_epub, decode_upload};
pub use html::strip_html;
pub use models::{InputOrigin, RawInput};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("No decoder available for {0}")]
    DecoderUnavailable(String),

    #[error("Transcript extraction is not available for {0}")]
    TranscriptUnavailable(String),

    #[error("Archive entry not found: {0}")]
    MissingEntry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
