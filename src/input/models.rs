//! Data models for pipeline input

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{decode_upload, strip_html, IngestError, Result};

/// Where the text of a submission came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum InputOrigin {
    /// A decoded file upload
    Upload,
    /// Typed or pasted plain text
    #[default]
    Manual,
    /// Recorded audio
    Voice,
    /// A video link
    Link,
    /// Pasted OneNote HTML/MHT content
    OneNote,
}

impl fmt::Display for InputOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InputOrigin::Upload => "upload",
            InputOrigin::Manual => "manual",
            InputOrigin::Voice => "voice",
            InputOrigin::Link => "link",
            InputOrigin::OneNote => "onenote",
        };
        f.write_str(label)
    }
}

impl FromStr for InputOrigin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upload" | "file" => Ok(InputOrigin::Upload),
            "manual" | "text" => Ok(InputOrigin::Manual),
            "voice" | "audio" => Ok(InputOrigin::Voice),
            "link" | "youtube" => Ok(InputOrigin::Link),
            "onenote" => Ok(InputOrigin::OneNote),
            _ => Err(format!("unknown input origin: {}", s)),
        }
    }
}

/// One submission's text, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    pub text: String,
    pub origin: InputOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

impl RawInput {
    pub fn manual(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: InputOrigin::Manual,
            source_name: None,
        }
    }

    /// Decode an uploaded file by its extension
    pub fn from_upload(file_name: &str, bytes: &[u8]) -> Result<Self> {
        let text = decode_upload(file_name, bytes)?;
        Ok(Self {
            text,
            origin: InputOrigin::Upload,
            source_name: Some(file_name.to_string()),
        })
    }

    /// Pasted OneNote content; markup is stripped
    pub fn from_onenote(html: &str) -> Self {
        Self {
            text: strip_html(html),
            origin: InputOrigin::OneNote,
            source_name: None,
        }
    }

    /// Audio needs a speech recognizer, which this build does not include
    pub fn from_voice(file_name: &str) -> Result<Self> {
        log::warn!("Cannot transcribe {}: no speech recognizer", file_name);
        Err(IngestError::DecoderUnavailable("speech recognition".to_string()))
    }

    /// Video transcripts are not fetched
    pub fn from_link(url: &str) -> Result<Self> {
        log::warn!("Cannot fetch transcript for {}", url);
        Err(IngestError::TranscriptUnavailable(url.to_string()))
    }

    /// True when there is nothing to process yet
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
