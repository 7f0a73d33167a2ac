//! Pipeline configuration
//!
//! Read once at startup from `<config_dir>/batanki/config.toml` (or an
//! explicit path) and treated as constant afterwards. Missing keys fall back
//! to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::CardKind;

/// Maximum number of characters kept after normalization
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 5000;

/// Characters used for the summary preview
pub const DEFAULT_SUMMARY_LENGTH: usize = 200;

/// Sentences per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 3;

pub const DEFAULT_DECK_NAME: &str = "BatAnki Deck";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Whether cards are derived per chunk or from the whole text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One card per sentence group
    #[default]
    Chunks,
    /// A single overview card for the whole document
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub max_text_length: usize,
    pub summary_length: usize,
    pub chunk_size: usize,
    /// Append the fixed demonstration cards after the generated ones
    pub include_demo_cards: bool,
    pub card_kind: CardKind,
    pub granularity: Granularity,
    /// Preferred words to blank out in cloze cards, checked in order
    pub cloze_keywords: Vec<String>,
    pub deck_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            summary_length: DEFAULT_SUMMARY_LENGTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
            include_demo_cards: true,
            card_kind: CardKind::default(),
            granularity: Granularity::default(),
            cloze_keywords: Vec::new(),
            deck_name: DEFAULT_DECK_NAME.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("batanki").join("config.toml"))
    }

    /// Load from an explicit path, or from the default location when it exists.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => {
                    log::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        log::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_text_length == 0 {
            return Err(ConfigError::Invalid(
                "maxTextLength must be greater than zero".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "chunkSize must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
