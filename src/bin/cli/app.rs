use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use batanki_lib::cards::CardKind;
use batanki_lib::config::{Granularity, PipelineConfig};
use batanki_lib::input::{InputOrigin, RawInput};

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub kind: Option<CardKind>,
    pub chunk_size: Option<usize>,
    pub max_length: Option<usize>,
    pub no_demo: bool,
    pub document: bool,
}

/// Shared application state for CLI commands
pub struct App {
    pub config: PipelineConfig,
    /// File the config was read from, if any
    pub config_path: Option<PathBuf>,
}

impl App {
    /// Load configuration from an explicit path or the default location
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = PipelineConfig::load(config_path).context("Failed to load configuration")?;

        let config_path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => PipelineConfig::default_path().filter(|p| p.exists()),
        };

        Ok(Self { config, config_path })
    }

    /// Effective pipeline config for one invocation
    pub fn pipeline_config(&self, overrides: &ConfigOverrides) -> Result<PipelineConfig> {
        let mut config = self.config.clone();

        if let Some(kind) = overrides.kind {
            config.card_kind = kind;
        }
        if let Some(chunk_size) = overrides.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(max_length) = overrides.max_length {
            config.max_text_length = max_length;
        }
        if overrides.no_demo {
            config.include_demo_cards = false;
        }
        if overrides.document {
            config.granularity = Granularity::Document;
        }

        config.validate().context("Invalid option")?;
        Ok(config)
    }

    /// Build the raw input from a file or inline text.
    ///
    /// Files are decoded by extension unless the origin says otherwise.
    /// Inline text is taken as typed, as OneNote markup, or as a video link.
    pub fn read_input(
        &self,
        file: Option<&Path>,
        text: Option<String>,
        origin: Option<InputOrigin>,
    ) -> Result<RawInput> {
        match (file, text) {
            (Some(_), Some(_)) => bail!("Pass either a file or --text, not both"),
            (Some(path), None) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());

                match origin.unwrap_or(InputOrigin::Upload) {
                    InputOrigin::Voice => Ok(RawInput::from_voice(&name)?),
                    InputOrigin::OneNote => {
                        let bytes = fs::read(path)
                            .with_context(|| format!("Failed to read {}", path.display()))?;
                        Ok(RawInput::from_onenote(&String::from_utf8_lossy(&bytes)))
                    }
                    InputOrigin::Link => bail!("A link origin takes a URL via --text"),
                    InputOrigin::Upload | InputOrigin::Manual => {
                        let bytes = fs::read(path)
                            .with_context(|| format!("Failed to read {}", path.display()))?;
                        RawInput::from_upload(&name, &bytes)
                            .with_context(|| format!("Failed to decode {}", name))
                    }
                }
            }
            (None, Some(text)) => match origin.unwrap_or(InputOrigin::Manual) {
                InputOrigin::Link => Ok(RawInput::from_link(text.trim())?),
                InputOrigin::OneNote => Ok(RawInput::from_onenote(&text)),
                InputOrigin::Voice => bail!("A voice origin takes an audio file"),
                InputOrigin::Upload | InputOrigin::Manual => Ok(RawInput::manual(text)),
            },
            (None, None) => Ok(RawInput::manual(String::new())),
        }
    }
}
