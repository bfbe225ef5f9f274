//! Settings
//!
//! Layered configuration: built-in defaults, then an optional JSON file,
//! then environment, then command-line flags (applied by the CLI).

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec::lame::LAME_ENV_VAR;
use crate::codec::{EncodingRequest, Mp3Bitrate};
use crate::dsp::{SilenceParams, MAX_SPEED, MIN_SPEED};
use crate::error::{ClipsmithError, Result};
use crate::pipeline::ToolkitOptions;

/// Output container selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Wav,
    Mp3,
}

/// Toolkit stage switches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitSettings {
    pub remove_silence: bool,
    pub normalize: bool,
    pub speed: f64,
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            remove_silence: true,
            normalize: true,
            speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: OutputFormat,
    pub mp3_bitrate: Mp3Bitrate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// MP3 encoder binary
    pub lame_path: PathBuf,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            lame_path: PathBuf::from("lame"),
        }
    }
}

/// All user-tunable settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub silence: SilenceParams,
    pub toolkit: ToolkitSettings,
    pub export: ExportSettings,
    pub encoder: EncoderSettings,
}

impl Settings {
    /// Defaults, overlaid with `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a JSON settings file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ClipsmithError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&text)?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(LAME_ENV_VAR).filter(|p| !p.is_empty()) {
            debug!("Encoder path from {}: {}", LAME_ENV_VAR, path);
            self.encoder.lame_path = PathBuf::from(path);
        }
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        self.silence.validate()?;

        let speed = self.toolkit.speed;
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(ClipsmithError::InvalidArgument {
                reason: format!(
                    "speed must be between {} and {}, got {}",
                    MIN_SPEED, MAX_SPEED, speed
                ),
            });
        }
        Ok(())
    }

    pub fn encoding_request(&self) -> EncodingRequest {
        match self.export.format {
            OutputFormat::Wav => EncodingRequest::Wav,
            OutputFormat::Mp3 => EncodingRequest::Mp3 {
                bitrate: self.export.mp3_bitrate,
            },
        }
    }

    pub fn toolkit_options(&self) -> ToolkitOptions {
        ToolkitOptions {
            remove_silence: self.toolkit.remove_silence,
            silence: self.silence,
            normalize: self.toolkit.normalize,
            speed: self.toolkit.speed,
        }
    }
}
