//! TOML configuration file loading
//!
//! Supports `~/.config/cadence/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

use crate::feedback::ScoreScale;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct CadenceConfigFile {
    /// Grading configuration
    #[serde(default)]
    pub grading: GradingFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Storage backend configuration
    #[serde(default)]
    pub storage: StorageFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Grading-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct GradingFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,

    /// Score scale ("ten" or "hundred")
    pub scale: Option<ScoreScale>,

    /// Weak-question threshold on the chosen scale
    pub weak_threshold: Option<f64>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: Option<String>,

    /// Synthesize the corrected sentence after grading
    pub synthesize: Option<bool>,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy", or an ElevenLabs voice id)
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f64>,
}

/// Storage backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    /// Backend ("sqlite" or "sheets")
    pub backend: Option<String>,

    /// SQLite database path override
    pub db_path: Option<PathBuf>,

    /// Google Sheets spreadsheet id
    pub spreadsheet_id: Option<String>,

    /// Path to the Google service-account JSON file
    pub service_account_path: Option<PathBuf>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `CadenceConfigFile::default()` if the file doesn't exist or
/// can't be parsed.
#[must_use]
pub fn load_config_file() -> CadenceConfigFile {
    let Some(path) = config_file_path() else {
        return CadenceConfigFile::default();
    };

    if !path.exists() {
        return CadenceConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                CadenceConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            CadenceConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/cadence/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("cadence").join("config.toml"))
}
