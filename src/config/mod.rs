//! Configuration for the Cadence coach
//!
//! Layered: built-in defaults, then the TOML config file, then environment
//! variables (`CADENCE_*`, plus the usual provider key variables).

pub mod file;

use std::path::PathBuf;

use crate::feedback::ScoreScale;
use crate::{Error, Result};

/// Cadence coach configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Grading model configuration
    pub grading: GradingConfig,

    /// Voice (STT/TTS) configuration
    pub voice: VoiceConfig,

    /// Question store backend
    pub storage: StorageConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// Data directory (database, cached audio)
    pub data_dir: PathBuf,
}

/// Grading model configuration
#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// LLM model identifier for grading
    pub model: String,

    /// Score scale the model is asked to use
    pub scale: ScoreScale,

    /// Weak-question threshold on the chosen scale
    pub weak_threshold: f64,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: String,

    /// STT model identifier
    pub stt_model: String,

    /// Synthesize the corrected sentence after grading
    pub synthesize: bool,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: String,

    /// TTS model identifier
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,
}

/// Question store backend selection
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Local SQLite database
    Sqlite {
        /// Database file path
        path: PathBuf,
    },
    /// Google Sheets spreadsheet
    Sheets {
        /// Spreadsheet id from the sheet URL
        spreadsheet_id: String,
        /// Path to the service-account JSON file
        service_account_path: PathBuf,
    },
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub openai: String,
    pub deepgram: String,
    pub elevenlabs: String,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from defaults, the config file, and environment
    ///
    /// # Errors
    ///
    /// Returns error if no data directory can be determined, or if the
    /// sheets backend is selected without a spreadsheet id and
    /// service-account path.
    pub fn load() -> Result<Self> {
        let file = file::load_config_file();

        let data_dir = directories::ProjectDirs::from("app", "cadence", "cadence")
            .map(|d| d.data_dir().to_path_buf())
            .ok_or_else(|| Error::Config("cannot determine data directory".to_string()))?;

        let scale = env_var("CADENCE_SCALE")
            .and_then(|v| match v.to_ascii_lowercase().as_str() {
                "ten" | "10" => Some(ScoreScale::Ten),
                "hundred" | "100" => Some(ScoreScale::Hundred),
                _ => None,
            })
            .or(file.grading.scale)
            .unwrap_or_default();

        let weak_threshold = env_var("CADENCE_WEAK_THRESHOLD")
            .and_then(|v| v.parse().ok())
            .or(file.grading.weak_threshold)
            .unwrap_or_else(|| scale.default_weak_threshold());

        let grading = GradingConfig {
            model: env_var("CADENCE_GRADING_MODEL")
                .or(file.grading.model)
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            scale,
            weak_threshold,
        };

        let voice = VoiceConfig {
            stt_provider: env_var("CADENCE_STT_PROVIDER")
                .or(file.voice.stt_provider)
                .unwrap_or_else(|| "whisper".to_string()),
            stt_model: env_var("CADENCE_STT_MODEL")
                .or(file.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            synthesize: env_var("CADENCE_SYNTHESIZE")
                .map(|v| v != "0" && v != "false")
                .or(file.voice.synthesize)
                .unwrap_or(true),
            tts_provider: env_var("CADENCE_TTS_PROVIDER")
                .or(file.voice.tts_provider)
                .unwrap_or_else(|| "openai".to_string()),
            tts_model: env_var("CADENCE_TTS_MODEL")
                .or(file.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: env_var("CADENCE_TTS_VOICE")
                .or(file.voice.tts_voice)
                .unwrap_or_else(|| "alloy".to_string()),
            tts_speed: env_var("CADENCE_TTS_SPEED")
                .and_then(|v| v.parse().ok())
                .or(file.voice.tts_speed)
                .unwrap_or(1.0),
        };

        let backend = env_var("CADENCE_STORAGE")
            .or(file.storage.backend)
            .unwrap_or_else(|| "sqlite".to_string());

        let storage = match backend.as_str() {
            "sqlite" => StorageConfig::Sqlite {
                path: env_var("CADENCE_DB_PATH")
                    .map(PathBuf::from)
                    .or(file.storage.db_path)
                    .unwrap_or_else(|| data_dir.join("cadence.db")),
            },
            "sheets" => {
                let spreadsheet_id = env_var("CADENCE_SPREADSHEET_ID")
                    .or(file.storage.spreadsheet_id)
                    .ok_or_else(|| {
                        Error::Config("sheets backend requires a spreadsheet id".to_string())
                    })?;
                let service_account_path = env_var("CADENCE_SERVICE_ACCOUNT")
                    .map(PathBuf::from)
                    .or(file.storage.service_account_path)
                    .ok_or_else(|| {
                        Error::Config(
                            "sheets backend requires a service-account file".to_string(),
                        )
                    })?;
                StorageConfig::Sheets {
                    spreadsheet_id,
                    service_account_path,
                }
            }
            other => {
                return Err(Error::Config(format!("unknown storage backend: {other}")));
            }
        };

        let api_keys = ApiKeys {
            openai: env_var("OPENAI_API_KEY")
                .or(file.api_keys.openai)
                .unwrap_or_default(),
            deepgram: env_var("DEEPGRAM_API_KEY")
                .or(file.api_keys.deepgram)
                .unwrap_or_default(),
            elevenlabs: env_var("ELEVENLABS_API_KEY")
                .or(file.api_keys.elevenlabs)
                .unwrap_or_default(),
        };

        Ok(Self {
            grading,
            voice,
            storage,
            api_keys,
            data_dir,
        })
    }
}
