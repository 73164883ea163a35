//! Hosted text-to-speech clients

use async_trait::async_trait;

use super::SpeechSynthesizer;
use crate::{Error, Result};

/// Synthesizes speech through the `OpenAI` TTS API
pub struct OpenAiSynthesizer {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    speed: f32,
    model: String,
}

impl OpenAiSynthesizer {
    /// Create a new `OpenAI` synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String, voice: String, speed: f32, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice,
            speed,
            model,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        tracing::debug!(chars = text.len(), "starting OpenAI synthesis");

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&TtsRequest {
                model: &self.model,
                input: text,
                voice: &self.voice,
                speed: self.speed,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "TTS request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS API error");
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?.to_vec();
        tracing::info!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio)
    }
}

/// Synthesizes speech through the ElevenLabs API
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    api_key: String,
    voice_id: String,
    model: String,
}

impl ElevenLabsSynthesizer {
    /// Create a new ElevenLabs synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String, voice_id: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice_id,
            model,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        tracing::debug!(chars = text.len(), "starting ElevenLabs synthesis");

        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}",
            self.voice_id
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&ElevenLabsRequest {
                text,
                model_id: &self.model,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "TTS request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS API error");
            return Err(Error::Tts(format!("ElevenLabs error {status}: {body}")));
        }

        let audio = response.bytes().await?.to_vec();
        tracing::info!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio)
    }
}
