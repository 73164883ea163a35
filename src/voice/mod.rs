//! Voice processing: hosted STT/TTS clients behind injectable traits
//!
//! Audio capture and playback are out of scope; recordings arrive as WAV
//! bytes and synthesized speech leaves as MP3 bytes.

mod stt;
mod tts;
mod wav;

pub use stt::{DeepgramTranscriber, WhisperTranscriber};
pub use tts::{ElevenLabsSynthesizer, OpenAiSynthesizer};
pub use wav::read_recording;

use async_trait::async_trait;

use crate::Result;

/// Turns a WAV recording into a transcript
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV audio bytes to text
    ///
    /// # Errors
    ///
    /// Returns error if transcription fails
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Turns text into spoken audio (MP3 bytes)
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for the given text
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
