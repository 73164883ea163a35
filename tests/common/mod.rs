//! Shared fakes for pipeline integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use cadence_coach::{Error, Result, SpeechSynthesizer, Transcriber};

/// Returns a fixed transcript for any recording
pub struct FakeTranscriber {
    pub transcript: String,
}

impl FakeTranscriber {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        Ok(self.transcript.clone())
    }
}

/// Plays back scripted grading replies, one per attempt
///
/// Repeats the last reply once the script runs out.
pub struct ScriptedGrader {
    replies: Vec<String>,
    next: AtomicUsize,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGrader {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(ToString::to_string).collect(),
            next: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl cadence_coach::grader::Grader for ScriptedGrader {
    async fn grade(&self, question: &str, transcript: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((question.to_string(), transcript.to_string()));
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .get(index)
            .or_else(|| self.replies.last())
            .expect("scripted grader needs at least one reply");
        Ok(reply.clone())
    }
}

/// Returns fixed MP3-ish bytes for any text
pub struct FakeSynthesizer;

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        Ok(vec![0xff, 0xfb, 0x90, 0x00])
    }
}

/// Always fails, for exercising synthesis degradation
pub struct FailingSynthesizer;

#[async_trait]
impl SpeechSynthesizer for FailingSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        Err(Error::Tts("synthesis backend down".to_string()))
    }
}
