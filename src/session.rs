//! Practice session context and the per-attempt pipeline
//!
//! One attempt runs the full sequential chain: transcribe, grade, parse,
//! classify, persist, then optionally synthesize the corrected sentence.
//! Attempts for a session are processed one at a time; concurrent writes
//! from other sessions fall to the store's last-write-wins semantics.

use std::sync::Arc;

use crate::feedback::{select_previous, FeedbackReport, ScoreDelta};
use crate::grader::Grader;
use crate::store::QuestionStore;
use crate::voice::{SpeechSynthesizer, Transcriber};
use crate::Result;

/// Mutable state for one practice session
///
/// Owned by the caller: created at session start, replaced wholesale on
/// skip/next, dropped at session end. Replaces the pile of globals the
/// single-page app kept.
#[derive(Debug, Default, Clone)]
pub struct PracticeSession {
    /// The question currently being practiced
    pub question: String,
    /// Transcript of the latest recording, if any
    pub transcript: Option<String>,
    /// Report from the latest graded attempt, if any
    pub report: Option<FeedbackReport>,
    /// Synthesized audio for the latest corrected sentence, if any
    pub audio: Option<Vec<u8>>,
}

impl PracticeSession {
    /// Start a session on the given question
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    /// Move to the next question, discarding attempt state
    pub fn next_question(&mut self, question: impl Into<String>) {
        *self = Self::new(question);
    }
}

/// Everything the caller needs to display one graded attempt
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    /// What the student said, per the STT provider
    pub transcript: String,
    /// Parsed scores and feedback sections
    pub report: FeedbackReport,
    /// Whether this attempt classified the question as weak
    pub weak: bool,
    /// Per-metric change against the previous attempt; `None` on the first
    pub delta: Option<ScoreDelta>,
    /// MP3 audio of the corrected sentence, when synthesis ran
    pub audio: Option<Vec<u8>>,
}

/// The per-attempt pipeline with its injected collaborators
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    grader: Arc<dyn Grader>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    store: Arc<dyn QuestionStore>,
    weak_threshold: f64,
}

impl Pipeline {
    /// Create a pipeline
    ///
    /// Pass `None` for the synthesizer to skip audio for corrected
    /// sentences.
    #[must_use]
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        grader: Arc<dyn Grader>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        store: Arc<dyn QuestionStore>,
        weak_threshold: f64,
    ) -> Self {
        Self {
            transcriber,
            grader,
            synthesizer,
            store,
            weak_threshold,
        }
    }

    /// Run one graded attempt against the session's current question
    ///
    /// Persists the attempt before reading history back, so the previous
    /// attempt is the second-to-last history entry. That ordering is
    /// load-bearing; do not reorder the store calls.
    ///
    /// STT, grading, and store failures propagate. A synthesis failure
    /// does not: the attempt is already persisted by then, so the outcome
    /// is returned without audio and the error is logged.
    ///
    /// # Errors
    ///
    /// Returns error if transcription, grading, or persistence fails.
    pub async fn run_attempt(
        &self,
        session: &mut PracticeSession,
        recording: &[u8],
    ) -> Result<AttemptOutcome> {
        let question = session.question.clone();
        tracing::info!(question = %question, "attempt started");

        let transcript = self.transcriber.transcribe(recording).await?;
        session.transcript = Some(transcript.clone());

        let raw = self.grader.grade(&question, &transcript).await?;
        let report = FeedbackReport::parse(&raw);
        let weak = report.scores.is_weak(self.weak_threshold);

        self.store
            .record_attempt(&question, &report.scores, weak)
            .await?;

        let history = self.store.history(&question).await?;
        let scores_log: Vec<_> = history.iter().map(|attempt| attempt.scores).collect();
        let delta = report.scores.delta(select_previous(&scores_log));

        let audio = if report.has_better_expression() {
            match &self.synthesizer {
                Some(synthesizer) => match synthesizer.synthesize(&report.better_expression).await
                {
                    Ok(audio) => Some(audio),
                    Err(e) => {
                        tracing::warn!(error = %e, "synthesis failed, continuing without audio");
                        None
                    }
                },
                None => None,
            }
        } else {
            None
        };

        session.report = Some(report.clone());
        session.audio.clone_from(&audio);

        tracing::info!(
            question = %question,
            average = report.scores.average(),
            weak,
            "attempt graded"
        );

        Ok(AttemptOutcome {
            transcript,
            report,
            weak,
            delta,
            audio,
        })
    }
}
