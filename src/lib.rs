//! Cadence - Voice practice coach for spoken-language learners
//!
//! This library provides the core functionality for the Cadence coach:
//! - Feedback processing (score extraction, section parsing, progress deltas)
//! - Hosted STT/TTS clients behind injectable traits
//! - LLM grading of transcribed attempts
//! - Question/score persistence (SQLite or Google Sheets)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     CLI / caller                     │
//! │        one recorded attempt per invocation           │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Pipeline                          │
//! │  transcribe → grade → parse → classify → persist    │
//! └──┬──────────┬───────────┬──────────────┬────────────┘
//!    │          │           │              │
//! ┌──▼───┐  ┌───▼────┐  ┌───▼──────┐  ┌───▼──────────┐
//! │ STT  │  │ Grader │  │ Feedback │  │ QuestionStore│
//! │ TTS  │  │ (LLM)  │  │ parser   │  │ sqlite/sheets│
//! └──────┘  └────────┘  └──────────┘  └──────────────┘
//! ```

pub mod config;
pub mod error;
pub mod feedback;
pub mod grader;
pub mod session;
pub mod store;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use feedback::{FeedbackReport, ScoreDelta, ScoreScale, ScoreSet, NO_FEEDBACK};
pub use session::{AttemptOutcome, Pipeline, PracticeSession};
pub use store::{Attempt, QuestionRecord, QuestionStore, SheetsStore, SqliteStore};
pub use voice::{SpeechSynthesizer, Transcriber};
