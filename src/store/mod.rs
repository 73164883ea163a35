//! Question/score persistence
//!
//! The store is the durable state: one latest record per question plus an
//! append-only attempt log. Backends are keyed by question text and apply
//! last-write-wins when sessions race; no locking here.

mod sheets;
mod sqlite;

pub use sheets::SheetsStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::feedback::ScoreSet;
use crate::Result;

/// Latest stored state for one practice question
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    /// Question text, the unique key
    pub question: String,
    /// Scores from the most recent attempt
    pub scores: ScoreSet,
    /// Weak-question flag from the most recent classification
    pub weak: bool,
    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

/// One historical attempt at a question
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// When the attempt was recorded
    pub at: DateTime<Utc>,
    /// Scores for the attempt
    pub scores: ScoreSet,
}

/// Persistence for question records and attempt history
///
/// `record_attempt` both overwrites the latest record and appends to the
/// history log. The pipeline persists the current attempt before reading
/// history back, so `history` includes the attempt just recorded; previous-
/// attempt selection accounts for that (see `feedback::select_previous`).
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Record a graded attempt: upsert the latest record and append to history
    ///
    /// # Errors
    ///
    /// Returns error if the write fails
    async fn record_attempt(&self, question: &str, scores: &ScoreSet, weak: bool) -> Result<()>;

    /// Fetch the latest record for a question, or `None` if never attempted
    ///
    /// # Errors
    ///
    /// Returns error if the read fails
    async fn get(&self, question: &str) -> Result<Option<QuestionRecord>>;

    /// Fetch the full attempt history for a question, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if the read fails
    async fn history(&self, question: &str) -> Result<Vec<Attempt>>;

    /// List all questions currently flagged weak
    ///
    /// # Errors
    ///
    /// Returns error if the read fails
    async fn weak_questions(&self) -> Result<Vec<QuestionRecord>>;
}
