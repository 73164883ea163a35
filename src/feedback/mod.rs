//! Feedback processing: turn one raw grading reply into structured scores,
//! labeled text sections, and progress information
//!
//! Everything here is a pure, stateless transformation invoked once per
//! attempt. Parsing never fails the caller; it degrades to defaults and
//! continues, because the upstream model output is only loosely templated.

mod progress;
mod scores;
mod sections;

pub use progress::select_previous;
pub use scores::{ScoreDelta, ScoreScale, ScoreSet};
pub use sections::{parse_sections, Sections};

use serde::{Deserialize, Serialize};

/// Placeholder for any text section the parser could not recover
pub const NO_FEEDBACK: &str = "No feedback found.";

/// Structured result of one graded attempt
///
/// Produced once per attempt, reduced to a [`ScoreSet`] for storage, and
/// discarded after display; the question store is the durable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    /// The four rubric scores (zeroes where unparsed)
    pub scores: ScoreSet,
    /// General commentary section
    pub feedback: String,
    /// Corrected-sentence section
    pub better_expression: String,
    /// Tip/template section
    pub advice: String,
}

impl FeedbackReport {
    /// Parse a raw grading reply into a structured report
    ///
    /// Never fails: unparsed scores stay 0 and unrecovered sections keep
    /// the [`NO_FEEDBACK`] placeholder.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let scores = ScoreSet::parse(raw);
        let sections = parse_sections(raw);
        Self {
            scores,
            feedback: sections.feedback.unwrap_or_else(|| NO_FEEDBACK.to_string()),
            better_expression: sections
                .better_expression
                .unwrap_or_else(|| NO_FEEDBACK.to_string()),
            advice: sections.advice.unwrap_or_else(|| NO_FEEDBACK.to_string()),
        }
    }

    /// Whether the corrected sentence is real text worth synthesizing
    #[must_use]
    pub fn has_better_expression(&self) -> bool {
        self.better_expression != NO_FEEDBACK
    }
}
