//! Rubric score extraction and weak-question classification

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Scale the grading model is asked to score on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreScale {
    /// Scores in `[0, 10]`
    #[default]
    Ten,
    /// Scores in `[0, 100]`
    Hundred,
}

impl ScoreScale {
    /// Upper bound of the scale
    #[must_use]
    pub const fn max(self) -> f64 {
        match self {
            Self::Ten => 10.0,
            Self::Hundred => 100.0,
        }
    }

    /// Default weak-question threshold for this scale
    #[must_use]
    pub const fn default_weak_threshold(self) -> f64 {
        match self {
            Self::Ten => 6.0,
            Self::Hundred => 60.0,
        }
    }
}

/// Permissive `<label>: <number>` token scan. Labels are runs of word
/// characters; values are integers or decimals. A full-width colon also
/// counts since graded material may be bilingual.
static SCORE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\s*[:：]\s*(\d+(?:\.\d+)?)").expect("valid regex")
});

/// The four rubric scores for one graded attempt
///
/// All four metrics are always present; anything the parser could not
/// recover stays at 0. The fourth metric is labeled either `Clarity` or
/// `Pronunciation` depending on the grading prompt in use; both labels
/// land in [`ScoreSet::clarity`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSet {
    pub fluency: f64,
    pub vocabulary: f64,
    pub grammar: f64,
    pub clarity: f64,
}

/// Per-metric difference between two attempts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub fluency: f64,
    pub vocabulary: f64,
    pub grammar: f64,
    pub clarity: f64,
}

impl ScoreSet {
    /// Extract rubric scores from raw model text
    ///
    /// Scans the whole text for `label: number` tokens and keeps the ones
    /// whose label is a known metric. The last occurrence of a label wins,
    /// so a score restated inside a feedback section silently overwrites
    /// the one from the score block. Unknown labels are ignored. Never
    /// fails: malformed or absent score blocks yield the all-zero set.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut scores = Self::default();
        for caps in SCORE_TOKEN.captures_iter(raw) {
            let Ok(value) = caps[2].parse::<f64>() else {
                continue;
            };
            match caps[1].to_ascii_lowercase().as_str() {
                "fluency" => scores.fluency = value,
                "vocabulary" => scores.vocabulary = value,
                "grammar" => scores.grammar = value,
                "clarity" | "pronunciation" => scores.clarity = value,
                _ => {}
            }
        }
        scores
    }

    /// Arithmetic mean of the four metric values
    ///
    /// An average of 0 with every metric exactly 0 means "nothing was
    /// parsed" rather than "graded zero"; see [`ScoreSet::is_ungraded`].
    #[must_use]
    pub fn average(&self) -> f64 {
        (self.fluency + self.vocabulary + self.grammar + self.clarity) / 4.0
    }

    /// Whether no score was recovered at all (every metric exactly 0)
    #[must_use]
    pub fn is_ungraded(&self) -> bool {
        self.fluency == 0.0
            && self.vocabulary == 0.0
            && self.grammar == 0.0
            && self.clarity == 0.0
    }

    /// Classify this attempt as a weak question
    ///
    /// True when the average is greater than 0 and strictly below the
    /// threshold. The `> 0` guard keeps an unparsed (all-zero) result from
    /// being auto-flagged weak; it also means a genuinely all-zero grade is
    /// never flagged, which matches the historical behavior and is pending
    /// product-owner review rather than a fix here.
    #[must_use]
    pub fn is_weak(&self, threshold: f64) -> bool {
        let avg = self.average();
        avg > 0.0 && avg < threshold
    }

    /// Per-metric difference against the previous attempt
    ///
    /// `None` when there is no prior attempt: "no delta", which display
    /// code must not conflate with a zero delta.
    #[must_use]
    pub fn delta(&self, previous: Option<&Self>) -> Option<ScoreDelta> {
        previous.map(|prev| ScoreDelta {
            fluency: self.fluency - prev.fluency,
            vocabulary: self.vocabulary - prev.vocabulary,
            grammar: self.grammar - prev.grammar,
            clarity: self.clarity - prev.clarity,
        })
    }
}

impl fmt::Display for ScoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fluency {} · Vocabulary {} · Grammar {} · Clarity {}",
            self.fluency, self.vocabulary, self.grammar, self.clarity
        )
    }
}
