//! Labeled-section extraction from semi-structured model text
//!
//! The grading model is asked for three headed sections (feedback,
//! corrected expression, advice) in a fixed order, but the shape is not
//! contractually guaranteed: headings drift between invocations, blank
//! lines come and go, and whole sections can be missing. Each section is
//! therefore extracted in two tiers (a specific line-anchored heading
//! match capturing up to the next heading, then a permissive match
//! capturing through end of text) before giving up and keeping the
//! caller's default. The tier order is deliberate; do not collapse it
//! into a single strict parse.

use std::sync::LazyLock;

use regex::Regex;

/// Specific heading: optional markdown hashes or bold, exact title,
/// optional colon, content up to the next heading or end of text.
static FEEDBACK_SPECIFIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ims)^(?:#{1,4}[ \t]*)?\**(?:overall\s+|general\s+)?feedback\**[ \t]*:?[ \t]*\r?\n(.*?)(?:\n#|\n\*\*|\z)",
    )
    .expect("valid regex")
});

static FEEDBACK_PERMISSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)feedback[^\n]*\n?(.*)").expect("valid regex")
});

static BETTER_SPECIFIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ims)^(?:#{1,4}[ \t]*)?\**(?:better\s+expression|corrected\s+(?:expression|sentence))\**[ \t]*:?[ \t]*\r?\n(.*?)(?:\n#|\n\*\*|\z)",
    )
    .expect("valid regex")
});

static BETTER_PERMISSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:better\s+expression|corrected\s+(?:expression|sentence))[^\n]*\n?(.*)")
        .expect("valid regex")
});

/// The advice heading may carry a trailing qualifier ("Advice (Template)",
/// "Advice for next time"), so the title match runs to end of line.
static ADVICE_SPECIFIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ims)^(?:#{1,4}[ \t]*)?\**advice[^\r\n]*\r?\n(.*?)(?:\n#|\n\*\*|\z)")
        .expect("valid regex")
});

static ADVICE_PERMISSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)advice[^\n]*\n?(.*)").expect("valid regex")
});

/// The three free-text sections of a graded reply, `None` where nothing
/// recognizable was found
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sections {
    pub feedback: Option<String>,
    pub better_expression: Option<String>,
    pub advice: Option<String>,
}

/// Extract the three labeled sections from raw model text
///
/// Never fails; sections that cannot be recovered are `None`.
#[must_use]
pub fn parse_sections(raw: &str) -> Sections {
    Sections {
        feedback: extract(raw, &FEEDBACK_SPECIFIC, &FEEDBACK_PERMISSIVE),
        better_expression: extract(raw, &BETTER_SPECIFIC, &BETTER_PERMISSIVE),
        advice: extract(raw, &ADVICE_SPECIFIC, &ADVICE_PERMISSIVE),
    }
}

/// Two-tier extraction: specific heading first, then the permissive
/// fallback capturing through end of text
///
/// The first tier that matches decides the outcome. A section emitted
/// empty (its heading immediately followed by the next heading) must not
/// fall through to the permissive tier, which would re-find the same
/// heading and swallow everything after it.
fn extract(raw: &str, specific: &Regex, permissive: &Regex) -> Option<String> {
    for pattern in [specific, permissive] {
        if let Some(caps) = pattern.captures(raw) {
            return clean_content(caps[1].trim());
        }
    }
    None
}

/// Reduce captured section content to its usable text
///
/// The content group's terminator needs a leading newline, which the
/// heading match already consumed, so an adjacent heading lands at the
/// start of the capture instead of ending it. Content that begins with a
/// heading marker is therefore an empty section, not text.
fn clean_content(content: &str) -> Option<String> {
    if content.is_empty() || content.starts_with('#') || content.starts_with("**") {
        return None;
    }
    Some(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "[SCORES]\nFluency: 4\n[/SCORES]\n### Feedback\nGood try.\n### Better Expression\nI go to school.\n### Advice\nUse past tense.";

    #[test]
    fn test_all_sections_present() {
        let sections = parse_sections(WELL_FORMED);
        assert_eq!(sections.feedback.as_deref(), Some("Good try."));
        assert_eq!(sections.better_expression.as_deref(), Some("I go to school."));
        assert_eq!(sections.advice.as_deref(), Some("Use past tense."));
    }

    #[test]
    fn test_no_headings_at_all() {
        let sections = parse_sections("Fluency: 4\nVocabulary: 5\n");
        assert_eq!(sections, Sections::default());
    }

    #[test]
    fn test_extra_blank_lines() {
        let raw = "### Feedback\n\n\nNice pacing.\n\n\n### Better Expression\n\nI went home.\n\n### Advice\nSlow down.";
        let sections = parse_sections(raw);
        assert_eq!(sections.feedback.as_deref(), Some("Nice pacing."));
        assert_eq!(sections.better_expression.as_deref(), Some("I went home."));
        assert_eq!(sections.advice.as_deref(), Some("Slow down."));
    }

    #[test]
    fn test_advice_heading_with_qualifier() {
        let raw = "### Feedback\nOk.\n### Better Expression\nShe runs fast.\n### Advice (Template)\nSubject + verb + adverb.";
        let sections = parse_sections(raw);
        assert_eq!(sections.advice.as_deref(), Some("Subject + verb + adverb."));
    }

    #[test]
    fn test_bold_headings() {
        let raw = "**Feedback**\nWell spoken.\n**Better Expression**\nHe has eaten.\n**Advice**\nMind the perfect tense.";
        let sections = parse_sections(raw);
        assert_eq!(sections.feedback.as_deref(), Some("Well spoken."));
        assert_eq!(sections.better_expression.as_deref(), Some("He has eaten."));
        assert_eq!(sections.advice.as_deref(), Some("Mind the perfect tense."));
    }

    #[test]
    fn test_corrected_sentence_variant() {
        let raw = "### Feedback\nClose.\n### Corrected Sentence\nThey were late.\n### Advice\nPast tense of 'be'.";
        let sections = parse_sections(raw);
        assert_eq!(sections.better_expression.as_deref(), Some("They were late."));
    }

    #[test]
    fn test_missing_middle_section() {
        let raw = "### Feedback\nDecent.\n### Advice\nKeep practicing.";
        let sections = parse_sections(raw);
        assert_eq!(sections.feedback.as_deref(), Some("Decent."));
        assert!(sections.better_expression.is_none());
        assert_eq!(sections.advice.as_deref(), Some("Keep practicing."));
    }

    #[test]
    fn test_permissive_fallback_inline_heading() {
        // No line-anchored heading; the permissive tier captures through
        // end of text.
        let raw = "Here is my advice: watch your articles.\nAlso drill prepositions.";
        let sections = parse_sections(raw);
        assert_eq!(
            sections.advice.as_deref(),
            Some("Also drill prepositions.")
        );
    }

    #[test]
    fn test_last_section_without_trailing_newline() {
        let sections = parse_sections("### Advice\nRecord yourself daily.");
        assert_eq!(sections.advice.as_deref(), Some("Record yourself daily."));
    }

    #[test]
    fn test_empty_section_does_not_swallow_next_heading() {
        let raw = "### Feedback\n### Better Expression\nGood try.\n### Advice\nUse past tense.";
        let sections = parse_sections(raw);
        assert!(sections.feedback.is_none());
        assert_eq!(sections.better_expression.as_deref(), Some("Good try."));
        assert_eq!(sections.advice.as_deref(), Some("Use past tense."));
    }

    #[test]
    fn test_empty_section_between_bold_headings() {
        let raw = "**Feedback**\n**Better Expression**\nI went home.\n**Advice**\nKeep it simple.";
        let sections = parse_sections(raw);
        assert!(sections.feedback.is_none());
        assert_eq!(sections.better_expression.as_deref(), Some("I went home."));
        assert_eq!(sections.advice.as_deref(), Some("Keep it simple."));
    }

    #[test]
    fn test_empty_trailing_section() {
        let sections = parse_sections("### Feedback\nSolid.\n### Advice\n");
        assert_eq!(sections.feedback.as_deref(), Some("Solid."));
        assert!(sections.advice.is_none());
    }
}
