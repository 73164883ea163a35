//! Grading prompt builder
//!
//! The reply template asked for here is what `feedback` parses. The model
//! does not always follow it exactly, which is why the parser is tolerant;
//! keep the two loosely in sync rather than tightening either side.

use crate::feedback::ScoreScale;

/// System prompt for the grading model
#[must_use]
pub fn system_prompt(scale: ScoreScale) -> String {
    format!(
        "You are a supportive spoken-language tutor. Grade the student's \
         spoken answer to the practice question. Score four metrics \
         (Fluency, Vocabulary, Grammar, Clarity) from 0 to {max}, then give \
         short, concrete feedback.\n\
         Reply in exactly this format:\n\
         [SCORES]\n\
         Fluency: <number>\n\
         Vocabulary: <number>\n\
         Grammar: <number>\n\
         Clarity: <number>\n\
         [/SCORES]\n\
         ### Feedback\n\
         <two or three sentences of commentary>\n\
         ### Better Expression\n\
         <one corrected, natural version of the student's sentence>\n\
         ### Advice\n\
         <one actionable tip or sentence template to practice>",
        max = scale.max()
    )
}

/// User prompt for one graded attempt
#[must_use]
pub fn attempt_prompt(question: &str, transcript: &str) -> String {
    format!("Question: {question}\n\nStudent's answer (transcribed): {transcript}")
}
