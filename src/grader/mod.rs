//! Grading provider: question + transcript in, raw model text out
//!
//! The reply is only loosely templated; `feedback` owns making sense of it.

mod openai;
pub mod prompt;

pub use openai::OpenAiGrader;

use async_trait::async_trait;

use crate::Result;

/// A hosted language model that grades one spoken attempt
///
/// Implementations return the model's raw reply text; parsing stays with
/// the caller so fakes can exercise the parser with arbitrary shapes.
#[async_trait]
pub trait Grader: Send + Sync {
    /// Grade a transcript against its practice question
    ///
    /// # Errors
    ///
    /// Returns error if the provider call fails; not retried here.
    async fn grade(&self, question: &str, transcript: &str) -> Result<String>;
}
