//! OpenAI chat-completions grading client

use async_trait::async_trait;

use super::Grader;
use crate::feedback::ScoreScale;
use crate::{Error, Result};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(serde::Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Grades attempts through the OpenAI chat-completions API
pub struct OpenAiGrader {
    client: reqwest::Client,
    api_key: String,
    model: String,
    scale: ScoreScale,
}

impl OpenAiGrader {
    /// Create a new grader
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String, model: String, scale: ScoreScale) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for grading".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            scale,
        })
    }
}

#[async_trait]
impl Grader for OpenAiGrader {
    async fn grade(&self, question: &str, transcript: &str) -> Result<String> {
        tracing::debug!(model = %self.model, "requesting grade");

        let system = super::prompt::system_prompt(self.scale);
        let user = super::prompt::attempt_prompt(question, transcript);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "grading request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "grading API error");
            return Err(Error::Grader(format!("OpenAI API error {status}: {body}")));
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse grading response");
            e
        })?;

        let raw = result
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        if raw.is_empty() {
            return Err(Error::Grader("empty grading reply".to_string()));
        }

        tracing::info!(chars = raw.len(), "grading complete");
        Ok(raw)
    }
}
