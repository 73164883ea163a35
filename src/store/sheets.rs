//! Google Sheets question store
//!
//! Uses service-account authentication against the Sheets values API. The
//! spreadsheet holds two worksheets: `Questions` (one row per question,
//! latest scores) and `History` (append-only attempt log). Rows are plain
//! strings; parsing is forgiving since the sheet may be hand-edited.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{Attempt, QuestionRecord, QuestionStore};
use crate::feedback::ScoreSet;
use crate::{Error, Result};

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKEN_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const QUESTIONS_RANGE: &str = "Questions!A2:G";
const HISTORY_RANGE: &str = "History!A2:F";

/// Question store backed by a Google Sheets spreadsheet
pub struct SheetsStore {
    client: reqwest::Client,
    spreadsheet_id: String,
    service_account_path: PathBuf,
    access_token: Arc<Mutex<Option<TokenInfo>>>,
}

/// Cached token info
struct TokenInfo {
    access_token: String,
    expires_at: u64,
}

/// Service account JSON structure
#[derive(Debug, Deserialize)]
struct ServiceAccount {
    client_email: String,
    private_key: String,
}

/// JWT claims for Google OAuth
#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: u64,
    iat: u64,
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Value range payload for reads and writes
#[derive(Debug, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsStore {
    /// Create a store for the given spreadsheet and service-account file
    #[must_use]
    pub fn new(spreadsheet_id: String, service_account_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            spreadsheet_id,
            service_account_path,
            access_token: Arc::new(Mutex::new(None)),
        }
    }

    fn load_service_account(&self) -> Result<ServiceAccount> {
        let content = std::fs::read_to_string(&self.service_account_path).map_err(|e| {
            Error::Store(format!(
                "cannot read service account {}: {e}",
                self.service_account_path.display()
            ))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Store(format!("invalid service account JSON: {e}")))
    }

    /// Create JWT for the token request
    fn create_jwt(service_account: &ServiceAccount) -> Result<String> {
        use jsonwebtoken::{Algorithm, EncodingKey, Header};

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Store(e.to_string()))?
            .as_secs();

        let header = Header::new(Algorithm::RS256);
        let claims = JwtClaims {
            iss: &service_account.client_email,
            scope: TOKEN_SCOPE,
            aud: GOOGLE_TOKEN_URL,
            exp: now + 3600,
            iat: now,
        };

        let key = EncodingKey::from_rsa_pem(service_account.private_key.as_bytes())
            .map_err(|e| Error::Store(format!("invalid private key: {e}")))?;

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| Error::Store(format!("JWT encoding failed: {e}")))
    }

    /// Get or refresh the access token
    async fn get_access_token(&self) -> Result<String> {
        {
            let token_guard = self.access_token.lock().await;
            if let Some(ref token_info) = *token_guard {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_err(|e| Error::Store(e.to_string()))?
                    .as_secs();

                // Reuse the cached token while it has at least 5 min left
                if token_info.expires_at > now + 300 {
                    return Ok(token_info.access_token.clone());
                }
            }
        }

        let service_account = self.load_service_account()?;
        let jwt = Self::create_jwt(&service_account)?;

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await
            .map_err(|e| Error::Store(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "token request failed: {status} - {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("token parse error: {e}")))?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Store(e.to_string()))?
            .as_secs();

        {
            let mut token_guard = self.access_token.lock().await;
            *token_guard = Some(TokenInfo {
                access_token: token_response.access_token.clone(),
                expires_at: now + token_response.expires_in,
            });
        }

        Ok(token_response.access_token)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let token = self.get_access_token().await?;
        let url = format!(
            "{SHEETS_API_URL}/{}/values/{}",
            self.spreadsheet_id,
            urlencoding::encode(range)
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("Sheets read error {status}: {body}")));
        }

        let result: ValueRange = response.json().await?;
        Ok(result.values)
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> Result<()> {
        let token = self.get_access_token().await?;
        let url = format!(
            "{SHEETS_API_URL}/{}/values/{}:append?valueInputOption=RAW",
            self.spreadsheet_id,
            urlencoding::encode(range)
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(&ValueRange { values: vec![row] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "Sheets append error {status}: {body}"
            )));
        }
        Ok(())
    }

    async fn update_row(&self, range: &str, row: Vec<String>) -> Result<()> {
        let token = self.get_access_token().await?;
        let url = format!(
            "{SHEETS_API_URL}/{}/values/{}?valueInputOption=RAW",
            self.spreadsheet_id,
            urlencoding::encode(range)
        );

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(&ValueRange { values: vec![row] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "Sheets update error {status}: {body}"
            )));
        }
        Ok(())
    }
}

/// Parse a score cell, defaulting to 0 for blank or hand-mangled values
fn parse_score(cell: Option<&String>) -> f64 {
    cell.and_then(|s| s.trim().parse().ok()).unwrap_or(0.0)
}

fn parse_weak(cell: Option<&String>) -> bool {
    cell.is_some_and(|s| matches!(s.trim().to_ascii_uppercase().as_str(), "TRUE" | "1" | "YES"))
}

fn parse_timestamp(cell: Option<&String>) -> DateTime<Utc> {
    cell.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc))
}

/// Find the index of a question's row within the data range
///
/// Cells may carry stray whitespace from hand edits, so the question cell
/// is trimmed before comparing, matching how rows are decoded.
fn find_question_row(rows: &[Vec<String>], question: &str) -> Option<usize> {
    rows.iter()
        .position(|row| row.first().is_some_and(|cell| cell.trim() == question))
}

/// Decode one `Questions` row; `None` if the question cell is missing
fn parse_question_row(row: &[String]) -> Option<QuestionRecord> {
    let question = row.first()?.trim();
    if question.is_empty() {
        return None;
    }
    Some(QuestionRecord {
        question: question.to_string(),
        scores: ScoreSet {
            fluency: parse_score(row.get(1)),
            vocabulary: parse_score(row.get(2)),
            grammar: parse_score(row.get(3)),
            clarity: parse_score(row.get(4)),
        },
        weak: parse_weak(row.get(5)),
        updated_at: parse_timestamp(row.get(6)),
    })
}

fn question_row(question: &str, scores: &ScoreSet, weak: bool, now: &str) -> Vec<String> {
    vec![
        question.to_string(),
        scores.fluency.to_string(),
        scores.vocabulary.to_string(),
        scores.grammar.to_string(),
        scores.clarity.to_string(),
        if weak { "TRUE" } else { "FALSE" }.to_string(),
        now.to_string(),
    ]
}

fn history_row(question: &str, scores: &ScoreSet, now: &str) -> Vec<String> {
    vec![
        now.to_string(),
        question.to_string(),
        scores.fluency.to_string(),
        scores.vocabulary.to_string(),
        scores.grammar.to_string(),
        scores.clarity.to_string(),
    ]
}

#[async_trait]
impl QuestionStore for SheetsStore {
    async fn record_attempt(&self, question: &str, scores: &ScoreSet, weak: bool) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let rows = self.get_values(QUESTIONS_RANGE).await?;

        // Questions data starts at sheet row 2 (row 1 is the header)
        let existing = find_question_row(&rows, question);

        let row = question_row(question, scores, weak, &now);
        if let Some(index) = existing {
            let sheet_row = index + 2;
            self.update_row(&format!("Questions!A{sheet_row}:G{sheet_row}"), row)
                .await?;
        } else {
            self.append_row(QUESTIONS_RANGE, row).await?;
        }

        self.append_row(HISTORY_RANGE, history_row(question, scores, &now))
            .await?;

        tracing::debug!(question = %question, weak, "attempt recorded to sheet");
        Ok(())
    }

    async fn get(&self, question: &str) -> Result<Option<QuestionRecord>> {
        let rows = self.get_values(QUESTIONS_RANGE).await?;
        Ok(rows
            .iter()
            .filter_map(|row| parse_question_row(row))
            .find(|record| record.question == question))
    }

    async fn history(&self, question: &str) -> Result<Vec<Attempt>> {
        let rows = self.get_values(HISTORY_RANGE).await?;
        // Sheet order is append order, which is what previous-attempt
        // selection relies on
        Ok(rows
            .iter()
            .filter(|row| row.get(1).map(String::as_str) == Some(question))
            .map(|row| Attempt {
                at: parse_timestamp(row.first()),
                scores: ScoreSet {
                    fluency: parse_score(row.get(2)),
                    vocabulary: parse_score(row.get(3)),
                    grammar: parse_score(row.get(4)),
                    clarity: parse_score(row.get(5)),
                },
            })
            .collect())
    }

    async fn weak_questions(&self) -> Result<Vec<QuestionRecord>> {
        let rows = self.get_values(QUESTIONS_RANGE).await?;
        Ok(rows
            .iter()
            .filter_map(|row| parse_question_row(row))
            .filter(|record| record.weak)
            .collect())
    }
}
