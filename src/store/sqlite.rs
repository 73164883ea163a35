//! Local SQLite question store

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use super::{Attempt, QuestionRecord, QuestionStore};
use crate::feedback::ScoreSet;
use crate::{Error, Result};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Database connection pool
type DbPool = Pool<SqliteConnectionManager>;

/// Question store backed by a local `SQLite` file
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open (or create) the store at the given path
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened or migrated
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| Error::Database(e.to_string()))?;

        let conn = pool.get().map_err(|e| Error::Database(e.to_string()))?;
        init_schema(&conn)?;

        tracing::info!(version = SCHEMA_VERSION, "question store initialized");
        Ok(Self { pool })
    }

    /// Open an in-memory store (for testing)
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be initialized
    pub fn open_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| Error::Database(e.to_string()))?;

        let conn = pool.get().map_err(|e| Error::Database(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| Error::Database(e.to_string()))
    }
}

/// Initialize the schema, migrating from older versions as needed
fn init_schema(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Latest record per question (last write wins)
        CREATE TABLE IF NOT EXISTS questions (
            question TEXT PRIMARY KEY,
            fluency REAL NOT NULL DEFAULT 0,
            vocabulary REAL NOT NULL DEFAULT 0,
            grammar REAL NOT NULL DEFAULT 0,
            clarity REAL NOT NULL DEFAULT 0,
            weak INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Append-only attempt log
        CREATE TABLE IF NOT EXISTS attempts (
            id TEXT PRIMARY KEY,
            question TEXT NOT NULL REFERENCES questions(question),
            fluency REAL NOT NULL DEFAULT 0,
            vocabulary REAL NOT NULL DEFAULT 0,
            grammar REAL NOT NULL DEFAULT 0,
            clarity REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_attempts_question ON attempts(question, created_at);

        PRAGMA user_version = 1;
        ",
    )?;
    Ok(())
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestionRecord> {
    Ok(QuestionRecord {
        question: row.get(0)?,
        scores: ScoreSet {
            fluency: row.get(1)?,
            vocabulary: row.get(2)?,
            grammar: row.get(3)?,
            clarity: row.get(4)?,
        },
        weak: row.get::<_, i64>(5)? != 0,
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

#[async_trait]
impl QuestionStore for SqliteStore {
    async fn record_attempt(&self, question: &str, scores: &ScoreSet, weak: bool) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO questions (question, fluency, vocabulary, grammar, clarity, weak, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(question) DO UPDATE SET
                fluency = excluded.fluency,
                vocabulary = excluded.vocabulary,
                grammar = excluded.grammar,
                clarity = excluded.clarity,
                weak = excluded.weak,
                updated_at = excluded.updated_at",
            rusqlite::params![
                question,
                scores.fluency,
                scores.vocabulary,
                scores.grammar,
                scores.clarity,
                i64::from(weak),
                now,
            ],
        )?;

        conn.execute(
            "INSERT INTO attempts (id, question, fluency, vocabulary, grammar, clarity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                uuid::Uuid::new_v4().to_string(),
                question,
                scores.fluency,
                scores.vocabulary,
                scores.grammar,
                scores.clarity,
                now,
            ],
        )?;

        tracing::debug!(question = %question, weak, "attempt recorded");
        Ok(())
    }

    async fn get(&self, question: &str) -> Result<Option<QuestionRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT question, fluency, vocabulary, grammar, clarity, weak, updated_at
                 FROM questions WHERE question = ?1",
                [question],
                row_to_record,
            )
            .ok();
        Ok(record)
    }

    async fn history(&self, question: &str) -> Result<Vec<Attempt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT fluency, vocabulary, grammar, clarity, created_at
             FROM attempts WHERE question = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let attempts = stmt
            .query_map([question], |row| {
                Ok(Attempt {
                    scores: ScoreSet {
                        fluency: row.get(0)?,
                        vocabulary: row.get(1)?,
                        grammar: row.get(2)?,
                        clarity: row.get(3)?,
                    },
                    at: parse_datetime(&row.get::<_, String>(4)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(attempts)
    }

    async fn weak_questions(&self) -> Result<Vec<QuestionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT question, fluency, vocabulary, grammar, clarity, weak, updated_at
             FROM questions WHERE weak = 1 ORDER BY updated_at DESC",
        )?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(score: f64) -> ScoreSet {
        ScoreSet {
            fluency: score,
            vocabulary: score,
            grammar: score,
            clarity: score,
        }
    }

    #[tokio::test]
    async fn test_record_and_get() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .record_attempt("Describe your day.", &flat(7.0), false)
            .await
            .unwrap();

        let record = store.get("Describe your day.").await.unwrap().unwrap();
        assert_eq!(record.scores, flat(7.0));
        assert!(!record.weak);
    }

    #[tokio::test]
    async fn test_get_unknown_question() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.get("Never asked.").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_latest() {
        let store = SqliteStore::open_memory().unwrap();
        store.record_attempt("Q", &flat(3.0), true).await.unwrap();
        store.record_attempt("Q", &flat(8.0), false).await.unwrap();

        let record = store.get("Q").await.unwrap().unwrap();
        assert_eq!(record.scores, flat(8.0));
        assert!(!record.weak);
    }

    #[tokio::test]
    async fn test_history_appends_in_order() {
        let store = SqliteStore::open_memory().unwrap();
        store.record_attempt("Q", &flat(3.0), true).await.unwrap();
        store.record_attempt("Q", &flat(5.0), true).await.unwrap();
        store.record_attempt("Q", &flat(8.0), false).await.unwrap();

        let history = store.history("Q").await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].scores, flat(3.0));
        assert_eq!(history[2].scores, flat(8.0));
    }

    #[tokio::test]
    async fn test_weak_questions_listing() {
        let store = SqliteStore::open_memory().unwrap();
        store.record_attempt("Weak one", &flat(4.0), true).await.unwrap();
        store.record_attempt("Strong one", &flat(9.0), false).await.unwrap();

        let weak = store.weak_questions().await.unwrap();
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].question, "Weak one");
    }
}
