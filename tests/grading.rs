//! End-to-end pipeline tests with fake collaborators
//!
//! Exercises the full attempt chain against the in-memory SQLite store
//! without touching any hosted service.

use std::sync::Arc;

use cadence_coach::{Pipeline, PracticeSession, QuestionStore, ScoreSet, SqliteStore, NO_FEEDBACK};

mod common;

use common::{FailingSynthesizer, FakeSynthesizer, FakeTranscriber, ScriptedGrader};

const QUESTION: &str = "What did you do last weekend?";

const REPLY_WEAK: &str = "[SCORES]\nFluency: 4\nVocabulary: 4\nGrammar: 4\nClarity: 4\n[/SCORES]\n### Feedback\nGood try.\n### Better Expression\nI go to school.\n### Advice\nUse past tense.";

const REPLY_STRONG: &str = "[SCORES]\nFluency: 8\nVocabulary: 7\nGrammar: 6\nClarity: 9\n[/SCORES]\n### Feedback\nMuch better pacing.\n### Better Expression\nI went to school.\n### Advice\nKeep using past tense.";

const REPLY_SCORES_ONLY: &str = "Fluency: 7\nVocabulary: 6\nGrammar: 8\nClarity: 7";

fn pipeline_with(
    grader: Arc<ScriptedGrader>,
    synthesizer: Option<Arc<dyn cadence_coach::SpeechSynthesizer>>,
    store: Arc<dyn QuestionStore>,
) -> Pipeline {
    Pipeline::new(
        Arc::new(FakeTranscriber::new("I go to school.")),
        grader,
        synthesizer,
        store,
        6.0,
    )
}

#[tokio::test]
async fn test_first_attempt_round_trip() {
    let store: Arc<dyn QuestionStore> = Arc::new(SqliteStore::open_memory().unwrap());
    let grader = Arc::new(ScriptedGrader::new(&[REPLY_WEAK]));
    let pipeline = pipeline_with(Arc::clone(&grader), Some(Arc::new(FakeSynthesizer)), Arc::clone(&store));

    let mut session = PracticeSession::new(QUESTION);
    let outcome = pipeline.run_attempt(&mut session, b"wav").await.unwrap();

    assert_eq!(outcome.transcript, "I go to school.");
    assert_eq!(
        outcome.report.scores,
        ScoreSet {
            fluency: 4.0,
            vocabulary: 4.0,
            grammar: 4.0,
            clarity: 4.0
        }
    );
    assert_eq!(outcome.report.feedback, "Good try.");
    assert_eq!(outcome.report.better_expression, "I go to school.");
    assert_eq!(outcome.report.advice, "Use past tense.");
    assert!(outcome.weak);
    // First graded attempt: no delta, which is distinct from a zero delta
    assert!(outcome.delta.is_none());
    assert!(outcome.audio.is_some());

    // The grader saw the question and the transcript
    let prompts = grader.prompts.lock().unwrap();
    assert_eq!(prompts[0].0, QUESTION);
    assert_eq!(prompts[0].1, "I go to school.");

    // Persisted: record flagged weak, history has the one attempt
    let record = store.get(QUESTION).await.unwrap().unwrap();
    assert!(record.weak);
    assert_eq!(store.history(QUESTION).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_attempt_delta_against_previous() {
    let store: Arc<dyn QuestionStore> = Arc::new(SqliteStore::open_memory().unwrap());
    let grader = Arc::new(ScriptedGrader::new(&[REPLY_WEAK, REPLY_STRONG]));
    let pipeline = pipeline_with(grader, None, Arc::clone(&store));

    let mut session = PracticeSession::new(QUESTION);
    pipeline.run_attempt(&mut session, b"wav").await.unwrap();
    let second = pipeline.run_attempt(&mut session, b"wav").await.unwrap();

    // Delta compares against the first attempt, not against itself
    let delta = second.delta.unwrap();
    assert!((delta.fluency - 4.0).abs() < f64::EPSILON);
    assert!((delta.vocabulary - 3.0).abs() < f64::EPSILON);
    assert!((delta.grammar - 2.0).abs() < f64::EPSILON);
    assert!((delta.clarity - 5.0).abs() < f64::EPSILON);

    // Average 7.5 clears the threshold; latest record is no longer weak
    assert!(!second.weak);
    let record = store.get(QUESTION).await.unwrap().unwrap();
    assert!(!record.weak);
    assert_eq!(store.history(QUESTION).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_sections_keep_placeholders() {
    let store: Arc<dyn QuestionStore> = Arc::new(SqliteStore::open_memory().unwrap());
    let grader = Arc::new(ScriptedGrader::new(&[REPLY_SCORES_ONLY]));
    // A synthesizer is wired in, but there is no corrected sentence to speak
    let pipeline = pipeline_with(grader, Some(Arc::new(FakeSynthesizer)), store);

    let mut session = PracticeSession::new(QUESTION);
    let outcome = pipeline.run_attempt(&mut session, b"wav").await.unwrap();

    assert_eq!(outcome.report.scores.fluency, 7.0);
    assert_eq!(outcome.report.scores.grammar, 8.0);
    assert_eq!(outcome.report.feedback, NO_FEEDBACK);
    assert_eq!(outcome.report.better_expression, NO_FEEDBACK);
    assert_eq!(outcome.report.advice, NO_FEEDBACK);
    assert!(outcome.audio.is_none());
}

#[tokio::test]
async fn test_unparseable_reply_is_ungraded_not_weak() {
    let store: Arc<dyn QuestionStore> = Arc::new(SqliteStore::open_memory().unwrap());
    let grader = Arc::new(ScriptedGrader::new(&["I cannot grade this."]));
    let pipeline = pipeline_with(grader, None, Arc::clone(&store));

    let mut session = PracticeSession::new(QUESTION);
    let outcome = pipeline.run_attempt(&mut session, b"wav").await.unwrap();

    assert!(outcome.report.scores.is_ungraded());
    assert!(!outcome.weak);

    // The all-zero attempt still lands in the store
    let record = store.get(QUESTION).await.unwrap().unwrap();
    assert!(record.scores.is_ungraded());
    assert!(!record.weak);
}

#[tokio::test]
async fn test_synthesis_failure_does_not_fail_attempt() {
    let store: Arc<dyn QuestionStore> = Arc::new(SqliteStore::open_memory().unwrap());
    let grader = Arc::new(ScriptedGrader::new(&[REPLY_WEAK]));
    let pipeline = pipeline_with(grader, Some(Arc::new(FailingSynthesizer)), Arc::clone(&store));

    let mut session = PracticeSession::new(QUESTION);
    let outcome = pipeline.run_attempt(&mut session, b"wav").await.unwrap();

    assert!(outcome.audio.is_none());
    // The attempt was persisted before synthesis ran
    assert!(store.get(QUESTION).await.unwrap().is_some());
}

#[tokio::test]
async fn test_session_state_tracks_latest_attempt() {
    let store: Arc<dyn QuestionStore> = Arc::new(SqliteStore::open_memory().unwrap());
    let grader = Arc::new(ScriptedGrader::new(&[REPLY_WEAK]));
    let pipeline = pipeline_with(grader, Some(Arc::new(FakeSynthesizer)), store);

    let mut session = PracticeSession::new(QUESTION);
    pipeline.run_attempt(&mut session, b"wav").await.unwrap();

    assert_eq!(session.transcript.as_deref(), Some("I go to school."));
    assert!(session.report.is_some());
    assert!(session.audio.is_some());

    session.next_question("Describe your favorite meal.");
    assert!(session.transcript.is_none());
    assert!(session.audio.is_none());
}

#[tokio::test]
async fn test_weak_listing_reflects_latest_classification() {
    let store: Arc<dyn QuestionStore> = Arc::new(SqliteStore::open_memory().unwrap());
    let grader = Arc::new(ScriptedGrader::new(&[REPLY_WEAK, REPLY_STRONG]));
    let pipeline = pipeline_with(grader, None, Arc::clone(&store));

    let mut session = PracticeSession::new(QUESTION);
    pipeline.run_attempt(&mut session, b"wav").await.unwrap();
    assert_eq!(store.weak_questions().await.unwrap().len(), 1);

    // A strong retake clears the flag
    pipeline.run_attempt(&mut session, b"wav").await.unwrap();
    assert!(store.weak_questions().await.unwrap().is_empty());
}
