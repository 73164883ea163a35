use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cadence_coach::config::StorageConfig;
use cadence_coach::feedback::select_previous;
use cadence_coach::grader::{Grader, OpenAiGrader};
use cadence_coach::voice::{
    read_recording, DeepgramTranscriber, ElevenLabsSynthesizer, OpenAiSynthesizer,
    WhisperTranscriber,
};
use cadence_coach::{
    Config, Error, Pipeline, PracticeSession, QuestionStore, SheetsStore, SpeechSynthesizer,
    SqliteStore, Transcriber,
};

/// Cadence - voice practice coach: record, transcribe, grade, track
#[derive(Parser)]
#[command(name = "cadence", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grade a recorded answer to a practice question
    Grade {
        /// WAV recording of the spoken answer
        audio: PathBuf,

        /// The practice question being answered
        #[arg(short, long)]
        question: String,

        /// Write synthesized corrected-sentence audio here (MP3)
        #[arg(long)]
        audio_out: Option<PathBuf>,
    },
    /// Transcribe a recording without grading it
    Transcribe {
        /// WAV recording
        audio: PathBuf,
    },
    /// List questions currently flagged weak
    Weak,
    /// Show attempt history and score deltas for a question
    Progress {
        /// The practice question
        question: String,
    },
    /// Synthesize speech for a sentence (TTS smoke test)
    Say {
        /// Text to speak
        text: String,

        /// Output file (MP3)
        #[arg(short, long, default_value = "cadence-say.mp3")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,cadence_coach=info",
        1 => "info,cadence_coach=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;

    match cli.command {
        Command::Grade {
            audio,
            question,
            audio_out,
        } => {
            let pipeline = Pipeline::new(
                build_transcriber(&config)?,
                build_grader(&config)?,
                build_synthesizer(&config)?,
                build_store(&config)?,
                config.grading.weak_threshold,
            );

            let recording = read_recording(&audio)?;
            let mut session = PracticeSession::new(question);
            let outcome = pipeline.run_attempt(&mut session, &recording).await?;

            println!("Transcript: {}", outcome.transcript);
            println!();
            println!("Scores: {}", outcome.report.scores);
            println!("Average: {:.1}", outcome.report.scores.average());
            if let Some(delta) = outcome.delta {
                println!(
                    "Change:  Fluency {:+} · Vocabulary {:+} · Grammar {:+} · Clarity {:+}",
                    delta.fluency, delta.vocabulary, delta.grammar, delta.clarity
                );
            } else {
                println!("Change:  first graded attempt");
            }
            if outcome.weak {
                println!("Flagged weak - queued for review.");
            }
            println!();
            println!("Feedback: {}", outcome.report.feedback);
            println!("Better expression: {}", outcome.report.better_expression);
            println!("Advice: {}", outcome.report.advice);

            if let (Some(bytes), Some(path)) = (outcome.audio, audio_out) {
                std::fs::write(&path, bytes)?;
                println!();
                println!("Corrected-sentence audio written to {}", path.display());
            }
        }

        Command::Transcribe { audio } => {
            let transcriber = build_transcriber(&config)?;
            let recording = read_recording(&audio)?;
            let transcript = transcriber.transcribe(&recording).await?;
            println!("{transcript}");
        }

        Command::Weak => {
            let store = build_store(&config)?;
            let weak = store.weak_questions().await?;
            if weak.is_empty() {
                println!("No weak questions - nice work.");
            } else {
                for record in weak {
                    println!(
                        "{:.1}  {}",
                        record.scores.average(),
                        record.question
                    );
                }
            }
        }

        Command::Progress { question } => {
            let store = build_store(&config)?;
            let history = store.history(&question).await?;
            if history.is_empty() {
                println!("No attempts recorded for this question yet.");
                return Ok(());
            }

            let scores_log: Vec<_> = history.iter().map(|a| a.scores).collect();
            for attempt in &history {
                println!(
                    "{}  avg {:.1}  ({})",
                    attempt.at.format("%Y-%m-%d %H:%M"),
                    attempt.scores.average(),
                    attempt.scores
                );
            }

            let latest = &history[history.len() - 1];
            if let Some(delta) = latest.scores.delta(select_previous(&scores_log)) {
                println!();
                println!(
                    "Since previous attempt: Fluency {:+} · Vocabulary {:+} · Grammar {:+} · Clarity {:+}",
                    delta.fluency, delta.vocabulary, delta.grammar, delta.clarity
                );
            }
        }

        Command::Say { text, out } => {
            let Some(synthesizer) = build_synthesizer(&config)? else {
                anyhow::bail!("synthesis is disabled in the configuration");
            };
            let audio = synthesizer.synthesize(&text).await?;
            std::fs::write(&out, audio)?;
            println!("Audio written to {}", out.display());
        }
    }

    Ok(())
}

fn build_transcriber(config: &Config) -> Result<Arc<dyn Transcriber>, Error> {
    match config.voice.stt_provider.as_str() {
        "whisper" | "openai" => Ok(Arc::new(WhisperTranscriber::new(
            config.api_keys.openai.clone(),
            config.voice.stt_model.clone(),
        )?)),
        "deepgram" => Ok(Arc::new(DeepgramTranscriber::new(
            config.api_keys.deepgram.clone(),
            config.voice.stt_model.clone(),
        )?)),
        other => Err(Error::Config(format!("unknown STT provider: {other}"))),
    }
}

fn build_grader(config: &Config) -> Result<Arc<dyn Grader>, Error> {
    Ok(Arc::new(OpenAiGrader::new(
        config.api_keys.openai.clone(),
        config.grading.model.clone(),
        config.grading.scale,
    )?))
}

#[allow(clippy::cast_possible_truncation)]
fn build_synthesizer(config: &Config) -> Result<Option<Arc<dyn SpeechSynthesizer>>, Error> {
    if !config.voice.synthesize {
        return Ok(None);
    }

    match config.voice.tts_provider.as_str() {
        "openai" => Ok(Some(Arc::new(OpenAiSynthesizer::new(
            config.api_keys.openai.clone(),
            config.voice.tts_voice.clone(),
            config.voice.tts_speed as f32,
            config.voice.tts_model.clone(),
        )?))),
        "elevenlabs" => Ok(Some(Arc::new(ElevenLabsSynthesizer::new(
            config.api_keys.elevenlabs.clone(),
            config.voice.tts_voice.clone(),
            config.voice.tts_model.clone(),
        )?))),
        other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
    }
}

fn build_store(config: &Config) -> Result<Arc<dyn QuestionStore>, Error> {
    match &config.storage {
        StorageConfig::Sqlite { path } => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        StorageConfig::Sheets {
            spreadsheet_id,
            service_account_path,
        } => Ok(Arc::new(SheetsStore::new(
            spreadsheet_id.clone(),
            service_account_path.clone(),
        ))),
    }
}
