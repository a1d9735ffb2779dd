//! # News Quiz
//!
//! Generates a daily multiple-choice trivia quiz from the previous day's news
//! headlines and writes it as a JSON artifact for a quiz front end.
//!
//! ## Usage
//!
//! ```sh
//! news_quiz --news-api-key NEWS_KEY --openai-api-key OPENAI_KEY -o public/questions.json
//! ```
//!
//! ## Architecture
//!
//! One run is a strictly sequential pipeline:
//! 1. **Headlines**: Fetch the titles published on the target day from NewsAPI
//! 2. **Generation**: Ask a chat-completion model for questions and validate them
//! 3. **Randomization**: Move each correct answer to a uniformly random slot
//! 4. **Output**: Atomically replace the JSON quiz artifact
//!
//! Any stage failure ends the run and leaves the previous artifact in place.
//! `--daily` repeats the run after every local midnight.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tokio::signal;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod errors;
mod generator;
mod headlines;
mod models;
mod outputs;
mod pipeline;
mod randomizer;
mod utils;

use api::OpenAiChatClient;
use cli::Cli;
use config::{PipelineConfig, QuizSettings, resolve_output_path};
use generator::{ChatQuizGenerator, QuizGenerator};
use headlines::HeadlineSource;
use headlines::newsapi::NewsApiClient;
use outputs::json::load_quiz;
use pipeline::Pipeline;
use utils::{duration_until_next_midnight, yesterday_utc};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "news_quiz starting up");
    let args = Cli::parse();

    let settings = match &args.config {
        Some(path) => QuizSettings::load(path)?,
        None => QuizSettings::default(),
    };

    if args.check {
        let path = resolve_output_path(&args, &settings);
        let stored = load_quiz(&path).await?;
        info!(
            path = %path.display(),
            date = ?stored.date,
            questions = stored.questions.len(),
            "Quiz artifact is valid"
        );
        return Ok(());
    }

    let config = PipelineConfig::resolve(&args, settings).inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    info!(?config, "Resolved configuration");

    let source = NewsApiClient::new(
        &config.news_api_url,
        &config.news_api_key,
        &config.topic,
        config.timeout,
    )?;
    let chat = OpenAiChatClient::new(
        &config.openai_api_url,
        &config.openai_api_key,
        &config.model,
        config.temperature,
        config.timeout,
    )?;
    let pipeline = Pipeline::new(source, ChatQuizGenerator::new(chat), config.run_options());

    if args.daily {
        run_daily(&pipeline).await;
        return Ok(());
    }

    let day = args.date.unwrap_or_else(yesterday_utc);
    tokio::select! {
        outcome = run_once(&pipeline, day) => outcome,
        _ = signal::ctrl_c() => {
            warn!("Interrupted; run aborted");
            Err("run aborted".into())
        }
    }
}

/// Execute one run and report its outcome.
#[instrument(level = "info", skip(pipeline))]
async fn run_once<H, G>(pipeline: &Pipeline<H, G>, day: chrono::NaiveDate) -> Result<(), Box<dyn Error>>
where
    H: HeadlineSource,
    G: QuizGenerator,
{
    let start_time = std::time::Instant::now();
    info!(output = %pipeline.options().output_path.display(), "Generating quiz");

    match pipeline.run(day).await {
        Ok(report) => {
            let elapsed = start_time.elapsed();
            info!(
                date = %report.date,
                headlines = report.headline_count,
                questions = report.question_count,
                path = %report.path.display(),
                millis = elapsed.as_millis() as u64,
                "✓ Quiz updated"
            );
            Ok(())
        }
        Err(e) => {
            error!(stage = %e.stage, kind = ?e.kind(), error = %e, "✗ Quiz generation failed");
            Err(Box::new(e))
        }
    }
}

/// Run now and then after every local midnight until interrupted.
///
/// A failed run is logged and the loop keeps going; each run targets the
/// UTC day before it starts.
async fn run_daily<H, G>(pipeline: &Pipeline<H, G>)
where
    H: HeadlineSource,
    G: QuizGenerator,
{
    info!("Quiz generator service started; will generate a quiz after every midnight");

    loop {
        tokio::select! {
            outcome = run_once(pipeline, yesterday_utc()) => {
                if outcome.is_err() {
                    warn!("Run failed; keeping the previous quiz until the next scheduled run");
                }
            }
            _ = signal::ctrl_c() => {
                warn!("Interrupted during a run; shutting down");
                return;
            }
        }

        let wait = duration_until_next_midnight(Local::now());
        info!(hours = wait.as_secs_f64() / 3600.0, "Next quiz scheduled");
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = signal::ctrl_c() => {
                info!("Shutting down");
                return;
            }
        }
    }
}
