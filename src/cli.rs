//! Command-line interface definitions for the news quiz generator.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also be provided via environment variables or a YAML
//! settings file (see [`crate::config`]); explicit flags win.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::api::DEFAULT_OPENAI_API_URL;
use crate::headlines::newsapi::DEFAULT_NEWS_API_URL;

/// Command-line arguments for the news quiz generator.
///
/// # Examples
///
/// ```sh
/// # Generate one quiz from yesterday's headlines
/// news_quiz --news-api-key NEWS_KEY --openai-api-key OPENAI_KEY
///
/// # Ten questions about a different topic, written elsewhere
/// news_quiz -n 10 --topic climate -o public/quiz/questions.json
///
/// # Keep running and regenerate after every midnight
/// news_quiz --config quiz.yaml --daily
///
/// # Check an existing artifact without generating anything
/// news_quiz --check -o public/quiz/questions.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, env = "QUIZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Path of the quiz artifact [default: questions.json]
    #[arg(short, long, env = "QUIZ_OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Number of questions to request [default: 5]
    #[arg(short = 'n', long, env = "QUIZ_QUESTION_COUNT")]
    pub question_count: Option<usize>,

    /// Search keyword for headlines [default: Israel]
    #[arg(long, env = "QUIZ_TOPIC")]
    pub topic: Option<String>,

    /// Maximum number of headlines fed to the generator [default: 15]
    #[arg(long)]
    pub max_headlines: Option<usize>,

    /// Chat model name [default: gpt-4]
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature [default: 0.4]
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// NewsAPI search endpoint
    #[arg(long, default_value = DEFAULT_NEWS_API_URL)]
    pub news_api_url: String,

    /// Chat-completions endpoint
    #[arg(long, default_value = DEFAULT_OPENAI_API_URL)]
    pub openai_api_url: String,

    /// News day to build the quiz from, YYYY-MM-DD [default: yesterday, UTC]
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Run now, then again after every local midnight
    #[arg(long, conflicts_with_all = ["date", "check"])]
    pub daily: bool,

    /// Validate the existing artifact at the output path and exit
    #[arg(long)]
    pub check: bool,
}
