//! Settings resolution.
//!
//! Values come from three layers, highest priority first: command-line flags
//! (or their environment variables), an optional YAML settings file, and
//! built-in defaults. The result is a validated [`PipelineConfig`]; nothing
//! downstream re-checks it.
//!
//! ```yaml
//! news_api_key: "..."
//! openai_api_key: "..."
//! output_path: public/questions.json
//! question_count: 5
//! topic: Israel
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

use crate::api::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::cli::Cli;
use crate::errors::{QuizError, QuizResult};
use crate::headlines::newsapi::DEFAULT_MAX_HEADLINES;
use crate::pipeline::RunOptions;

pub const DEFAULT_OUTPUT_PATH: &str = "questions.json";
pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const DEFAULT_TOPIC: &str = "Israel";

const NEWS_API_KEY_PLACEHOLDER: &str = "YOUR_NEWSAPI_KEY";
const OPENAI_KEY_PLACEHOLDER: &str = "YOUR_OPENAI_KEY";

/// Contents of the optional YAML settings file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizSettings {
    pub news_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub output_path: Option<PathBuf>,
    pub question_count: Option<usize>,
    pub topic: Option<String>,
    pub max_headlines: Option<usize>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl QuizSettings {
    /// Load settings from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> QuizResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            QuizError::Config(format!("cannot read settings file {}: {e}", path.display()))
        })?;
        let settings = Self::from_yaml(&raw)?;
        info!("Loaded settings file");
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> QuizResult<Self> {
        serde_yaml::from_str(raw).map_err(|e| QuizError::Config(format!("invalid settings file: {e}")))
    }
}

/// Fully resolved, validated configuration for the pipeline and its clients.
#[derive(Clone)]
pub struct PipelineConfig {
    pub news_api_key: String,
    pub openai_api_key: String,
    pub news_api_url: String,
    pub openai_api_url: String,
    pub output_path: PathBuf,
    pub question_count: usize,
    pub max_headlines: usize,
    pub topic: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("news_api_url", &self.news_api_url)
            .field("openai_api_url", &self.openai_api_url)
            .field("output_path", &self.output_path)
            .field("question_count", &self.question_count)
            .field("max_headlines", &self.max_headlines)
            .field("topic", &self.topic)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl PipelineConfig {
    /// Merge CLI values over `settings` over defaults, then validate.
    ///
    /// # Errors
    ///
    /// [`QuizError::Config`] when an API key is missing or still a
    /// placeholder, or when a count is zero.
    pub fn resolve(cli: &Cli, settings: QuizSettings) -> QuizResult<Self> {
        let news_api_key = require_key(
            cli.news_api_key.clone().or(settings.news_api_key),
            "NewsAPI",
            NEWS_API_KEY_PLACEHOLDER,
        )?;
        let openai_api_key = require_key(
            cli.openai_api_key.clone().or(settings.openai_api_key),
            "OpenAI",
            OPENAI_KEY_PLACEHOLDER,
        )?;

        let question_count = cli
            .question_count
            .or(settings.question_count)
            .unwrap_or(DEFAULT_QUESTION_COUNT);
        if question_count == 0 {
            return Err(QuizError::Config("question count must be at least 1".to_string()));
        }
        let max_headlines = cli
            .max_headlines
            .or(settings.max_headlines)
            .unwrap_or(DEFAULT_MAX_HEADLINES);
        if max_headlines == 0 {
            return Err(QuizError::Config("max headlines must be at least 1".to_string()));
        }

        let temperature = cli
            .temperature
            .or(settings.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(QuizError::Config(format!(
                "temperature {temperature} is outside 0.0..=2.0"
            )));
        }

        Ok(Self {
            news_api_key,
            openai_api_key,
            news_api_url: cli.news_api_url.clone(),
            openai_api_url: cli.openai_api_url.clone(),
            output_path: cli
                .output
                .clone()
                .or(settings.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            question_count,
            max_headlines,
            topic: cli
                .topic
                .clone()
                .or(settings.topic)
                .unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
            model: cli
                .model
                .clone()
                .or(settings.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            timeout: Duration::from_secs(cli.timeout_secs),
        })
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            question_count: self.question_count,
            max_headlines: self.max_headlines,
            output_path: self.output_path.clone(),
        }
    }
}

/// Output path only, for `--check`, which needs no API keys.
pub fn resolve_output_path(cli: &Cli, settings: &QuizSettings) -> PathBuf {
    cli.output
        .clone()
        .or_else(|| settings.output_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH))
}

fn require_key(value: Option<String>, name: &str, placeholder: &str) -> QuizResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(key) if !key.is_empty() && key != placeholder => Ok(key),
        _ => Err(QuizError::Config(format!("Please set your {name} API key"))),
    }
}
