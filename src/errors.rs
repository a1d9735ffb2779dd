//! Error taxonomy for a quiz generation run.
//!
//! Every component reports failures through [`QuizError`]. The orchestrator
//! attaches the stage that failed by wrapping it in [`RunError`], which is
//! what the caller of a run finally sees.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A failure raised by one of the pipeline components.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Connection failure or timeout talking to a third-party API.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The headline API answered with a status other than "ok".
    #[error("Headline API error: {0}")]
    UpstreamStatus(String),

    /// The headline API reported zero results for the window.
    #[error("No results: {0}")]
    NoResults(String),

    /// The headline API payload did not match the expected envelope.
    #[error("Unexpected headline response format: {0}")]
    ResponseFormat(String),

    /// The generation API reported an unsuccessful completion.
    #[error("Generation API error: {0}")]
    GenerationApi(String),

    /// The generation API succeeded but returned no content.
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// The generated content is not a JSON array of questions.
    #[error("Failed to parse generated quiz: {0}")]
    ResponseParse(String),

    /// At least one generated question broke the structural contract.
    #[error("Invalid question format: {0}")]
    InvalidQuestionFormat(String),

    /// Writing or reading the quiz artifact failed.
    #[error("Persistence error at {}: {}", .path.display(), .source)]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Settings could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Stable discriminant of a [`QuizError`], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    UpstreamStatus,
    NoResults,
    ResponseFormat,
    GenerationApi,
    EmptyResponse,
    ResponseParse,
    InvalidQuestionFormat,
    Persistence,
    Config,
}

impl QuizError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::Transport { .. } => ErrorKind::Transport,
            QuizError::UpstreamStatus(_) => ErrorKind::UpstreamStatus,
            QuizError::NoResults(_) => ErrorKind::NoResults,
            QuizError::ResponseFormat(_) => ErrorKind::ResponseFormat,
            QuizError::GenerationApi(_) => ErrorKind::GenerationApi,
            QuizError::EmptyResponse(_) => ErrorKind::EmptyResponse,
            QuizError::ResponseParse(_) => ErrorKind::ResponseParse,
            QuizError::InvalidQuestionFormat(_) => ErrorKind::InvalidQuestionFormat,
            QuizError::Persistence { .. } => ErrorKind::Persistence,
            QuizError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QuizError::Persistence {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for QuizError {
    /// The request URL is stripped first: NewsAPI carries its key in the query.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("failed to connect: {err}")
        } else {
            err.to_string()
        };
        QuizError::Transport {
            message,
            source: Some(err),
        }
    }
}

/// The pipeline stage a run was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingHeadlines,
    Generating,
    Persisting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchingHeadlines => "Fetching headlines",
            Stage::Generating => "Generating quiz",
            Stage::Persisting => "Persisting quiz",
        };
        f.write_str(name)
    }
}

/// Terminal failure of a single run: which stage failed and why.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: QuizError,
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

pub type QuizResult<T> = Result<T, QuizError>;
