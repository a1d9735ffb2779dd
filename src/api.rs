//! Chat-completion API interaction.
//!
//! This module provides the narrow interface the quiz generator needs from an
//! OpenAI-compatible chat-completion service: one system instruction plus one
//! user prompt in, one [`Completion`] out.
//!
//! # Architecture
//!
//! - [`ChatClient`]: Core trait defining a single async completion call
//! - [`OpenAiChatClient`]: `reqwest` implementation against `/v1/chat/completions`
//!
//! There is deliberately no retry wrapper: each run makes a single attempt and
//! a failure ends the run.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::errors::{QuizError, QuizResult};
use crate::utils::truncate_for_log;

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Error object returned by the API on an unsuccessful completion.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Outcome of one completion call, before any interpretation of the content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// HTTP success and no error object in the payload.
    pub successful: bool,
    pub error: Option<ApiErrorBody>,
    /// Content of the first choice's message.
    pub content: Option<String>,
}

/// Trait for async chat-completion calls.
///
/// Implementors send a system instruction and a user prompt and report the
/// raw completion. Transport problems are errors; API-level failures are
/// reported through [`Completion::successful`].
pub trait ChatClient {
    async fn complete(&self, system: &str, user: &str) -> QuizResult<Completion>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// [`ChatClient`] for OpenAI-compatible `chat/completions` endpoints.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiChatClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiChatClient {
    /// Create a client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the chat-completions endpoint
    /// * `api_key` - Bearer token
    /// * `model` - Model name, e.g. `gpt-4`
    /// * `temperature` - Sampling temperature; keep it low for factual output
    /// * `timeout` - Whole-request timeout
    pub fn new(
        endpoint: &str,
        api_key: &str,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> QuizResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("news_quiz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QuizError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        })
    }
}

impl ChatClient for OpenAiChatClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> QuizResult<Completion> {
        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let t0 = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();
        debug!(%status, bytes = body.len(), elapsed_ms = dt.as_millis() as u64, "Completion received");

        completion_from_body(status, &body)
    }
}

/// Interpret a chat-completion response body.
fn completion_from_body(status: StatusCode, body: &str) -> QuizResult<Completion> {
    let parsed: ChatCompletionResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) if status.is_success() => {
            return Err(QuizError::GenerationApi(format!(
                "unreadable completion payload: {e}"
            )));
        }
        Err(_) => {
            warn!(%status, body = %truncate_for_log(body, 300), "Completion failed with non-JSON body");
            ChatCompletionResponse::default()
        }
    };

    let successful = status.is_success() && parsed.error.is_none();
    let error = match (successful, parsed.error) {
        (false, None) if !status.is_success() => Some(ApiErrorBody {
            message: Some(format!("HTTP {status}")),
            kind: None,
        }),
        (_, error) => error,
    };
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content);

    Ok(Completion {
        successful,
        error,
        content,
    })
}
