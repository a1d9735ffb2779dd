//! Quiz generation from headlines.
//!
//! [`ChatQuizGenerator`] turns a headline list into validated
//! [`QuizQuestion`]s by prompting a [`ChatClient`] and enforcing the
//! structural contract on whatever comes back:
//!
//! 1. The completion must be successful, otherwise [`QuizError::GenerationApi`]
//! 2. Its content must be non-blank, otherwise [`QuizError::EmptyResponse`]
//! 3. The content must decode as a non-empty JSON array, otherwise
//!    [`QuizError::ResponseParse`]
//! 4. Every question must be well formed, otherwise the whole batch fails with
//!    [`QuizError::InvalidQuestionFormat`]

pub mod prompt;

use tracing::{debug, info, instrument, warn};

use crate::api::{ChatClient, Completion};
use crate::errors::{QuizError, QuizResult};
use crate::models::{CandidateQuestion, Headline, QuizQuestion, validate_questions};
use crate::utils::{looks_truncated, truncate_for_log};

/// Capability to produce trivia questions from headlines.
pub trait QuizGenerator {
    /// Generate questions grounded in `headlines`.
    ///
    /// `headlines` must be non-empty; the orchestrator checks this first.
    async fn generate_quiz(
        &self,
        headlines: &[Headline],
        question_count: usize,
    ) -> QuizResult<Vec<QuizQuestion>>;
}

/// [`QuizGenerator`] backed by a chat-completion service.
#[derive(Debug)]
pub struct ChatQuizGenerator<C> {
    client: C,
}

impl<C: ChatClient> ChatQuizGenerator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: ChatClient> QuizGenerator for ChatQuizGenerator<C> {
    #[instrument(level = "info", skip_all, fields(headlines = headlines.len(), question_count = question_count))]
    async fn generate_quiz(
        &self,
        headlines: &[Headline],
        question_count: usize,
    ) -> QuizResult<Vec<QuizQuestion>> {
        let user_prompt = prompt::build_prompt(headlines, question_count);
        let completion = self.client.complete(prompt::SYSTEM_PROMPT, &user_prompt).await?;
        let content = completion_content(completion)?;
        let questions = parse_quiz(&content)?;

        if questions.len() != question_count {
            warn!(
                requested = question_count,
                received = questions.len(),
                "Generation service returned a different number of questions"
            );
        }
        for q in &questions {
            debug!(question = %q.questionText, answer = %q.correct_answer(), "Generated question");
        }
        info!(count = questions.len(), "Generated quiz questions");
        Ok(questions)
    }
}

/// Extract the message content of a successful completion.
fn completion_content(completion: Completion) -> QuizResult<String> {
    if !completion.successful {
        if let Some(err) = &completion.error {
            warn!(kind = ?err.kind, message = ?err.message, "Completion reported an error");
        }
        let message = completion
            .error
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(QuizError::GenerationApi(message));
    }

    match completion.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(QuizError::EmptyResponse(
            "Received empty response from the generation service".to_string(),
        )),
    }
}

/// Decode and validate generated content as a batch of questions.
pub fn parse_quiz(content: &str) -> QuizResult<Vec<QuizQuestion>> {
    let candidates: Vec<CandidateQuestion> = serde_json::from_str(content.trim()).map_err(|e| {
        let hint = if looks_truncated(&e) {
            " (response appears truncated)"
        } else {
            ""
        };
        QuizError::ResponseParse(format!(
            "{e}{hint}; response: {}",
            truncate_for_log(content, 300)
        ))
    })?;

    if candidates.is_empty() {
        return Err(QuizError::ResponseParse(
            "response contained no questions".to_string(),
        ));
    }

    validate_questions(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorBody;
    use crate::errors::ErrorKind;
    use std::sync::Mutex;

    /// Canned chat client that records the prompts it receives.
    struct CannedChat {
        completion: QuizResult<Completion>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl CannedChat {
        fn content(content: &str) -> Self {
            Self::completion(Completion {
                successful: true,
                error: None,
                content: Some(content.to_string()),
            })
        }

        fn completion(completion: Completion) -> Self {
            Self {
                completion: Ok(completion),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatClient for CannedChat {
        async fn complete(&self, system: &str, user: &str) -> QuizResult<Completion> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            match &self.completion {
                Ok(c) => Ok(c.clone()),
                Err(e) => Err(QuizError::Transport {
                    message: e.to_string(),
                    source: None,
                }),
            }
        }
    }

    fn headlines() -> Vec<Headline> {
        vec!["Team X wins championship".to_string()]
    }

    #[tokio::test]
    async fn test_generates_valid_batch() {
        let content = r#"[{"questionText":"Who won?","answers":["Team X","Team Y","Team Z","Team W"],"correctAnswerIndex":0}]"#;
        let generator = ChatQuizGenerator::new(CannedChat::content(content));
        let questions = generator.generate_quiz(&headlines(), 1).await.unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer(), "Team X");

        let prompts = generator.client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, prompt::SYSTEM_PROMPT);
        assert!(prompts[0].1.contains("Team X wins championship"));
    }

    #[tokio::test]
    async fn test_unsuccessful_completion_surfaces_message() {
        let generator = ChatQuizGenerator::new(CannedChat::completion(Completion {
            successful: false,
            error: Some(ApiErrorBody {
                message: Some("Invalid API key".to_string()),
                kind: None,
            }),
            content: None,
        }));
        let err = generator.generate_quiz(&headlines(), 1).await.unwrap_err();
        assert!(matches!(err, QuizError::GenerationApi(ref m) if m == "Invalid API key"));
    }

    #[tokio::test]
    async fn test_unsuccessful_completion_without_error_object() {
        let generator = ChatQuizGenerator::new(CannedChat::completion(Completion::default()));
        let err = generator.generate_quiz(&headlines(), 1).await.unwrap_err();
        assert!(matches!(err, QuizError::GenerationApi(ref m) if m == "unknown error"));
    }

    #[tokio::test]
    async fn test_empty_content() {
        let generator = ChatQuizGenerator::new(CannedChat::content("   "));
        let err = generator.generate_quiz(&headlines(), 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let generator = ChatQuizGenerator::new(CannedChat {
            completion: Err(QuizError::Transport {
                message: "connection reset".to_string(),
                source: None,
            }),
            prompts: Mutex::new(Vec::new()),
        });
        let err = generator.generate_quiz(&headlines(), 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_quiz("not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseParse);
        assert!(err.to_string().contains("not json"));
    }

    #[test]
    fn test_parse_rejects_wrong_shape_and_empty_array() {
        assert_eq!(
            parse_quiz(r#"{"questionText": "Q?"}"#).unwrap_err().kind(),
            ErrorKind::ResponseParse
        );
        assert_eq!(parse_quiz("[]").unwrap_err().kind(), ErrorKind::ResponseParse);
    }

    #[test]
    fn test_parse_flags_truncation() {
        let err = parse_quiz(r#"[{"questionText": "Who"#).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_parse_rejects_whole_batch_on_one_bad_question() {
        let content = r#"[
            {"questionText":"Good?","answers":["A","B","C","D"],"correctAnswerIndex":0},
            {"questionText":"Bad?","answers":["A","B","C"],"correctAnswerIndex":0}
        ]"#;
        assert_eq!(
            parse_quiz(content).unwrap_err().kind(),
            ErrorKind::InvalidQuestionFormat
        );

        let content = r#"[{"questionText":"Q?","answers":["A","B","C","D"],"correctAnswerIndex":7}]"#;
        assert_eq!(
            parse_quiz(content).unwrap_err().kind(),
            ErrorKind::InvalidQuestionFormat
        );

        let content = r#"[{"questionText":"","answers":["A","B","C","D"],"correctAnswerIndex":0}]"#;
        assert_eq!(
            parse_quiz(content).unwrap_err().kind(),
            ErrorKind::InvalidQuestionFormat
        );
    }

    #[test]
    fn test_parse_accepts_pascal_case_fields() {
        let content = r#"[{"QuestionText":"Q?","Answers":["A","B","C","D"],"CorrectAnswerIndex":3}]"#;
        let questions = parse_quiz(content).unwrap();
        assert_eq!(questions[0].correct_answer(), "D");
    }
}
