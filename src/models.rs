//! Data models for headlines, quiz questions, and the persisted quiz artifact.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Headline`]: A single news article title used as grounding material
//! - [`CandidateQuestion`]: A question as decoded from generated or stored JSON,
//!   before structural validation
//! - [`QuizQuestion`]: A validated question with exactly four answers
//! - [`QuizDataset`]: The questions of one run plus the day they were generated for
//!
//! The question models use camelCase field names to match the JSON contract
//! shared with the generation service and the presentation layer, hence the
//! `#[allow(non_snake_case)]` attributes.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::{QuizError, QuizResult};

/// Number of answer options every question carries.
pub const ANSWER_COUNT: usize = 4;

/// A news article title. Order follows the API's relevance ranking.
pub type Headline = String;

/// A question as it arrives from the generation service or a stored artifact.
///
/// Every field is optional and the index is a wide signed integer so that
/// structural problems (missing text, three answers, index `-1`) surface as
/// validation failures instead of JSON decoding failures. PascalCase aliases
/// accept artifacts written by older generators.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CandidateQuestion {
    #[serde(alias = "QuestionText")]
    pub questionText: Option<String>,
    #[serde(alias = "Answers")]
    pub answers: Option<Vec<String>>,
    #[serde(alias = "CorrectAnswerIndex")]
    pub correctAnswerIndex: Option<i64>,
}

/// A trivia question that passed structural validation.
///
/// # Invariants
///
/// - `questionText` is non-empty
/// - `answers` holds exactly [`ANSWER_COUNT`] distinct, non-blank strings
/// - `correctAnswerIndex < ANSWER_COUNT`
///
/// Values are never mutated in place; the randomizer builds a new one.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub questionText: String,
    pub answers: [String; ANSWER_COUNT],
    pub correctAnswerIndex: usize,
}

impl QuizQuestion {
    /// The answer string the index currently points at.
    pub fn correct_answer(&self) -> &str {
        &self.answers[self.correctAnswerIndex]
    }
}

impl TryFrom<CandidateQuestion> for QuizQuestion {
    type Error = String;

    fn try_from(candidate: CandidateQuestion) -> Result<Self, Self::Error> {
        let text = candidate.questionText.unwrap_or_default();
        if text.trim().is_empty() {
            return Err("question text is empty".to_string());
        }

        let answers = candidate.answers.unwrap_or_default();
        let found = answers.len();
        let answers: [String; ANSWER_COUNT] = answers
            .try_into()
            .map_err(|_| format!("expected {ANSWER_COUNT} answers, found {found}"))?;

        if answers.iter().any(|a| a.trim().is_empty()) {
            return Err("an answer is empty".to_string());
        }
        if answers.iter().map(|a| a.trim()).unique().count() != ANSWER_COUNT {
            return Err("answers are not distinct".to_string());
        }

        let index = match candidate.correctAnswerIndex {
            Some(i) if (0..ANSWER_COUNT as i64).contains(&i) => i as usize,
            Some(i) => return Err(format!("correct answer index {i} is outside 0..=3")),
            None => return Err("correct answer index is missing".to_string()),
        };

        Ok(QuizQuestion {
            questionText: text,
            answers,
            correctAnswerIndex: index,
        })
    }
}

/// Validate a whole batch. One bad question rejects the batch; nothing is
/// partially accepted.
pub fn validate_questions(candidates: Vec<CandidateQuestion>) -> QuizResult<Vec<QuizQuestion>> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| {
            QuizQuestion::try_from(candidate).map_err(|reason| {
                QuizError::InvalidQuestionFormat(format!("question {}: {reason}", i + 1))
            })
        })
        .collect()
}

/// The questions produced by one run, persisted as the quiz artifact.
///
/// Serialized as `{"date": "YYYY-MM-DD", "questions": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizDataset {
    /// The news day the questions were generated from.
    pub date: NaiveDate,
    pub questions: Vec<QuizQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, answers: &[&str], index: i64) -> CandidateQuestion {
        CandidateQuestion {
            questionText: Some(text.to_string()),
            answers: Some(answers.iter().map(|a| a.to_string()).collect()),
            correctAnswerIndex: Some(index),
        }
    }

    #[test]
    fn test_valid_candidate_converts() {
        let q = QuizQuestion::try_from(candidate("Who won?", &["A", "B", "C", "D"], 2)).unwrap();
        assert_eq!(q.questionText, "Who won?");
        assert_eq!(q.correctAnswerIndex, 2);
        assert_eq!(q.correct_answer(), "C");
    }

    #[test]
    fn test_rejects_wrong_answer_count() {
        let err = QuizQuestion::try_from(candidate("Q?", &["A", "B", "C"], 0)).unwrap_err();
        assert!(err.contains("found 3"));
        let err = QuizQuestion::try_from(candidate("Q?", &["A", "B", "C", "D", "E"], 0)).unwrap_err();
        assert!(err.contains("found 5"));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        assert!(QuizQuestion::try_from(candidate("Q?", &["A", "B", "C", "D"], 4)).is_err());
        assert!(QuizQuestion::try_from(candidate("Q?", &["A", "B", "C", "D"], -1)).is_err());
    }

    #[test]
    fn test_rejects_empty_text_and_missing_fields() {
        assert!(QuizQuestion::try_from(candidate("  ", &["A", "B", "C", "D"], 0)).is_err());
        assert!(QuizQuestion::try_from(CandidateQuestion::default()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_answers() {
        let err = QuizQuestion::try_from(candidate("Q?", &["A", "B", "A", "D"], 0)).unwrap_err();
        assert!(err.contains("distinct"));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let batch = vec![
            candidate("First?", &["A", "B", "C", "D"], 0),
            candidate("Second?", &["A", "B", "C"], 0),
            candidate("Third?", &["A", "B", "C", "D"], 1),
        ];
        let err = validate_questions(batch).unwrap_err();
        assert!(matches!(err, QuizError::InvalidQuestionFormat(ref m) if m.contains("question 2")));
    }

    #[test]
    fn test_candidate_accepts_pascal_case() {
        let json = r#"{"QuestionText":"Q?","Answers":["A","B","C","D"],"CorrectAnswerIndex":0}"#;
        let c: CandidateQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(c.questionText.as_deref(), Some("Q?"));
        assert_eq!(c.correctAnswerIndex, Some(0));
    }

    #[test]
    fn test_dataset_serialization() {
        let dataset = QuizDataset {
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            questions: vec![QuizQuestion {
                questionText: "Who won?".to_string(),
                answers: ["A".into(), "B".into(), "C".into(), "D".into()],
                correctAnswerIndex: 1,
            }],
        };
        let json = serde_json::to_value(&dataset).unwrap();
        assert_eq!(json["date"], "2025-05-06");
        assert_eq!(json["questions"][0]["questionText"], "Who won?");
        assert_eq!(json["questions"][0]["answers"][3], "D");
        assert_eq!(json["questions"][0]["correctAnswerIndex"], 1);
    }
}
