//! Correct-answer position randomization.
//!
//! The generation service is told to put the correct answer first. Left as
//! is, a player could always pick the first option. Each question gets a
//! uniformly drawn target slot in `0..4`; the correct answer is swapped into
//! it and the index updated. Drawing the current slot is a self-swap and
//! stays in the distribution, so every final position has probability 1/4.

use rand::Rng;
use tracing::{debug, instrument};

use crate::models::{ANSWER_COUNT, QuizQuestion};

/// Move the correct answer of `question` to a uniformly random slot.
///
/// Returns a new value; only answer positions change.
pub fn randomize_question<R: Rng>(question: &QuizQuestion, rng: &mut R) -> QuizQuestion {
    let target = rng.random_range(0..ANSWER_COUNT);
    let mut answers = question.answers.clone();
    answers.swap(question.correctAnswerIndex, target);

    QuizQuestion {
        questionText: question.questionText.clone(),
        answers,
        correctAnswerIndex: target,
    }
}

/// Randomize every question independently.
#[instrument(level = "info", skip_all, fields(count = questions.len()))]
pub fn randomize<R: Rng>(questions: &[QuizQuestion], rng: &mut R) -> Vec<QuizQuestion> {
    let randomized: Vec<QuizQuestion> = questions
        .iter()
        .map(|q| randomize_question(q, rng))
        .collect();
    debug!(
        positions = ?randomized.iter().map(|q| q.correctAnswerIndex).collect::<Vec<_>>(),
        "Randomized correct answer positions"
    );
    randomized
}
