//! Prompt text sent to the generation service.

use itertools::Itertools;

use crate::models::Headline;

pub const SYSTEM_PROMPT: &str = "You are a news quiz generator. Create interesting trivia questions based on recent news headlines. Each question should be clear and precise, with 4 answer options where only one is correct. Create questions that test real knowledge about the events in the news, not general questions or guessing.";

/// Build the user prompt asking for `question_count` questions about `headlines`.
///
/// The service is told to put the correct answer first; positions are
/// shuffled afterwards by the randomizer.
pub fn build_prompt(headlines: &[Headline], question_count: usize) -> String {
    let headline_list = headlines.iter().map(|h| format!("- {h}")).join("\n");

    format!(
        r#"Create exactly {question_count} trivia questions about yesterday's news headlines.
The questions must be based directly on concrete facts in the headlines below, not general trivia.
For each headline, provide at least one specific question related to the main event mentioned in the headline.
For each question, create 4 distinct possible answers where only one is correct.

Return JSON only, with no surrounding text or code fences, as an array in the following format:
[
  {{
    "questionText": "Question about a news event",
    "answers": ["Correct answer", "Wrong answer 1", "Wrong answer 2", "Wrong answer 3"],
    "correctAnswerIndex": 0
  }}
]

Always place the correct answer at position 0 and set "correctAnswerIndex" to 0.

Yesterday's headlines:
{headline_list}
"#
    )
}
