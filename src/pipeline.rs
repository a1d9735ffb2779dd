//! Single-run orchestration of the quiz pipeline.
//!
//! A run moves through
//! `Idle → FetchingHeadlines → Generating → Randomizing → Persisting → Done`
//! and drops to `Failed` on the first stage error. Nothing is written before
//! `Persisting`, so a failed run leaves the previous artifact untouched.
//! There are no retries; scheduling repeated runs is the caller's business.

use chrono::NaiveDate;
use rand::Rng;
use std::path::PathBuf;
use tracing::{error, info, instrument};

use crate::errors::{QuizError, RunError, Stage};
use crate::generator::QuizGenerator;
use crate::headlines::HeadlineSource;
use crate::models::QuizDataset;
use crate::outputs::json::write_quiz;
use crate::randomizer::randomize;

/// Lifecycle of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    FetchingHeadlines,
    Generating,
    Randomizing,
    Persisting,
    Done,
    Failed,
}

/// Per-run knobs, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub question_count: usize,
    pub max_headlines: usize,
    pub output_path: PathBuf,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub date: NaiveDate,
    pub headline_count: usize,
    pub question_count: usize,
    pub path: PathBuf,
}

/// Tracks the state of the run in progress.
#[derive(Debug)]
struct RunTracker {
    state: RunState,
}

impl RunTracker {
    fn new() -> Self {
        Self {
            state: RunState::Idle,
        }
    }

    fn advance(&mut self, next: RunState) {
        info!(from = ?self.state, to = ?next, "Run state transition");
        self.state = next;
    }

    fn fail(&mut self, stage: Stage, source: QuizError) -> RunError {
        error!(from = ?self.state, %stage, error = %source, "Run failed");
        self.state = RunState::Failed;
        RunError { stage, source }
    }
}

/// Sequences headline retrieval, generation, randomization and persistence.
#[derive(Debug)]
pub struct Pipeline<H, G> {
    source: H,
    generator: G,
    options: RunOptions,
}

impl<H: HeadlineSource, G: QuizGenerator> Pipeline<H, G> {
    pub fn new(source: H, generator: G, options: RunOptions) -> Self {
        Self {
            source,
            generator,
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run once for the news of `day`.
    pub async fn run(&self, day: NaiveDate) -> Result<RunReport, RunError> {
        self.run_with_rng(day, &mut rand::rng()).await
    }

    /// Run once for `day`, drawing answer positions from `rng`.
    #[instrument(level = "info", skip(self, rng), fields(output = %self.options.output_path.display()))]
    pub async fn run_with_rng<R: Rng>(
        &self,
        day: NaiveDate,
        rng: &mut R,
    ) -> Result<RunReport, RunError> {
        let mut run = RunTracker::new();

        run.advance(RunState::FetchingHeadlines);
        let headlines = self
            .source
            .fetch_headlines(day, self.options.max_headlines)
            .await
            .map_err(|e| run.fail(Stage::FetchingHeadlines, e))?;
        if headlines.is_empty() {
            return Err(run.fail(
                Stage::FetchingHeadlines,
                QuizError::NoResults(format!("No headlines found for {day}")),
            ));
        }
        info!(count = headlines.len(), "Found headlines");

        run.advance(RunState::Generating);
        let questions = self
            .generator
            .generate_quiz(&headlines, self.options.question_count)
            .await
            .map_err(|e| run.fail(Stage::Generating, e))?;

        run.advance(RunState::Randomizing);
        let dataset = QuizDataset {
            date: day,
            questions: randomize(&questions, rng),
        };

        run.advance(RunState::Persisting);
        write_quiz(&dataset, &self.options.output_path)
            .await
            .map_err(|e| run.fail(Stage::Persisting, e))?;

        run.advance(RunState::Done);
        Ok(RunReport {
            date: day,
            headline_count: headlines.len(),
            question_count: dataset.questions.len(),
            path: self.options.output_path.clone(),
        })
    }
}
