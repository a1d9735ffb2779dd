//! Quiz artifact persistence.
//!
//! The artifact is the system of record handed to the presentation layer:
//!
//! ```text
//! {
//!   "date": "2025-05-06",
//!   "questions": [
//!     { "questionText": "...", "answers": ["a", "b", "c", "d"], "correctAnswerIndex": 2 }
//!   ]
//! }
//! ```
//!
//! # Atomic Replace
//!
//! The JSON is written to a hidden sibling temp file and renamed over the
//! target, so a concurrent reader sees either the previous artifact or the
//! new one, never a partial file. The temp file is removed if the write fails
//! or the write future is dropped, e.g. when Ctrl-C aborts a run; a blocking
//! write already handed to the runtime can still land after that. Two runs
//! racing on the same path are not coordinated.

use chrono::NaiveDate;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::errors::{QuizError, QuizResult};
use crate::models::{CandidateQuestion, QuizDataset, QuizQuestion, validate_questions};

/// Write `dataset` as indented JSON to `path`, creating parent directories.
///
/// # Errors
///
/// Any I/O failure (permissions, disk full, invalid path) is returned as
/// [`QuizError::Persistence`]. On failure the previous artifact is untouched.
#[instrument(level = "info", skip_all, fields(path = %path.display(), questions = dataset.questions.len()))]
pub async fn write_quiz(dataset: &QuizDataset, path: &Path) -> QuizResult<()> {
    let mut json = serde_json::to_string_pretty(dataset)
        .map_err(|e| QuizError::persistence(path, io::Error::other(e)))?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        info!(dir = %parent.display(), "Ensuring output directory exists");
        fs::create_dir_all(parent).await.map_err(|e| {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            QuizError::persistence(parent, e)
        })?;
    }

    let mut tmp = TempFile::new(temp_path(path));
    if let Err(e) = fs::write(tmp.path(), json).await {
        error!(tmp = %tmp.path().display(), error = %e, "Failed writing temp file");
        return Err(QuizError::persistence(tmp.path(), e));
    }
    if let Err(e) = fs::rename(tmp.path(), path).await {
        error!(error = %e, "Failed replacing quiz artifact");
        return Err(QuizError::persistence(path, e));
    }
    tmp.persisted();

    info!("Wrote quiz artifact");
    Ok(())
}

/// Removes the temp file on drop unless it was renamed into place.
///
/// Covers early returns as well as a write future dropped mid-flight.
#[derive(Debug)]
struct TempFile {
    path: PathBuf,
    persisted: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persisted(&mut self) {
        self.persisted = true;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "questions.json".to_string());
    path.with_file_name(format!(".{name}.tmp-{}", std::process::id()))
}

/// A quiz read back from an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredQuiz {
    /// Absent when the artifact is a bare array.
    pub date: Option<NaiveDate>,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactShape {
    Bare(Vec<CandidateQuestion>),
    Wrapped {
        #[serde(default, alias = "Date")]
        date: Option<String>,
        #[serde(alias = "Questions")]
        questions: Vec<CandidateQuestion>,
    },
}

/// Read an artifact the way the presentation layer does.
///
/// Accepts a bare array of questions or an object with a `questions` /
/// `Questions` field, in camelCase or PascalCase. Questions are validated
/// with the same rules as freshly generated ones.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_quiz(path: &Path) -> QuizResult<StoredQuiz> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| QuizError::persistence(path, e))?;
    parse_artifact(&raw)
}

fn parse_artifact(raw: &str) -> QuizResult<StoredQuiz> {
    let shape: ArtifactShape = serde_json::from_str(raw).map_err(|e| {
        QuizError::ResponseFormat(format!("quiz artifact is neither an array nor a questions object: {e}"))
    })?;

    let (date, candidates) = match shape {
        ArtifactShape::Bare(questions) => (None, questions),
        ArtifactShape::Wrapped { date, questions } => (date, questions),
    };
    let date = date
        .filter(|d| !d.is_empty())
        .map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|e| QuizError::ResponseFormat(format!("invalid artifact date {d:?}: {e}")))
        })
        .transpose()?;

    Ok(StoredQuiz {
        date,
        questions: validate_questions(candidates)?,
    })
}
