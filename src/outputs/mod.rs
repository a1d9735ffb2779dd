//! Output generation for the quiz artifact.
//!
//! # Submodules
//!
//! - [`json`]: Writes a `QuizDataset` to the JSON artifact and reads it back
//!
//! # Output Structure
//!
//! ```text
//! output_path (default questions.json)
//! └── {"date": "YYYY-MM-DD", "questions": [...]}
//! ```

pub mod json;
