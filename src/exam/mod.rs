//! Exam harness: prompt a hosted chat model with bioinformatics questions and
//! score its structured answers.
//!
//! Two question styles are supported:
//!
//! - **Fill-in-the-blank**: the model supplies the value replacing `[BLANK]`;
//!   scored by trimmed string equality.
//! - **Multiple-choice**: the model picks an option key `A`–`D`; scored with
//!   accuracy and macro precision, recall and F1.
//!
//! Items are answered one at a time. A failed call or unparsable reply is
//! logged and counted as "no prediction", which excludes the item from the
//! metrics.

mod answer;
mod evaluator;
mod metrics;
mod model;
mod prompt;
mod questions;

pub use answer::{extract_json, parse_answer, BlankAnswer, OptionAnswer, OptionKey, StructuredAnswer};
pub use evaluator::{ExamEvaluator, ExamMetrics, ExamReport, FileReport};
pub use metrics::{answers_match, custom_accuracy, score, ClassificationScore};
pub use model::{ChatMessage, ChatModel, ChatModelConfig, OpenAiCompatibleClient, ResponseFormat};
pub use prompt::{format_instructions, ExamKind};
pub use questions::{load_questions, ExamItem};

use thiserror::Error;

/// Errors raised by the exam harness.
#[derive(Error, Debug)]
pub enum ExamError {
    /// Transport-level failure talking to the model endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("chat API error (status {status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// The response carried no message content.
    #[error("chat API response missing content")]
    MissingContent,

    /// The model reply could not be turned into a structured answer.
    #[error("could not parse model answer: {0}")]
    Parse(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed question file or report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ground truths and predictions differ in length.
    #[error("{truths} ground truths but {predictions} predictions")]
    LengthMismatch {
        /// Number of ground-truth labels.
        truths: usize,
        /// Number of predicted labels.
        predictions: usize,
    },
}
