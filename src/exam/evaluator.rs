use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use super::answer::{parse_answer, BlankAnswer, OptionAnswer, StructuredAnswer};
use super::metrics::{answers_match, custom_accuracy, score, ClassificationScore};
use super::model::ChatModel;
use super::prompt::ExamKind;
use super::questions::{load_questions, ExamItem};
use super::ExamError;

/// Metrics for one question file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExamMetrics {
    /// Fill-in-the-blank scoring.
    FillInBlank {
        /// Raw number of correct answers.
        correct: usize,
        /// `correct` over answered items.
        accuracy: f64,
    },
    /// Multiple-choice scoring.
    MultipleChoice(ClassificationScore),
}

/// Outcome of evaluating one question file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    /// Items in the file.
    pub total: usize,
    /// Items that produced a prediction.
    pub answered: usize,
    /// Scores over answered items.
    pub metrics: ExamMetrics,
}

/// Outcome of an exam run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExamReport {
    /// Per-file reports keyed by file path.
    pub files: BTreeMap<String, FileReport>,
    /// Items answered incorrectly, across all files.
    pub wrong: Vec<ExamItem>,
}

impl ExamReport {
    /// Write the wrongly answered items as a JSON array.
    pub fn write_wrong_answers(&self, path: &Path) -> Result<(), ExamError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.wrong)?;
        Ok(())
    }
}

struct Predictions {
    truths: Vec<String>,
    predicted: Vec<String>,
    wrong: Vec<ExamItem>,
}

/// Drives a chat model through question files, one item at a time.
#[derive(Debug)]
pub struct ExamEvaluator<M> {
    model: M,
    kind: ExamKind,
}

impl<M: ChatModel> ExamEvaluator<M> {
    /// Evaluator asking `kind` questions of `model`.
    pub fn new(model: M, kind: ExamKind) -> Self {
        Self { model, kind }
    }

    /// Ask the model one question and return its predicted label.
    pub async fn answer(&self, item: &ExamItem) -> Result<String, ExamError> {
        if self.kind == ExamKind::MultipleChoice && item.options.is_none() {
            return Err(ExamError::Parse("multiple-choice item has no options".to_string()));
        }
        let messages = self.kind.messages(item);
        let format = self.kind.response_format();
        let reply = self.model.complete(&messages, Some(&format)).await?;
        match self.kind {
            ExamKind::FillInBlank => Ok(parse_answer::<BlankAnswer>(&reply)?.prediction()),
            ExamKind::MultipleChoice => Ok(parse_answer::<OptionAnswer>(&reply)?.prediction()),
        }
    }

    async fn predict(&self, items: &[ExamItem]) -> Predictions {
        let mut out = Predictions {
            truths: Vec::with_capacity(items.len()),
            predicted: Vec::with_capacity(items.len()),
            wrong: Vec::new(),
        };
        for (index, item) in items.iter().enumerate() {
            match self.answer(item).await {
                Ok(prediction) => {
                    if !answers_match(&item.correct_answer, &prediction) {
                        out.wrong.push(item.clone());
                    }
                    out.truths.push(item.correct_answer.clone());
                    out.predicted.push(prediction);
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "no prediction for item");
                }
            }
        }
        out
    }

    /// Score a list of items. Returns the report and the wrongly answered
    /// items.
    pub async fn evaluate_items(&self, items: &[ExamItem]) -> Result<(FileReport, Vec<ExamItem>), ExamError> {
        let Predictions {
            truths,
            predicted,
            wrong,
        } = self.predict(items).await;
        let metrics = match self.kind {
            ExamKind::FillInBlank => {
                let correct = custom_accuracy(&truths, &predicted)?;
                let accuracy = if truths.is_empty() {
                    0.0
                } else {
                    correct as f64 / truths.len() as f64
                };
                ExamMetrics::FillInBlank { correct, accuracy }
            }
            ExamKind::MultipleChoice => ExamMetrics::MultipleChoice(score(&truths, &predicted)?),
        };
        let report = FileReport {
            total: items.len(),
            answered: truths.len(),
            metrics,
        };
        Ok((report, wrong))
    }

    /// Evaluate each question file in turn.
    pub async fn evaluate_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<ExamReport, ExamError> {
        let mut report = ExamReport::default();
        for path in paths {
            let path = path.as_ref();
            let items = load_questions(path)?;
            tracing::info!(file = %path.display(), items = items.len(), model = self.model.model_name(), "evaluating");
            let (file_report, wrong) = self.evaluate_items(&items).await?;
            tracing::info!(file = %path.display(), answered = file_report.answered, metrics = ?file_report.metrics, "evaluated");
            report.files.insert(path.display().to_string(), file_report);
            report.wrong.extend(wrong);
        }
        Ok(report)
    }
}
