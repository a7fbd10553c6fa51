use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ExamError;

/// One exam question.
///
/// Fill-in-the-blank files name the ground truth `correct_answer`;
/// multiple-choice files name it `answer` and carry an `options` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamItem {
    /// Question text.
    pub question: String,
    /// Ground-truth answer.
    #[serde(alias = "answer")]
    pub correct_answer: String,
    /// Option key to option text, for multiple-choice items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
}

impl ExamItem {
    /// Options rendered one per line as `KEY: text`.
    pub fn options_block(&self) -> Option<String> {
        self.options.as_ref().map(|options| {
            options
                .iter()
                .map(|(key, text)| format!("{key}: {text}"))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

/// Load a JSON array of exam items.
pub fn load_questions(path: &Path) -> Result<Vec<ExamItem>, ExamError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
