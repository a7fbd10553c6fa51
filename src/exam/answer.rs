//! Structured answers returned by the model.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ExamError;

/// An answer shape the model is asked to produce.
pub trait StructuredAnswer: DeserializeOwned {
    /// Schema name sent with the request.
    const NAME: &'static str;

    /// JSON schema of the answer object.
    fn schema() -> Value;

    /// The predicted label compared against ground truth.
    fn prediction(&self) -> String;
}

/// Value replacing `[BLANK]` in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankAnswer {
    /// The blank value.
    #[serde(rename = "BLANK")]
    pub blank: String,
}

impl StructuredAnswer for BlankAnswer {
    const NAME: &'static str = "QuestionAnswer";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "BLANK": {
                    "type": "string",
                    "description": "the blank value that should replace the '[BLANK]' in the statement"
                }
            },
            "required": ["BLANK"],
            "additionalProperties": false
        })
    }

    fn prediction(&self) -> String {
        self.blank.clone()
    }
}

/// Multiple-choice option key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            OptionKey::A => "A",
            OptionKey::B => "B",
            OptionKey::C => "C",
            OptionKey::D => "D",
        };
        f.write_str(key)
    }
}

/// Key of the option the model judged correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAnswer {
    /// Chosen option.
    pub correct_option: OptionKey,
}

impl StructuredAnswer for OptionAnswer {
    const NAME: &'static str = "QuestionAnswer";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "correct_option": {
                    "type": "string",
                    "enum": ["A", "B", "C", "D"],
                    "description": "The key of the correct option (A, B, C, or D)"
                }
            },
            "required": ["correct_option"],
            "additionalProperties": false
        })
    }

    fn prediction(&self) -> String {
        self.correct_option.to_string()
    }
}

/// Locate the JSON object in a model reply, tolerating Markdown code fences
/// and surrounding prose.
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);
    if unfenced.starts_with('{') && unfenced.ends_with('}') {
        return Some(unfenced);
    }
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    (start < end).then(|| &unfenced[start..=end])
}

/// Parse a model reply into a structured answer.
pub fn parse_answer<T: StructuredAnswer>(text: &str) -> Result<T, ExamError> {
    let json = extract_json(text)
        .ok_or_else(|| ExamError::Parse(format!("no JSON object in reply: {text:?}")))?;
    serde_json::from_str(json).map_err(|e| ExamError::Parse(format!("{e} in {json:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(r#"{"BLANK": "-t"}"#; "bare")]
    #[test_case("```json\n{\"BLANK\": \"-t\"}\n```"; "fenced")]
    #[test_case("Sure! Here it is: {\"BLANK\": \"-t\"} Hope it helps."; "prose")]
    fn blank_answers_parse(reply: &str) {
        let answer: BlankAnswer = parse_answer(reply).unwrap();
        assert_eq!(answer.prediction(), "-t");
    }

    #[test]
    fn option_must_be_a_to_d() {
        assert!(parse_answer::<OptionAnswer>(r#"{"correct_option": "E"}"#).is_err());
        let answer: OptionAnswer = parse_answer(r#"{"correct_option": "C"}"#).unwrap();
        assert_eq!(answer.correct_option, OptionKey::C);
        assert_eq!(answer.prediction(), "C");
    }

    #[test]
    fn reply_without_json_is_a_parse_error() {
        let err = parse_answer::<BlankAnswer>("I don't know").unwrap_err();
        assert!(matches!(err, ExamError::Parse(_)));
    }
}
