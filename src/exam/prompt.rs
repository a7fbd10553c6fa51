use serde_json::Value;

use super::answer::{BlankAnswer, OptionAnswer, StructuredAnswer};
use super::model::{ChatMessage, ResponseFormat};
use super::questions::ExamItem;

const FILL_IN_THE_BLANK_TEMPLATE: &str = "You are a highly specialized expert in bioinformatics command-line tools. Your knowledge is precise and up-to-date.
Your task is to provide the exact value that should replace the '[BLANK]' in the following statement.
The output must strictly follow the format: {format_instructions}
Now, the question is: {question}
Provide the answer now.
";

const MULTIPLE_CHOICE_TEMPLATE: &str = "
You are a bioinformatics expert.
Your task is to answer the following multiple-choice question accurately.
Question:
{question}
Options:
{options_str}
Instructions:
1. Evaluate each option (A, B, C, D) carefully based on the documentation or standard behavior of the tool.
2. The output must strictly follow the format: {format_instructions}
";

/// Question style of an exam file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamKind {
    /// Supply the value replacing `[BLANK]`.
    FillInBlank,
    /// Pick one of the options `A`–`D`.
    MultipleChoice,
}

impl ExamKind {
    /// Answer schema requested from the model.
    pub fn response_format(self) -> ResponseFormat {
        match self {
            ExamKind::FillInBlank => ResponseFormat::new(BlankAnswer::NAME, BlankAnswer::schema()),
            ExamKind::MultipleChoice => ResponseFormat::new(OptionAnswer::NAME, OptionAnswer::schema()),
        }
    }

    /// System prompt for `item`. Multiple-choice items without options get an
    /// empty options block.
    pub fn system_prompt(self, item: &ExamItem) -> String {
        let format = self.response_format();
        let instructions = format_instructions(&format.schema);
        match self {
            ExamKind::FillInBlank => FILL_IN_THE_BLANK_TEMPLATE
                .replace("{format_instructions}", &instructions)
                .replace("{question}", &item.question),
            ExamKind::MultipleChoice => MULTIPLE_CHOICE_TEMPLATE
                .replace("{format_instructions}", &instructions)
                .replace("{options_str}", &item.options_block().unwrap_or_default())
                .replace("{question}", &item.question),
        }
    }

    /// Messages sent for `item`.
    pub fn messages(self, item: &ExamItem) -> Vec<ChatMessage> {
        vec![ChatMessage::system(self.system_prompt(item))]
    }
}

/// Instructions telling the model to reply with a JSON object matching
/// `schema`.
pub fn format_instructions(schema: &Value) -> String {
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\nHere is the output schema:\n```\n{schema}\n```"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(options: Option<BTreeMap<String, String>>) -> ExamItem {
        ExamItem {
            question: "bwa [BLANK] aligns reads".to_string(),
            correct_answer: "mem".to_string(),
            options,
        }
    }

    #[test]
    fn fill_in_prompt_embeds_question_and_schema() {
        let prompt = ExamKind::FillInBlank.system_prompt(&item(None));
        assert!(prompt.contains("Now, the question is: bwa [BLANK] aligns reads"));
        assert!(prompt.contains("\"BLANK\""));
        assert!(!prompt.contains("{format_instructions}"));
    }

    #[test]
    fn multiple_choice_prompt_lists_options() {
        let options = BTreeMap::from([
            ("A".to_string(), "mem".to_string()),
            ("B".to_string(), "index".to_string()),
        ]);
        let prompt = ExamKind::MultipleChoice.system_prompt(&item(Some(options)));
        assert!(prompt.contains("Options:\nA: mem\nB: index\n"));
        assert!(prompt.contains("correct_option"));
    }

    #[test]
    fn single_system_message() {
        let messages = ExamKind::FillInBlank.messages(&item(None));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "system");
    }
}
