use crate::forms::validation::{not_blank, rule};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: String,
    /// "A", "B", ...
    pub letter: String,
    pub text: String,
    /// Only sent once the exam has been answered
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub exam_id: String,
    /// May embed HTML or `$...$` math markup
    pub text: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

fn default_points() -> f64 {
    1.0
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Case-insensitive lookup by letter
    pub fn option_by_letter(&self, letter: &str) -> Option<&AnswerOption> {
        self.options
            .iter()
            .find(|o| o.letter.eq_ignore_ascii_case(letter.trim()))
    }

    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct == Some(true))
    }

    /// Text with markup tags and math delimiters removed
    pub fn plain_text(&self) -> String {
        strip_markup(&self.text)
    }
}

/// Drops HTML tags and `$`/`\(`/`\)` math delimiters, collapses whitespace
pub fn strip_markup(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let without_tags = tags.replace_all(text, " ");
    let without_math = without_tags
        .replace("\\(", "")
        .replace("\\)", "")
        .replace('$', "");
    spaces.replace_all(without_math.trim(), " ").into_owned()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDraft {
    pub letter: String,
    pub text: String,
    pub is_correct: bool,
}

/// Payload for creating or updating a question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub exam_id: String,
    #[validate(custom(function = not_blank))]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub order: u32,
    #[validate(custom(function = positive_points))]
    pub points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[validate(
        length(min = 2, message = "Add at least two options."),
        custom(function = validate_options)
    )]
    pub options: Vec<OptionDraft>,
}

fn positive_points(points: f64) -> Result<(), ValidationError> {
    if points > 0.0 {
        Ok(())
    } else {
        Err(rule("positive_points", "Points must be greater than zero."))
    }
}

/// Every option needs a letter and text, letters are distinct
/// (case-insensitive) and exactly one option is correct.
fn validate_options(options: &[OptionDraft]) -> Result<(), ValidationError> {
    if options
        .iter()
        .any(|o| o.letter.trim().is_empty() || o.text.trim().is_empty())
    {
        return Err(rule("blank_option", "Every option needs a letter and text."));
    }

    let mut letters = HashSet::new();
    if !options
        .iter()
        .all(|o| letters.insert(o.letter.trim().to_uppercase()))
    {
        return Err(rule("duplicate_letter", "Option letters must be unique."));
    }

    if options.iter().filter(|o| o.is_correct).count() != 1 {
        return Err(rule("one_correct", "Mark exactly one option as correct."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_stripped_for_display() {
        assert_eq!(
            strip_markup("<p>Koliko je <b>$2+2$</b>?</p>"),
            "Koliko je 2+2 ?"
        );
        assert_eq!(strip_markup("\\(x^2\\) = 4"), "x^2 = 4");
    }

    #[test]
    fn options_resolve_by_letter_ignoring_case() {
        let question: Question = serde_json::from_value(serde_json::json!({
            "id": "q1",
            "examId": "e1",
            "text": "?",
            "options": [
                {"id": "o1", "letter": "A", "text": "1"},
                {"id": "o2", "letter": "B", "text": "2", "isCorrect": true}
            ]
        }))
        .unwrap();

        assert_eq!(question.option_by_letter("b").map(|o| o.id.as_str()), Some("o2"));
        assert_eq!(question.correct_option().map(|o| o.letter.as_str()), Some("B"));
        assert_eq!(question.points, 1.0);
    }
}
