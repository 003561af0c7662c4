use crate::forms::validation::not_blank;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Time budget used when the backend leaves `duration` unset
pub const DEFAULT_DURATION_MINUTES: u32 = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sector_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub total_questions: u32,
    /// Percentage needed to pass, 0..=100
    #[serde(default)]
    pub passing_score: f64,
    /// Minutes
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_passed: bool,
}

fn default_true() -> bool {
    true
}

impl Exam {
    /// Whole time budget in seconds
    pub fn time_budget_secs(&self) -> u64 {
        u64::from(self.duration.unwrap_or(DEFAULT_DURATION_MINUTES)) * 60
    }
}

/// Payload for creating or updating an exam
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExamDraft {
    #[validate(custom(function = not_blank))]
    pub title: String,
    #[validate(custom(function = not_blank))]
    pub sector_id: String,
    /// Minutes
    #[validate(range(min = 1, message = "Duration must be at least one minute."))]
    pub duration: u32,
    #[validate(range(
        min = 0.0,
        max = 100.0,
        message = "Passing score must be between 0 and 100."
    ))]
    pub passing_score: f64,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_duration_means_150_minutes() {
        let exam: Exam = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "title": "Matematika",
            "passingScore": 50.0
        }))
        .unwrap();

        assert!(exam.is_active);
        assert_eq!(exam.time_budget_secs(), 9000);
    }
}
