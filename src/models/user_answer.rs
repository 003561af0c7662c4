use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted answer per (exam, question)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub id: String,
    pub exam_id: String,
    pub question_id: String,
    pub selected_option_id: String,
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub points_earned: f64,
    /// Seconds
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST user-answers/submit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub exam_id: String,
    pub question_id: String,
    pub selected_option_id: String,
    pub time_spent: u64,
}

/// Body of `PUT user-answers/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnswerRequest {
    pub selected_option_id: String,
    pub time_spent: u64,
}

/// Body of `GET user-answers/results/:examId`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExamResults {
    pub exam_id: String,
    pub total_questions: u32,
    pub answered_questions: u32,
    pub correct_answers: u32,
    pub total_points: f64,
    pub earned_points: f64,
    pub percentage: f64,
    pub passed: bool,
}
