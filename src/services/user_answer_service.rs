use super::ListResponse;
use crate::clients::{ApiResult, HttpClient};
use crate::models::{ExamResults, SubmitAnswerRequest, UpdateAnswerRequest, UserAnswer};
use tracing::debug;

/// `user-answers` resource
#[derive(Clone, Debug)]
pub struct UserAnswerService {
    http: HttpClient,
}

impl UserAnswerService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `POST user-answers/submit`
    pub async fn submit(&self, request: &SubmitAnswerRequest) -> ApiResult<UserAnswer> {
        debug!(
            "Submitting answer: exam {} question {} option {}",
            request.exam_id, request.question_id, request.selected_option_id
        );
        self.http.post("user-answers/submit", request).await
    }

    /// `PUT user-answers/:id`
    pub async fn update(
        &self,
        answer_id: &str,
        request: &UpdateAnswerRequest,
    ) -> ApiResult<UserAnswer> {
        debug!("Updating answer {} -> option {}", answer_id, request.selected_option_id);
        self.http.put(&format!("user-answers/{answer_id}"), request).await
    }

    /// Current user's answers for one exam
    pub async fn list_by_exam(&self, exam_id: &str) -> ApiResult<Vec<UserAnswer>> {
        let answers: ListResponse<UserAnswer> =
            self.http.get(&format!("user-answers/exam/{exam_id}")).await?;
        Ok(answers.into_vec())
    }

    /// `GET user-answers/results/:examId`
    pub async fn results(&self, exam_id: &str) -> ApiResult<ExamResults> {
        self.http.get(&format!("user-answers/results/{exam_id}")).await
    }
}
