use super::ListResponse;
use crate::clients::{ApiResult, HttpClient};
use crate::models::{Question, QuestionDraft};

/// `questions` resource
#[derive(Clone, Debug)]
pub struct QuestionService {
    http: HttpClient,
}

impl QuestionService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Questions of an exam, in exam order
    pub async fn list_by_exam(&self, exam_id: &str) -> ApiResult<Vec<Question>> {
        let questions: ListResponse<Question> =
            self.http.get(&format!("questions/exam/{exam_id}")).await?;
        let mut questions = questions.into_vec();
        questions.sort_by_key(|q| q.order);
        Ok(questions)
    }

    pub async fn get(&self, question_id: &str) -> ApiResult<Question> {
        self.http.get(&format!("questions/{question_id}")).await
    }

    pub async fn create(&self, draft: &QuestionDraft) -> ApiResult<Question> {
        self.http.post("questions", draft).await
    }

    pub async fn update(&self, question_id: &str, draft: &QuestionDraft) -> ApiResult<Question> {
        self.http.put(&format!("questions/{question_id}"), draft).await
    }

    pub async fn delete(&self, question_id: &str) -> ApiResult<()> {
        self.http.delete(&format!("questions/{question_id}")).await
    }
}
