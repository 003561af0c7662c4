use super::ListResponse;
use crate::clients::{ApiResult, HttpClient};
use crate::models::{Exam, ExamDraft};
use serde_json::Value;
use tracing::info;

/// `exams` resource
#[derive(Clone, Debug)]
pub struct ExamService {
    http: HttpClient,
}

impl ExamService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> ApiResult<Vec<Exam>> {
        let exams: ListResponse<Exam> = self.http.get("exams").await?;
        Ok(exams.into_vec())
    }

    pub async fn list_by_sector(&self, sector_id: &str) -> ApiResult<Vec<Exam>> {
        let exams: ListResponse<Exam> = self.http.get(&format!("exams/sector/{sector_id}")).await?;
        Ok(exams.into_vec())
    }

    pub async fn get(&self, exam_id: &str) -> ApiResult<Exam> {
        self.http.get(&format!("exams/{exam_id}")).await
    }

    pub async fn create(&self, draft: &ExamDraft) -> ApiResult<Exam> {
        let exam: Exam = self.http.post("exams", draft).await?;
        info!("✓ Created exam {} ({})", exam.id, exam.title);
        Ok(exam)
    }

    pub async fn update(&self, exam_id: &str, draft: &ExamDraft) -> ApiResult<Exam> {
        self.http.put(&format!("exams/{exam_id}"), draft).await
    }

    pub async fn delete(&self, exam_id: &str) -> ApiResult<()> {
        self.http.delete(&format!("exams/{exam_id}")).await
    }

    /// `POST exams/:id/complete`
    pub async fn complete(&self, exam_id: &str) -> ApiResult<()> {
        let _: Value = self.http.post_empty(&format!("exams/{exam_id}/complete")).await?;
        Ok(())
    }

    /// `POST exams/:id/reset`, wipes the user's answers so the exam can be retaken
    pub async fn reset(&self, exam_id: &str) -> ApiResult<()> {
        let _: Value = self.http.post_empty(&format!("exams/{exam_id}/reset")).await?;
        Ok(())
    }
}
