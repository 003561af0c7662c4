use super::ListResponse;
use crate::clients::{ApiResult, HttpClient};
use crate::models::{Subject, SubjectDraft};

/// `subjects` resource
#[derive(Clone, Debug)]
pub struct SubjectService {
    http: HttpClient,
}

impl SubjectService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> ApiResult<Vec<Subject>> {
        let subjects: ListResponse<Subject> = self.http.get("subjects").await?;
        Ok(subjects.into_vec())
    }

    pub async fn list_by_sector(&self, sector_id: &str) -> ApiResult<Vec<Subject>> {
        let subjects: ListResponse<Subject> =
            self.http.get(&format!("subjects/sector/{sector_id}")).await?;
        Ok(subjects.into_vec())
    }

    pub async fn get(&self, subject_id: &str) -> ApiResult<Subject> {
        self.http.get(&format!("subjects/{subject_id}")).await
    }

    pub async fn create(&self, draft: &SubjectDraft) -> ApiResult<Subject> {
        self.http.post("subjects", draft).await
    }

    pub async fn update(&self, subject_id: &str, draft: &SubjectDraft) -> ApiResult<Subject> {
        self.http.put(&format!("subjects/{subject_id}"), draft).await
    }

    pub async fn delete(&self, subject_id: &str) -> ApiResult<()> {
        self.http.delete(&format!("subjects/{subject_id}")).await
    }
}
