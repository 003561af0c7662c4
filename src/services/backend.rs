//! What the exam session needs from the backend
//!
//! `ExamBackend` is the seam between the session controller and the REST
//! services; `Services` implements it with cache-first reads.

use super::{
    ExamService, QuestionService, SectorService, SubjectService, UserAnswerService, UserService,
};
use crate::cache::EntityCache;
use crate::clients::{ApiResult, HttpClient};
use crate::config::Config;
use crate::models::{Exam, Question, SubmitAnswerRequest, UpdateAnswerRequest, UserAnswer};
use crate::storage::{LocalStore, TokenStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait ExamBackend: Send + Sync {
    async fn exam(&self, exam_id: &str) -> ApiResult<Exam>;
    /// Ordered by `Question::order`
    async fn questions(&self, exam_id: &str) -> ApiResult<Arc<Vec<Question>>>;
    /// Current user's persisted answers for the exam
    async fn answers(&self, exam_id: &str) -> ApiResult<Vec<UserAnswer>>;
    async fn submit_answer(&self, request: &SubmitAnswerRequest) -> ApiResult<UserAnswer>;
    async fn update_answer(
        &self,
        answer_id: &str,
        request: &UpdateAnswerRequest,
    ) -> ApiResult<UserAnswer>;
    async fn complete_exam(&self, exam_id: &str) -> ApiResult<()>;
}

/// Every REST service plus the shared cache
#[derive(Clone)]
pub struct Services {
    pub http: HttpClient,
    pub exams: ExamService,
    pub questions: QuestionService,
    pub sectors: SectorService,
    pub subjects: SubjectService,
    pub user_answers: UserAnswerService,
    pub users: UserService,
    pub cache: Arc<EntityCache>,
}

impl Services {
    pub fn new(config: &Config, store: LocalStore) -> ApiResult<Self> {
        let http = HttpClient::new(config, TokenStore::new(store))?;
        Ok(Self {
            exams: ExamService::new(http.clone()),
            questions: QuestionService::new(http.clone()),
            sectors: SectorService::new(http.clone()),
            subjects: SubjectService::new(http.clone()),
            user_answers: UserAnswerService::new(http.clone()),
            users: UserService::new(http.clone()),
            cache: Arc::new(EntityCache::new(config.cache_capacity)),
            http,
        })
    }
}

#[async_trait]
impl ExamBackend for Services {
    async fn exam(&self, exam_id: &str) -> ApiResult<Exam> {
        if let Some(exam) = self.cache.exam(exam_id) {
            debug!("Cache hit: exam {}", exam_id);
            return Ok(exam);
        }
        let exam = self.exams.get(exam_id).await?;
        self.cache.put_exam(exam.clone());
        Ok(exam)
    }

    async fn questions(&self, exam_id: &str) -> ApiResult<Arc<Vec<Question>>> {
        if let Some(questions) = self.cache.questions(exam_id) {
            debug!("Cache hit: {} questions for exam {}", questions.len(), exam_id);
            return Ok(questions);
        }
        let questions = self.questions.list_by_exam(exam_id).await?;
        Ok(self.cache.put_questions(exam_id, questions))
    }

    async fn answers(&self, exam_id: &str) -> ApiResult<Vec<UserAnswer>> {
        if let Some(answers) = self.cache.answers(exam_id) {
            return Ok(answers);
        }
        let answers = self.user_answers.list_by_exam(exam_id).await?;
        self.cache.put_answers(exam_id, answers.clone());
        Ok(answers)
    }

    async fn submit_answer(&self, request: &SubmitAnswerRequest) -> ApiResult<UserAnswer> {
        let answer = self.user_answers.submit(request).await;
        self.cache.invalidate_answers(&request.exam_id);
        answer
    }

    async fn update_answer(
        &self,
        answer_id: &str,
        request: &UpdateAnswerRequest,
    ) -> ApiResult<UserAnswer> {
        let answer = self.user_answers.update(answer_id, request).await?;
        self.cache.invalidate_answers(&answer.exam_id);
        Ok(answer)
    }

    async fn complete_exam(&self, exam_id: &str) -> ApiResult<()> {
        self.exams.complete(exam_id).await?;
        self.cache.mark_exam_completed(exam_id);
        Ok(())
    }
}
