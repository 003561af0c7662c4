//! Domain services
//!
//! One thin wrapper per backend resource group, one method per endpoint.
//! No retries, no batching; validation is left to the types.

pub mod auth_service;
pub mod backend;
pub mod exam_service;
pub mod question_service;
pub mod sector_service;
pub mod subject_service;
pub mod user_answer_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthState};
pub use backend::{ExamBackend, Services};
pub use exam_service::ExamService;
pub use question_service::QuestionService;
pub use sector_service::SectorService;
pub use subject_service::SubjectService;
pub use user_answer_service::UserAnswerService;
pub use user_service::UserService;

use serde::Deserialize;

/// List endpoints answer either `[...]` or `{ "data": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListResponse<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) | ListResponse::Wrapped { data: items } => items,
        }
    }
}
