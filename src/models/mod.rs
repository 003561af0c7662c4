pub mod catalog;
pub mod exam;
pub mod question;
pub mod reference;
pub mod user;
pub mod user_answer;

pub use catalog::{Sector, SectorDraft, Subject, SubjectDraft};
pub use exam::{Exam, ExamDraft};
pub use question::{AnswerOption, OptionDraft, Question, QuestionDraft};
pub use reference::{City, ReferenceData, School};
pub use user::{ProfileUpdate, Role, UserProfile};
pub use user_answer::{ExamResults, SubmitAnswerRequest, UpdateAnswerRequest, UserAnswer};
