//! Forms
//!
//! Multi-step wizards with in-memory drafts. Each step validates before the
//! wizard advances; submission goes through the domain services.

pub mod auth_form;
pub mod exam_form;
pub mod validation;

pub use auth_form::{SignInForm, SignUpForm, SignUpStep};
pub use exam_form::{ExamAuthoringForm, ExamFormStep};
