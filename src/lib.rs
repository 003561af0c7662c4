//! # E-testi client
//!
//! Client for the E-testi exam-preparation backend: students take timed
//! multiple-choice exams, answers are saved per question, and a review page
//! grades the attempt.
//!
//! ## Layers
//!
//! ### ① Storage
//! - `storage/` - file-backed key/value store standing in for browser local
//!   storage (`authToken`, `darkMode`, `exam_timer_<id>`)
//!
//! ### ② Clients and services
//! - `clients/` - REST client with bearer auth, identity provider client
//! - `services/` - one service per resource, `AuthService`, and `Services`
//!   implementing `ExamBackend` on top of the entity cache
//! - `cache/` - bounded LRU cache for exams, questions and answers
//!
//! ### ③ Exam session
//! - `session/` - `ExamSession` state machine: load, select, flush answers,
//!   navigate, wall-clock anchored timer, auto-submit, finalize
//! - `review/` - grading and per-subject breakdown
//!
//! ### ④ Surfaces
//! - `routes/` - route table and access guard
//! - `forms/` - sign-in, sign-up and exam authoring forms
//! - `app` - terminal front end

pub mod app;
pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod review;
pub mod routes;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;

pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use review::ExamReport;
pub use routes::Route;
pub use services::{ExamBackend, Services};
pub use session::{ExamSession, SessionContext, SessionEvent};
