//! Persistent client-side state
//!
//! A JSON file plays the part of browser local storage. Keys match the web
//! client: `authToken`, `darkMode`, `exam_timer_<examId>`.

pub mod local_store;
pub mod preferences;
pub mod timer_store;
pub mod token_store;

pub use local_store::LocalStore;
pub use preferences::Preferences;
pub use timer_store::{TimerAnchor, TimerStore};
pub use token_store::TokenStore;
