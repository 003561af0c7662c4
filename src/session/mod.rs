//! Exam session controller
//!
//! Drives one student through one exam, from load to final submission:
//!
//! ```text
//! Loading → Answering ⇄ Submitting
//!              ↓ (timer hits zero)
//!        AutoSubmitCountdown → Finalizing → Reviewing
//!              ↓ (exit)
//!            Exited
//! ```
//!
//! The controller renders nothing. It reports what the UI should show through
//! `SessionEvent`s and can be driven concurrently by the UI and the timer task.

pub mod answers;
pub mod clock;
pub mod controller;
pub mod events;
pub mod guard;
pub mod timer;

pub use answers::{AnswerBuffer, WritePlan};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    ExamSession, FinalizeOutcome, NavOutcome, SessionContext, SessionOptions, SessionSnapshot,
    SessionState, SubmitOutcome, TickOutcome,
};
pub use events::{EventSink, SessionEvent, ToastLevel};
pub use timer::{ExamTimer, TimerTick};
