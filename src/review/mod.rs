//! Review and results
//!
//! Pure aggregation of fetched exam data; nothing here talks to the network.

pub mod report;

pub use report::{ExamReport, QuestionReview, SubjectBreakdown};
