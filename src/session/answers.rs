//! Per-question answer buffer
//!
//! Single-select: each question holds at most one chosen option locally and
//! at most one persisted `UserAnswer`.

use crate::models::UserAnswer;
use std::collections::HashMap;

/// What flushing a question's selection requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePlan {
    /// Nothing new to send
    Unchanged,
    Create { option_id: String },
    Update { answer_id: String, option_id: String },
}

#[derive(Debug, Clone, Default)]
pub struct AnswerBuffer {
    selections: HashMap<String, String>,
    persisted: HashMap<String, UserAnswer>,
}

impl AnswerBuffer {
    /// Seeds selections from what the server already has
    pub fn from_persisted(answers: Vec<UserAnswer>) -> Self {
        let mut buffer = Self::default();
        for answer in answers {
            buffer.record(answer);
        }
        buffer
    }

    /// Selecting the chosen option clears it; any other option replaces it.
    ///
    /// Returns the selection afterwards.
    pub fn toggle(&mut self, question_id: &str, option_id: &str) -> Option<&str> {
        let already_chosen = self
            .selections
            .get(question_id)
            .map(|current| current == option_id)
            .unwrap_or(false);
        if already_chosen {
            self.selections.remove(question_id);
        } else {
            self.selections
                .insert(question_id.to_string(), option_id.to_string());
        }
        self.selection(question_id)
    }

    pub fn selection(&self, question_id: &str) -> Option<&str> {
        self.selections.get(question_id).map(String::as_str)
    }

    pub fn persisted(&self, question_id: &str) -> Option<&UserAnswer> {
        self.persisted.get(question_id)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.persisted.contains_key(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.persisted.len()
    }

    /// An empty selection never writes; the backend has no answer delete.
    pub fn plan(&self, question_id: &str) -> WritePlan {
        let Some(selected) = self.selection(question_id) else {
            return WritePlan::Unchanged;
        };
        match self.persisted(question_id) {
            Some(answer) if answer.selected_option_id == selected => WritePlan::Unchanged,
            Some(answer) => WritePlan::Update {
                answer_id: answer.id.clone(),
                option_id: selected.to_string(),
            },
            None => WritePlan::Create {
                option_id: selected.to_string(),
            },
        }
    }

    /// Stores a server-confirmed answer as the persisted state
    pub fn record(&mut self, answer: UserAnswer) {
        self.selections
            .entry(answer.question_id.clone())
            .or_insert_with(|| answer.selected_option_id.clone());
        self.persisted.insert(answer.question_id.clone(), answer);
    }
}
