//! Exam authoring wizard (admin)
//!
//! Step 1 collects exam details, step 2 the questions. Drafts live only in
//! memory; nothing is checkpointed across restarts.

use super::validation::rule;
use crate::error::AppResult;
use crate::models::{Exam, ExamDraft, Question, QuestionDraft};
use crate::services::{ExamService, QuestionService};
use tracing::info;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExamFormStep {
    #[default]
    Details,
    Questions,
    Done,
}

#[derive(Debug, Clone, Default)]
pub struct ExamAuthoringForm {
    step: ExamFormStep,
    /// Set when editing; submit then updates instead of creating
    existing_exam_id: Option<String>,
    pub exam: ExamDraft,
    questions: Vec<QuestionDraft>,
}

impl ExamAuthoringForm {
    pub fn new() -> Self {
        Self {
            exam: ExamDraft {
                is_active: true,
                ..ExamDraft::default()
            },
            ..Self::default()
        }
    }

    /// Edit an existing exam; questions added here are appended to it
    pub fn edit(exam: &Exam) -> Self {
        Self {
            existing_exam_id: Some(exam.id.clone()),
            exam: ExamDraft {
                title: exam.title.clone(),
                sector_id: exam.sector_id.clone().unwrap_or_default(),
                duration: exam.time_budget_secs() as u32 / 60,
                passing_score: exam.passing_score,
                is_active: exam.is_active,
            },
            ..Self::default()
        }
    }

    pub fn step(&self) -> ExamFormStep {
        self.step
    }

    pub fn questions(&self) -> &[QuestionDraft] {
        &self.questions
    }

    pub fn validate_details(&self) -> Result<(), ValidationErrors> {
        self.exam.validate()
    }

    /// Text, at least two options with distinct letters, exactly one correct
    /// option and positive points.
    pub fn validate_question(question: &QuestionDraft) -> Result<(), ValidationErrors> {
        question.validate()
    }

    /// Validates and appends; returns the question's position
    pub fn add_question(&mut self, question: QuestionDraft) -> Result<usize, ValidationErrors> {
        Self::validate_question(&question)?;
        self.questions.push(question);
        Ok(self.questions.len() - 1)
    }

    pub fn remove_question(&mut self, index: usize) -> Option<QuestionDraft> {
        (index < self.questions.len()).then(|| self.questions.remove(index))
    }

    pub fn advance(&mut self) -> Result<ExamFormStep, ValidationErrors> {
        match self.step {
            ExamFormStep::Details => {
                self.validate_details()?;
                self.step = ExamFormStep::Questions;
            }
            ExamFormStep::Questions => {
                if self.questions.is_empty() && self.existing_exam_id.is_none() {
                    let mut errors = ValidationErrors::new();
                    errors.add(
                        "questions",
                        rule("min_questions", "Add at least one question."),
                    );
                    return Err(errors);
                }
            }
            ExamFormStep::Done => {}
        }
        Ok(self.step)
    }

    pub fn back(&mut self) {
        if self.step == ExamFormStep::Questions {
            self.step = ExamFormStep::Details;
        }
    }

    /// Creates (or updates) the exam, then its questions in order
    pub async fn submit(
        &mut self,
        exams: &ExamService,
        questions: &QuestionService,
    ) -> AppResult<(Exam, Vec<Question>)> {
        self.validate_details()?;
        for question in &self.questions {
            Self::validate_question(question)?;
        }

        let exam = match &self.existing_exam_id {
            Some(id) => exams.update(id, &self.exam).await?,
            None => exams.create(&self.exam).await?,
        };

        let mut created = Vec::with_capacity(self.questions.len());
        for (i, draft) in self.questions.iter().enumerate() {
            let draft = QuestionDraft {
                exam_id: exam.id.clone(),
                order: draft.order.max(i as u32 + 1),
                ..draft.clone()
            };
            created.push(questions.create(&draft).await?);
        }
        info!(
            "✓ Saved exam {} with {} new questions",
            exam.title,
            created.len()
        );

        self.step = ExamFormStep::Done;
        Ok((exam, created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validation::field_messages;
    use crate::models::OptionDraft;

    fn option(letter: &str, correct: bool) -> OptionDraft {
        OptionDraft {
            letter: letter.to_string(),
            text: format!("odgovor {letter}"),
            is_correct: correct,
        }
    }

    fn question() -> QuestionDraft {
        QuestionDraft {
            text: "Koliko je 2+2?".to_string(),
            points: 1.0,
            options: vec![option("A", false), option("B", true)],
            ..QuestionDraft::default()
        }
    }

    #[test]
    fn details_step_rejects_bad_values() {
        let mut form = ExamAuthoringForm::new();
        form.exam.passing_score = 120.0;
        let errors = form.advance().unwrap_err();
        assert_eq!(
            field_messages(&errors, "title"),
            vec!["This field is required.".to_string()]
        );
        assert_eq!(
            field_messages(&errors, "duration"),
            vec!["Duration must be at least one minute.".to_string()]
        );
        assert_eq!(
            field_messages(&errors, "passing_score"),
            vec!["Passing score must be between 0 and 100.".to_string()]
        );
        assert_eq!(form.step(), ExamFormStep::Details);
    }

    #[test]
    fn question_needs_exactly_one_correct_option() {
        let mut two_correct = question();
        two_correct.options[0].is_correct = true;
        assert!(ExamAuthoringForm::validate_question(&two_correct).is_err());

        let mut none_correct = question();
        none_correct.options[1].is_correct = false;
        assert!(ExamAuthoringForm::validate_question(&none_correct).is_err());

        assert!(ExamAuthoringForm::validate_question(&question()).is_ok());
    }

    #[test]
    fn duplicate_letters_are_rejected() {
        let mut dup = question();
        dup.options.push(option("b", false));
        let errors = ExamAuthoringForm::validate_question(&dup).unwrap_err();
        assert_eq!(
            field_messages(&errors, "options"),
            vec!["Option letters must be unique.".to_string()]
        );
    }

    #[test]
    fn single_option_and_zero_points_are_rejected() {
        let mut thin = question();
        thin.options.truncate(1);
        thin.options[0].is_correct = true;
        thin.points = 0.0;
        let errors = ExamAuthoringForm::validate_question(&thin).unwrap_err();
        assert_eq!(
            field_messages(&errors, "options"),
            vec!["Add at least two options.".to_string()]
        );
        assert_eq!(
            field_messages(&errors, "points"),
            vec!["Points must be greater than zero.".to_string()]
        );
    }

    #[test]
    fn questions_step_needs_a_question() {
        let mut form = ExamAuthoringForm::new();
        form.exam.title = "Probni prijemni".to_string();
        form.exam.sector_id = "s1".to_string();
        form.exam.duration = 120;
        form.exam.passing_score = 50.0;

        assert_eq!(form.advance().unwrap(), ExamFormStep::Questions);
        assert!(form.advance().is_err());

        assert_eq!(form.add_question(question()).unwrap(), 0);
        assert!(form.advance().is_ok());
        assert_eq!(form.remove_question(0).map(|q| q.text), Some("Koliko je 2+2?".to_string()));
        assert!(form.remove_question(0).is_none());
    }
}
