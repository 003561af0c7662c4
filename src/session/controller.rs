//! Exam session controller
//!
//! `ExamSession` is a cheap `Clone` handle; the UI and the timer task hold
//! their own copies. Local state sits behind a `std::sync::Mutex` that is
//! never held across an await. Network writes are serialised by two
//! single-slot guards (answer flush, final submission) that drop duplicate
//! callers instead of queueing them.

use super::answers::{AnswerBuffer, WritePlan};
use super::clock::Clock;
use super::events::{EventSink, SessionEvent, ToastLevel};
use super::guard::InFlight;
use super::timer::{ExamTimer, TimerTick};
use crate::config::Config;
use crate::error::{ApiError, ApiErrorKind, AppError, AppResult, SessionError};
use crate::models::{Exam, Question, SubmitAnswerRequest, UpdateAnswerRequest, UserAnswer};
use crate::routes::Route;
use crate::services::ExamBackend;
use crate::storage::TimerStore;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Answering,
    /// An answer write is in flight
    Submitting,
    AutoSubmitCountdown,
    Finalizing,
    Reviewing,
    Exited,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Reviewing | SessionState::Exited)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Selection already persisted, or empty
    Unchanged,
    Saved(String),
    /// Another flush was in flight; this one was dropped
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { index: usize },
    /// Already at the first question
    Stayed,
    /// Moved past the last question
    ConfirmSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Submitted,
    AlreadyInProgress,
    /// Session was already submitted or exited
    AlreadyFinished,
}

/// What a tick led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Finalized,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub auto_submit_grace_secs: u64,
    pub tick_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            auto_submit_grace_secs: 10,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            auto_submit_grace_secs: config.auto_submit_grace_secs,
            tick_interval: config.tick_interval(),
        }
    }
}

/// Everything a session borrows from the application
#[derive(Clone)]
pub struct SessionContext {
    pub backend: Arc<dyn ExamBackend>,
    pub timers: TimerStore,
    pub clock: Arc<dyn Clock>,
    pub options: SessionOptions,
    pub events: EventSink,
}

/// Read-only view for rendering
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub exam_id: String,
    pub exam_title: String,
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub selected_option_id: Option<String>,
    pub remaining_secs: u64,
    pub answered: usize,
    pub flagged: Vec<String>,
}

#[derive(Clone)]
pub struct ExamSession {
    shared: Arc<Shared>,
}

struct Shared {
    exam: Exam,
    questions: Arc<Vec<Question>>,
    ctx: SessionContext,
    local: Mutex<LocalState>,
    submitting: InFlight,
    finalizing: InFlight,
}

struct LocalState {
    state: SessionState,
    current: usize,
    answers: AnswerBuffer,
    flagged: BTreeSet<String>,
    timer: ExamTimer,
    question_opened_at: i64,
}

impl ExamSession {
    /// Loads exam, questions and prior answers, resumes the timer.
    ///
    /// Exam or question failures are fatal: a toast and a navigation back to
    /// the exam list are emitted and the error returned. Failing to fetch
    /// prior answers counts as having none.
    pub async fn load(
        ctx: SessionContext,
        exam_id: &str,
        start_question: Option<&str>,
    ) -> AppResult<Self> {
        info!("📄 Loading exam {}", exam_id);

        let exam = match ctx.backend.exam(exam_id).await {
            Ok(exam) => exam,
            Err(e) => return Err(abort_load(&ctx, exam_id, e)),
        };
        let questions = match ctx.backend.questions(exam_id).await {
            Ok(questions) => questions,
            Err(e) => return Err(abort_load(&ctx, exam_id, e)),
        };
        if questions.is_empty() {
            ctx.events
                .toast(ToastLevel::Error, "This exam has no questions yet.");
            ctx.events.emit(SessionEvent::Navigate(Route::ExamList));
            return Err(SessionError::NoQuestions {
                exam_id: exam_id.to_string(),
            }
            .into());
        }

        let prior = match ctx.backend.answers(exam_id).await {
            Ok(answers) => answers,
            Err(e) => {
                warn!("⚠️ Could not fetch previous answers for exam {}: {}", exam_id, e);
                Vec::new()
            }
        };
        let answers = AnswerBuffer::from_persisted(
            prior
                .into_iter()
                .filter(|a| questions.iter().any(|q| q.id == a.question_id))
                .collect(),
        );

        let now = ctx.clock.now_millis();
        let timer = ExamTimer::resume_or_start(
            &ctx.timers,
            exam_id,
            exam.time_budget_secs(),
            ctx.options.auto_submit_grace_secs,
            now,
        )?;

        let current = resolve_target(&questions, &answers, start_question);
        info!(
            "✓ Exam {} loaded: {} questions, {} answered, starting at #{}",
            exam.title,
            questions.len(),
            answers.answered_count(),
            current + 1
        );

        let session = Self {
            shared: Arc::new(Shared {
                exam,
                questions,
                local: Mutex::new(LocalState {
                    state: SessionState::Answering,
                    current,
                    answers,
                    flagged: BTreeSet::new(),
                    timer,
                    question_opened_at: now,
                }),
                ctx,
                submitting: InFlight::default(),
                finalizing: InFlight::default(),
            }),
        };
        session.emit_question_changed(current);
        Ok(session)
    }

    fn local(&self) -> MutexGuard<'_, LocalState> {
        self.shared
            .local
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn events(&self) -> &EventSink {
        &self.shared.ctx.events
    }

    fn now(&self) -> i64 {
        self.shared.ctx.clock.now_millis()
    }

    pub fn exam(&self) -> &Exam {
        &self.shared.exam
    }

    pub fn questions(&self) -> &[Question] {
        &self.shared.questions
    }

    pub fn state(&self) -> SessionState {
        self.local().state
    }

    pub fn current_index(&self) -> usize {
        self.local().current
    }

    pub fn current_question(&self) -> &Question {
        let index = self.current_index();
        &self.shared.questions[index]
    }

    pub fn remaining_secs(&self) -> u64 {
        self.local().timer.remaining()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let local = self.local();
        let question = self.shared.questions[local.current].clone();
        SessionSnapshot {
            state: local.state,
            exam_id: self.shared.exam.id.clone(),
            exam_title: self.shared.exam.title.clone(),
            index: local.current,
            total: self.shared.questions.len(),
            selected_option_id: local.answers.selection(&question.id).map(str::to_string),
            question,
            remaining_secs: local.timer.remaining(),
            answered: local.answers.answered_count(),
            flagged: local.flagged.iter().cloned().collect(),
        }
    }

    fn ensure_active(&self) -> AppResult<()> {
        if self.state().is_terminal() {
            return Err(SessionError::Finished {
                exam_id: self.shared.exam.id.clone(),
            }
            .into());
        }
        Ok(())
    }

    // ========== Selection ==========

    /// Toggles `option_id` on the current question; returns the new selection
    pub fn select_option(&self, option_id: &str) -> AppResult<Option<String>> {
        self.ensure_active()?;
        let mut local = self.local();
        let question = &self.shared.questions[local.current];
        if question.option(option_id).is_none() {
            return Err(SessionError::UnknownOption {
                question_id: question.id.clone(),
                option_id: option_id.to_string(),
            }
            .into());
        }
        let selection = local
            .answers
            .toggle(&question.id, option_id)
            .map(str::to_string);
        debug!("Question {} selection: {:?}", question.id, selection);
        Ok(selection)
    }

    /// `select_option` by letter ("A", "b", ...)
    pub fn select_letter(&self, letter: &str) -> AppResult<Option<String>> {
        let question = self.current_question();
        let option_id = match question.option_by_letter(letter) {
            Some(option) => option.id.clone(),
            None => {
                return Err(SessionError::UnknownOption {
                    question_id: question.id.clone(),
                    option_id: letter.to_string(),
                }
                .into())
            }
        };
        self.select_option(&option_id)
    }

    pub fn toggle_flag(&self, question_id: &str) -> bool {
        let mut local = self.local();
        if local.flagged.remove(question_id) {
            false
        } else {
            local.flagged.insert(question_id.to_string());
            true
        }
    }

    pub fn flagged(&self) -> Vec<String> {
        self.local().flagged.iter().cloned().collect()
    }

    // ========== Answer flush ==========

    /// Persists the current question's selection if it changed.
    ///
    /// Failures are toasted and returned; the pointer does not move.
    pub async fn submit_current(&self) -> AppResult<SubmitOutcome> {
        let Some(_guard) = self.shared.submitting.try_acquire() else {
            debug!("Answer flush already in flight, dropping");
            return Ok(SubmitOutcome::Dropped);
        };
        self.flush_current().await
    }

    /// Writes the pending selection; the caller holds the `submitting` slot
    async fn flush_current(&self) -> AppResult<SubmitOutcome> {
        let (question_id, plan, time_spent) = {
            let mut local = self.local();
            let question_id = self.shared.questions[local.current].id.clone();
            let plan = local.answers.plan(&question_id);
            let time_spent = ((self.now() - local.question_opened_at).max(0) / 1000) as u64;
            if plan != WritePlan::Unchanged && local.state == SessionState::Answering {
                local.state = SessionState::Submitting;
            }
            (question_id, plan, time_spent)
        };

        let result = match plan {
            WritePlan::Unchanged => return Ok(SubmitOutcome::Unchanged),
            WritePlan::Create { option_id } => {
                self.create_answer(&question_id, &option_id, time_spent).await
            }
            WritePlan::Update {
                answer_id,
                option_id,
            } => {
                let request = UpdateAnswerRequest {
                    selected_option_id: option_id,
                    time_spent,
                };
                self.shared
                    .ctx
                    .backend
                    .update_answer(&answer_id, &request)
                    .await
            }
        };

        let mut local = self.local();
        if local.state == SessionState::Submitting {
            local.state = SessionState::Answering;
        }
        match result {
            Ok(answer) => {
                info!("✓ Saved answer for question {}", question_id);
                let answer_id = answer.id.clone();
                local.answers.record(answer);
                Ok(SubmitOutcome::Saved(answer_id))
            }
            Err(e) => {
                drop(local);
                error!("❌ Saving answer for question {} failed: {}", question_id, e);
                self.events().toast(ToastLevel::Error, e.user_message());
                Err(AppError::Api(e))
            }
        }
    }

    /// Submit; if the backend already has an answer, update that record instead
    async fn create_answer(
        &self,
        question_id: &str,
        option_id: &str,
        time_spent: u64,
    ) -> Result<UserAnswer, ApiError> {
        let backend = &self.shared.ctx.backend;
        let request = SubmitAnswerRequest {
            exam_id: self.shared.exam.id.clone(),
            question_id: question_id.to_string(),
            selected_option_id: option_id.to_string(),
            time_spent,
        };

        let err = match backend.submit_answer(&request).await {
            Ok(answer) => return Ok(answer),
            Err(e) if e.kind() == ApiErrorKind::AlreadyExists => e,
            Err(e) => return Err(e),
        };

        warn!(
            "Answer for question {} already exists, retrying as update",
            question_id
        );
        let existing = backend
            .answers(&self.shared.exam.id)
            .await?
            .into_iter()
            .find(|a| a.question_id == question_id);
        match existing {
            Some(answer) => {
                let update = UpdateAnswerRequest {
                    selected_option_id: option_id.to_string(),
                    time_spent,
                };
                backend.update_answer(&answer.id, &update).await
            }
            None => Err(err),
        }
    }

    // ========== Navigation ==========

    pub async fn next(&self) -> AppResult<NavOutcome> {
        self.ensure_active()?;
        self.submit_current().await?;

        let last = self.shared.questions.len() - 1;
        let current = self.current_index();
        if current >= last {
            self.events().emit(SessionEvent::ConfirmSubmit);
            return Ok(NavOutcome::ConfirmSubmit);
        }
        Ok(self.move_to(current + 1))
    }

    pub async fn previous(&self) -> AppResult<NavOutcome> {
        self.ensure_active()?;
        self.submit_current().await?;

        let current = self.current_index();
        if current == 0 {
            return Ok(NavOutcome::Stayed);
        }
        Ok(self.move_to(current - 1))
    }

    /// Unknown ids fall back to the first unanswered question, then the first
    pub async fn go_to(&self, question_id: &str) -> AppResult<NavOutcome> {
        self.ensure_active()?;
        self.submit_current().await?;

        let target = {
            let local = self.local();
            resolve_target(&self.shared.questions, &local.answers, Some(question_id))
        };
        Ok(self.move_to(target))
    }

    fn move_to(&self, index: usize) -> NavOutcome {
        {
            let mut local = self.local();
            local.current = index;
            local.question_opened_at = self.now();
        }
        self.emit_question_changed(index);
        NavOutcome::Moved { index }
    }

    fn emit_question_changed(&self, index: usize) {
        self.events().emit(SessionEvent::QuestionChanged {
            index,
            question_id: self.shared.questions[index].id.clone(),
        });
    }

    // ========== Timer ==========

    /// One timer step; finalizes when the grace countdown runs out
    pub async fn tick(&self) -> AppResult<TickOutcome> {
        let tick = {
            let mut local = self.local();
            if local.state.is_terminal() {
                return Ok(TickOutcome::Stopped);
            }
            let tick = local.timer.tick(self.now());
            let accepts_countdown = matches!(
                local.state,
                SessionState::Answering | SessionState::Submitting
            );
            if matches!(tick, TimerTick::CountdownStarted { .. }) && accepts_countdown {
                local.state = SessionState::AutoSubmitCountdown;
            }
            tick
        };

        match tick {
            TimerTick::Running { remaining } => {
                self.events()
                    .emit(SessionEvent::TimeRemaining { seconds: remaining });
                Ok(TickOutcome::Continue)
            }
            TimerTick::CountdownStarted { seconds_left } => {
                self.events().toast(
                    ToastLevel::Warning,
                    format!("Time is up. The exam will be submitted in {seconds_left} seconds."),
                );
                self.events()
                    .emit(SessionEvent::AutoSubmitCountdown { seconds_left });
                Ok(TickOutcome::Continue)
            }
            TimerTick::CountingDown { seconds_left } => {
                self.events()
                    .emit(SessionEvent::AutoSubmitCountdown { seconds_left });
                Ok(TickOutcome::Continue)
            }
            TimerTick::CountdownElapsed => {
                info!("⏰ Auto-submitting exam {}", self.shared.exam.id);
                self.finalize().await?;
                Ok(TickOutcome::Finalized)
            }
            TimerTick::Idle => Ok(TickOutcome::Continue),
        }
    }

    /// Ticks on the configured cadence until the session ends
    pub fn run_timer(&self) -> JoinHandle<()> {
        let session = self.clone();
        let period = self.shared.ctx.options.tick_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                match session.tick().await {
                    Ok(TickOutcome::Continue) => {}
                    Ok(TickOutcome::Finalized) | Ok(TickOutcome::Stopped) => break,
                    Err(e) => warn!("Timer tick failed: {}", e),
                }
            }
            debug!("Timer task for exam {} stopped", session.shared.exam.id);
        })
    }

    // ========== Completion ==========

    /// Waits for any in-flight answer write, flushes the current answer,
    /// clears the timer anchor, marks the exam complete (best effort) and
    /// navigates to review.
    pub async fn finalize(&self) -> AppResult<FinalizeOutcome> {
        let Some(_guard) = self.shared.finalizing.try_acquire() else {
            debug!("Final submission already in flight");
            return Ok(FinalizeOutcome::AlreadyInProgress);
        };
        if self.state().is_terminal() {
            return Ok(FinalizeOutcome::AlreadyFinished);
        }
        self.local().state = SessionState::Finalizing;

        let exam_id = self.shared.exam.id.clone();
        {
            // a navigation flush may still be writing; let it land first
            let _slot = self.shared.submitting.acquire().await;
            if let Err(e) = self.flush_current().await {
                warn!("⚠️ Last answer for exam {} not saved: {}", exam_id, e);
            }
        }
        self.clear_anchor();

        if let Err(e) = self.shared.ctx.backend.complete_exam(&exam_id).await {
            warn!("⚠️ Marking exam {} complete failed: {}", exam_id, e);
        }

        self.local().state = SessionState::Reviewing;
        info!("✅ Exam {} submitted", exam_id);
        self.events()
            .emit(SessionEvent::Navigate(Route::Review { exam_id }));
        Ok(FinalizeOutcome::Submitted)
    }

    /// Leaves without submitting; saved answers stay on the server
    pub fn exit(&self) {
        self.clear_anchor();
        self.local().state = SessionState::Exited;
        info!("Left exam {}", self.shared.exam.id);
        self.events().emit(SessionEvent::Navigate(Route::ExamList));
    }

    fn clear_anchor(&self) {
        if let Err(e) = self.shared.ctx.timers.clear(&self.shared.exam.id) {
            warn!("Could not clear timer for exam {}: {}", self.shared.exam.id, e);
        }
    }
}

/// Index of `target` if present, else first unanswered, else 0
fn resolve_target(questions: &[Question], answers: &AnswerBuffer, target: Option<&str>) -> usize {
    if let Some(index) = target.and_then(|id| questions.iter().position(|q| q.id == id)) {
        return index;
    }
    questions
        .iter()
        .position(|q| !answers.is_answered(&q.id))
        .unwrap_or(0)
}

fn abort_load(ctx: &SessionContext, exam_id: &str, e: ApiError) -> AppError {
    error!("❌ Exam {} could not be loaded: {}", exam_id, e);
    let message = match e.kind() {
        ApiErrorKind::NotFound => "This exam does not exist.",
        ApiErrorKind::Unauthorized => "Please sign in again to take this exam.",
        _ => "The exam could not be loaded. Please try again later.",
    };
    ctx.events.toast(ToastLevel::Error, message);
    ctx.events.emit(SessionEvent::Navigate(Route::ExamList));
    SessionError::ExamUnavailable {
        exam_id: exam_id.to_string(),
        source: e,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerOption;

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            exam_id: "e1".to_string(),
            text: id.to_string(),
            image_url: None,
            order: 0,
            points: 1.0,
            subject_id: None,
            options: vec![AnswerOption {
                id: format!("{id}-a"),
                letter: "A".to_string(),
                text: "a".to_string(),
                is_correct: None,
            }],
        }
    }

    fn answered(question_id: &str) -> UserAnswer {
        UserAnswer {
            id: format!("ans-{question_id}"),
            exam_id: "e1".to_string(),
            question_id: question_id.to_string(),
            selected_option_id: format!("{question_id}-a"),
            is_correct: None,
            points_earned: 0.0,
            time_spent: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn unknown_target_falls_back_to_first_unanswered() {
        let questions = vec![question("q1"), question("q2"), question("q3")];
        let answers = AnswerBuffer::from_persisted(vec![answered("q1")]);

        assert_eq!(resolve_target(&questions, &answers, Some("q3")), 2);
        assert_eq!(resolve_target(&questions, &answers, Some("nope")), 1);
        assert_eq!(resolve_target(&questions, &answers, None), 1);
    }

    #[test]
    fn all_answered_falls_back_to_first_question() {
        let questions = vec![question("q1"), question("q2")];
        let answers = AnswerBuffer::from_persisted(vec![answered("q1"), answered("q2")]);
        assert_eq!(resolve_target(&questions, &answers, Some("missing")), 0);
    }
}
