//! Terminal front end
//!
//! Line-oriented stand-in for the web UI. Owns the long-lived resources
//! (storage, services, auth) and hands them to sessions and forms.

use crate::clients::IdentityClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::forms::{SignInForm, SignUpForm};
use crate::models::ReferenceData;
use crate::review::ExamReport;
use crate::routes::{guard, sidebar, Route, RouteDecision};
use crate::services::{AuthService, AuthState, ExamBackend, Services};
use crate::session::{
    EventSink, ExamSession, NavOutcome, SessionContext, SessionEvent, SessionOptions,
    SystemClock, ToastLevel,
};
use crate::storage::{LocalStore, Preferences, TimerStore, TokenStore};
use crate::utils::logging::log_session_summary;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

type Input = Lines<BufReader<Stdin>>;

const HELP: &str = "\
commands:
  login <email> <password>
  register <email> <password> <name> <city>
  logout
  exams
  take <examId> [questionId]
  review <examId>
  reset <examId>
  open <path>
  menu
  dark
  quit";

const SESSION_HELP: &str = "\
  <letter>  select / deselect option
  n / p     next / previous question
  g <id>    go to question
  f         flag current question
  ?         show current question
  s         submit exam
  x         leave without submitting";

pub struct App {
    config: Config,
    store: LocalStore,
    services: Services,
    auth: AuthService,
    prefs: Preferences,
    reference: ReferenceData,
}

impl App {
    /// Opens storage, builds the services and restores a previous sign-in
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let store = LocalStore::open(&config.storage_path)?;
        let services = Services::new(&config, store.clone())?;
        let identity = IdentityClient::new(&config)?;
        let auth = AuthService::new(
            identity,
            TokenStore::new(store.clone()),
            services.users.clone(),
        );
        auth.restore().await;

        let reference = match ReferenceData::load(Path::new(&config.reference_data_dir)).await {
            Ok(reference) => reference,
            Err(e) => {
                warn!("⚠️ Reference data unavailable, city/school checks disabled: {}", e);
                ReferenceData::default()
            }
        };

        Ok(Self {
            prefs: Preferences::new(store.clone()),
            config,
            store,
            services,
            auth,
            reference,
        })
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let mut input = BufReader::new(tokio::io::stdin()).lines();
        println!("{HELP}");
        if self.prefs.dark_mode() {
            println!("(dark mode on)");
        }

        loop {
            print_prompt(&self.route_label());
            let Some(line) = input.next_line().await? else {
                break;
            };
            let parts: Vec<&str> = line.split_whitespace().collect();
            let outcome = match parts.as_slice() {
                [] => Ok(()),
                ["quit"] | ["q"] => break,
                ["help"] => {
                    println!("{HELP}");
                    Ok(())
                }
                ["login", email, password] => self.login(email, password).await,
                ["register", email, password, name, city] => {
                    self.register(email, password, name, city).await
                }
                ["logout"] => self.auth.sign_out().map_err(AppError::from),
                ["exams"] => self.list_exams().await,
                ["take", exam_id] => self.take(&mut input, exam_id, None).await,
                ["take", exam_id, question_id] => {
                    self.take(&mut input, exam_id, Some(*question_id)).await
                }
                ["review", exam_id] => self.review(exam_id).await,
                ["reset", exam_id] => self.reset(exam_id).await,
                ["open", path] => self.open(&mut input, path).await,
                ["menu"] => {
                    for entry in sidebar(&self.auth.current()) {
                        println!("  {:<18} {}", entry.label, entry.route.path());
                    }
                    Ok(())
                }
                ["dark"] => self.prefs.toggle_dark_mode().map(|on| {
                    println!("dark mode {}", if on { "on" } else { "off" });
                }),
                _ => {
                    println!("unknown command, type `help`");
                    Ok(())
                }
            };
            if let Err(e) = outcome {
                print_error(&e);
            }
        }

        info!("Bye");
        Ok(())
    }

    fn route_label(&self) -> String {
        match self.auth.current() {
            AuthState::SignedIn { email, .. } => email,
            AuthState::SignedOut => "guest".to_string(),
        }
    }

    /// Applies the route guard; prints the redirect when denied
    fn allowed(&self, route: &Route) -> bool {
        match guard(route, &self.auth.current()) {
            RouteDecision::Allow => true,
            RouteDecision::Redirect(to) => {
                println!("{} is not available, go to {}", route, to);
                false
            }
        }
    }

    async fn open(&self, input: &mut Input, path: &str) -> AppResult<()> {
        let route = Route::parse(path);
        if !self.allowed(&route) {
            return Ok(());
        }
        match route {
            Route::ExamList | Route::Dashboard => self.list_exams().await,
            Route::TakeExam {
                exam_id,
                question_id,
            } => self.take(input, &exam_id, question_id.as_deref()).await,
            Route::Review { exam_id } => self.review(&exam_id).await,
            other => {
                println!("{other}: nothing to show in the terminal client");
                Ok(())
            }
        }
    }

    async fn login(&self, email: &str, password: &str) -> AppResult<()> {
        let form = SignInForm {
            email: email.to_string(),
            password: password.to_string(),
        };
        form.submit(&self.auth).await?;
        println!("signed in as {email}");
        Ok(())
    }

    async fn register(&self, email: &str, password: &str, name: &str, city: &str) -> AppResult<()> {
        let mut form = SignUpForm::default();
        form.email = email.to_string();
        form.password = password.to_string();
        form.confirm_password = password.to_string();
        form.display_name = name.to_string();
        form.city = city.to_string();
        form.advance(&self.reference)?;
        form.submit(&self.reference, &self.auth, &self.services.users)
            .await?;
        println!("welcome, {name}");
        Ok(())
    }

    async fn list_exams(&self) -> AppResult<()> {
        if !self.allowed(&Route::ExamList) {
            return Ok(());
        }
        let exams = self.services.exams.list().await?;
        for exam in exams.iter().filter(|e| e.is_active) {
            self.services.cache.put_exam(exam.clone());
            let status = match (exam.is_completed, exam.is_passed) {
                (true, true) => "passed",
                (true, false) => "completed",
                _ => "open",
            };
            println!(
                "{:>6}  {:<40} {:>3} q  {:>4} min  [{}]",
                exam.id,
                exam.title,
                exam.total_questions,
                exam.time_budget_secs() / 60,
                status
            );
        }
        Ok(())
    }

    async fn reset(&self, exam_id: &str) -> AppResult<()> {
        self.services.exams.reset(exam_id).await?;
        self.services.cache.invalidate_answers(exam_id);
        TimerStore::new(self.store.clone()).clear(exam_id)?;
        println!("exam {exam_id} reset");
        Ok(())
    }

    async fn take(
        &self,
        input: &mut Input,
        exam_id: &str,
        question_id: Option<&str>,
    ) -> AppResult<()> {
        let route = Route::TakeExam {
            exam_id: exam_id.to_string(),
            question_id: question_id.map(str::to_string),
        };
        if !self.allowed(&route) {
            return Ok(());
        }

        let (tx, mut events) = mpsc::unbounded_channel();
        let ctx = SessionContext {
            backend: Arc::new(self.services.clone()) as Arc<dyn ExamBackend>,
            timers: TimerStore::new(self.store.clone()),
            clock: Arc::new(SystemClock),
            options: SessionOptions::from(&self.config),
            events: EventSink::new(tx),
        };

        let session = match ExamSession::load(ctx, exam_id, question_id).await {
            Ok(session) => session,
            Err(e) => {
                drain_events(&mut events);
                return Err(e);
            }
        };
        let timer = session.run_timer();
        let mut confirming = false;
        println!("{SESSION_HELP}");

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        SessionEvent::Navigate(Route::Review { exam_id }) => {
                            drain_events(&mut events);
                            timer.abort();
                            return self.review(&exam_id).await;
                        }
                        SessionEvent::Navigate(_) => break,
                        other => render_event(&session, &other),
                    }
                }
                line = input.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            session.exit();
                            break;
                        }
                        Err(e) => {
                            warn!("stdin closed: {}", e);
                            session.exit();
                            break;
                        }
                    };
                    let line = line.trim();
                    let result = if confirming {
                        confirming = false;
                        if line.eq_ignore_ascii_case("y") {
                            session.finalize().await.map(|_| ())
                        } else {
                            println!("not submitted");
                            Ok(())
                        }
                    } else if line == "s" {
                        confirming = true;
                        println!("submit the exam? (y/n)");
                        Ok(())
                    } else {
                        self.session_command(&session, line).await
                    };
                    if let Err(e) = result {
                        print_error(&e);
                    }
                }
            }
        }

        timer.abort();
        Ok(())
    }

    async fn session_command(&self, session: &ExamSession, command: &str) -> AppResult<()> {
        match command.split_whitespace().collect::<Vec<_>>().as_slice() {
            [] => {}
            ["n"] => {
                if session.next().await? == NavOutcome::ConfirmSubmit {
                    println!("last question. type `s` to submit the exam");
                }
            }
            ["p"] => {
                session.previous().await?;
            }
            ["g", question_id] => {
                session.go_to(question_id).await?;
            }
            ["f"] => {
                let id = session.current_question().id.clone();
                let flagged = session.toggle_flag(&id);
                println!("{}", if flagged { "flagged" } else { "unflagged" });
            }
            ["?"] => print_question(session),
            ["x"] => session.exit(),
            [letter] if letter.chars().count() == 1 => {
                let selection = session.select_letter(letter)?;
                match selection {
                    Some(_) => println!("selected {}", letter.to_uppercase()),
                    None => println!("cleared"),
                }
            }
            _ => println!("{SESSION_HELP}"),
        }
        Ok(())
    }

    async fn review(&self, exam_id: &str) -> AppResult<()> {
        let route = Route::Review {
            exam_id: exam_id.to_string(),
        };
        if !self.allowed(&route) {
            return Ok(());
        }

        let (exam, questions, answers) = futures::try_join!(
            self.services.exams.get(exam_id),
            self.services.questions.list_by_exam(exam_id),
            self.services.user_answers.list_by_exam(exam_id),
        )?;
        let subjects = self.services.subjects.list().await.unwrap_or_else(|e| {
            warn!("Subjects unavailable, showing ids: {}", e);
            Vec::new()
        });

        let report = ExamReport::build(&exam, &questions, &answers, &subjects);
        match self.services.user_answers.results(exam_id).await {
            Ok(results) if !report.matches(&results) => warn!(
                "Local grading differs from server results for exam {}: {:.2} vs {:.2} points",
                exam_id, report.earned_points, results.earned_points
            ),
            Ok(_) => {}
            Err(e) => warn!("Server results unavailable: {}", e),
        }

        println!("\n{}", report.title);
        for row in &report.questions {
            println!(
                "{:>3}. {}  yours: {:<2} correct: {:<2} {:.1}/{:.1}",
                row.number,
                if row.is_correct { "✔" } else { "✘" },
                row.selected_letter.as_deref().unwrap_or("-"),
                row.correct_letter.as_deref().unwrap_or("?"),
                row.points_earned,
                row.points
            );
        }
        for (label, value) in report.chart_series() {
            let bar = "█".repeat((value / 5.0).round() as usize);
            println!("{:<20} {:>6.2}% {}", label, value, bar);
        }
        log_session_summary(
            &report.title,
            report.correct + report.incorrect,
            report.questions.len(),
            report.percentage(),
            report.passed(),
        );
        Ok(())
    }
}

fn print_prompt(label: &str) {
    use std::io::Write;
    print!("[{label}]> ");
    let _ = std::io::stdout().flush();
}

fn print_error(e: &AppError) {
    let message = match e {
        AppError::Auth(auth) => auth.user_message(),
        AppError::Validation(errors) => crate::forms::validation::describe(errors),
        other => match other.as_api() {
            Some(api) => api.user_message().to_string(),
            None => other.to_string(),
        },
    };
    error!("{}", e);
    println!("! {message}");
}

fn print_question(session: &ExamSession) {
    let snapshot = session.snapshot();
    println!(
        "\n[{}] question {}/{}  ({} answered, {}:{:02} left)",
        snapshot.exam_title,
        snapshot.index + 1,
        snapshot.total,
        snapshot.answered,
        snapshot.remaining_secs / 60,
        snapshot.remaining_secs % 60
    );
    if snapshot.flagged.contains(&snapshot.question.id) {
        println!("⚑ flagged");
    }
    println!("{}", snapshot.question.plain_text());
    if let Some(url) = &snapshot.question.image_url {
        println!("(image: {url})");
    }
    for option in &snapshot.question.options {
        let marker = if snapshot.selected_option_id.as_deref() == Some(option.id.as_str()) {
            "●"
        } else {
            "○"
        };
        println!("  {marker} {}) {}", option.letter, crate::models::question::strip_markup(&option.text));
    }
}

fn render_event(session: &ExamSession, event: &SessionEvent) {
    match event {
        SessionEvent::QuestionChanged { .. } => print_question(session),
        SessionEvent::Toast { level, message } => {
            let prefix = match level {
                ToastLevel::Info => "i",
                ToastLevel::Warning => "⚠",
                ToastLevel::Error => "!",
            };
            println!("{prefix} {message}");
        }
        SessionEvent::ConfirmSubmit => println!("submit the exam? type `s`"),
        SessionEvent::TimeRemaining { seconds } if seconds % 60 == 0 => {
            println!("⏱ {} min left", seconds / 60);
        }
        SessionEvent::TimeRemaining { .. } => {}
        SessionEvent::AutoSubmitCountdown { seconds_left } => {
            println!("⏰ auto-submit in {seconds_left}s");
        }
        SessionEvent::Navigate(route) => println!("→ {route}"),
    }
}

fn drain_events(events: &mut mpsc::UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Toast { message, .. } = event {
            println!("! {message}");
        }
    }
}
