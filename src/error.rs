//! Error types
//!
//! `AppError` wraps one enum per layer. `ApiError` additionally knows how to
//! turn itself into the message shown to the student.

use thiserror::Error;

/// Crate-wide error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// REST call failures
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS, TLS, ...
    #[error("request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },
    /// Non-2xx response
    #[error("{endpoint} returned {status}: {}", message_or_placeholder(.message))]
    Status {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    #[error("could not decode response from {endpoint}: {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

fn message_or_placeholder(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("<no message>")
}

/// Coarse classification used for toasts and retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    NotFound,
    Unauthorized,
    AlreadyExists,
    Server,
    Timeout,
    Network,
    Other,
}

impl ApiError {
    pub fn status(endpoint: impl Into<String>, status: u16, message: Option<String>) -> Self {
        ApiError::Status {
            endpoint: endpoint.into(),
            status,
            message,
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::RequestFailed { .. } => ApiErrorKind::Network,
            ApiError::Timeout { .. } => ApiErrorKind::Timeout,
            ApiError::JsonParseFailed { .. } => ApiErrorKind::Other,
            ApiError::Status {
                status, message, ..
            } => {
                let says_exists = message
                    .as_deref()
                    .map(|m| m.to_lowercase().contains("already exists"))
                    .unwrap_or(false);
                match *status {
                    409 => ApiErrorKind::AlreadyExists,
                    400 if says_exists => ApiErrorKind::AlreadyExists,
                    404 => ApiErrorKind::NotFound,
                    401 | 403 => ApiErrorKind::Unauthorized,
                    500..=599 => ApiErrorKind::Server,
                    _ => ApiErrorKind::Other,
                }
            }
        }
    }

    /// Toast text for a failed answer write
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ApiErrorKind::NotFound => "The exam or question no longer exists.",
            ApiErrorKind::Unauthorized => "Your session has expired. Please sign in again.",
            ApiErrorKind::Server => "The server had a problem saving your answer. Please try again.",
            ApiErrorKind::Timeout => "The server took too long to respond. Please try again.",
            ApiErrorKind::AlreadyExists => "This answer was already saved.",
            ApiErrorKind::Network | ApiErrorKind::Other => {
                "Your answer could not be saved. Please try again."
            }
        }
    }
}

/// Local persisted state failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("value under {key} is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Exam session failures
#[derive(Debug, Error)]
pub enum SessionError {
    /// Fatal for the session
    #[error("exam {exam_id} could not be loaded: {source}")]
    ExamUnavailable {
        exam_id: String,
        #[source]
        source: ApiError,
    },
    #[error("exam {exam_id} has no questions")]
    NoQuestions { exam_id: String },
    #[error("question {question_id} has no option {option_id}")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },
    #[error("session for exam {exam_id} is already finished")]
    Finished { exam_id: String },
}

/// Identity provider failures
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider rejected the request, e.g. `EMAIL_EXISTS`
    #[error("identity provider rejected the request: {code}")]
    Rejected { code: String },
    #[error("not signed in")]
    NotSignedIn,
    #[error("identity provider unreachable: {0}")]
    Transport(#[from] ApiError),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected { code } => match code.as_str() {
                "EMAIL_EXISTS" => "An account with this email already exists.".to_string(),
                "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                    "Wrong email or password.".to_string()
                }
                "USER_DISABLED" => "This account has been disabled.".to_string(),
                c if c.starts_with("TOO_MANY_ATTEMPTS") => {
                    "Too many attempts. Try again later.".to_string()
                }
                c if c.starts_with("WEAK_PASSWORD") => "The password is too weak.".to_string(),
                other => format!("Sign-in failed ({other})."),
            },
            AuthError::NotSignedIn => "Please sign in first.".to_string(),
            AuthError::Transport(e) => e.user_message().to_string(),
        }
    }
}

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not load reference data {path}: {reason}")]
    ReferenceData { path: String, reason: String },
}

impl AppError {
    /// The API error underneath, if any
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::Session(SessionError::ExamUnavailable { source, .. }) => Some(source),
            AppError::Auth(AuthError::Transport(e)) => Some(e),
            _ => None,
        }
    }
}

/// Crate result alias
pub type AppResult<T> = Result<T, AppError>;
