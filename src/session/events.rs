use crate::routes::Route;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

/// What the UI should react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Pointer moved; index is zero-based
    QuestionChanged { index: usize, question_id: String },
    Toast { level: ToastLevel, message: String },
    /// Student moved past the last question
    ConfirmSubmit,
    TimeRemaining { seconds: u64 },
    AutoSubmitCountdown { seconds_left: u64 },
    Navigate(Route),
}

/// Fire-and-forget event sender; a closed or absent receiver is ignored
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<SessionEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<SessionEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Discards everything
    pub fn none() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn toast(&self, level: ToastLevel, message: impl Into<String>) {
        self.emit(SessionEvent::Toast {
            level,
            message: message.into(),
        });
    }
}
