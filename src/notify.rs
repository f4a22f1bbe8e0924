use crate::client::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
        }
    }
}

/// A transient banner. The page script removes it after
/// [`crate::config::NOTIFICATION_DISMISS_MS`].
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn from_client_error(title: impl Into<String>, err: &ClientError) -> Self {
        Self::error(title, err.to_string())
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// Input rejected before any remote call was made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Result of one interactive create flow.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// Rejected locally, shown next to the form.
    Invalid(ValidationError),
    /// A remote call failed.
    Failed(Notification),
    Done(Notification),
}

impl FlowOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, FlowOutcome::Done(_))
    }

    pub fn notification(&self) -> Option<&Notification> {
        match self {
            FlowOutcome::Failed(n) | FlowOutcome::Done(n) => Some(n),
            FlowOutcome::Invalid(_) => None,
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            FlowOutcome::Invalid(e) => Some(e),
            _ => None,
        }
    }
}
