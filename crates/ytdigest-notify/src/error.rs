//! Notification error types.

use thiserror::Error;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram rejected credentials ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Telegram rate limited: {0}")]
    RateLimited(String),

    #[error("Telegram API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid Telegram response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NotifyError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            429 => Self::RateLimited(message),
            _ => Self::Api { status, message },
        }
    }

    /// Credential or chat id rejected. Retrying will not help.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, NotifyError::Unauthorized { .. })
    }

    /// HTTP status behind this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            NotifyError::Unauthorized { status, .. } | NotifyError::Api { status, .. } => Some(*status),
            NotifyError::RateLimited(_) => Some(429),
            NotifyError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
