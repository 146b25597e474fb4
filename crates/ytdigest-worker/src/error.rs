//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{service} rejected credentials ({status}): {message}")]
    Unauthorized {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} rate limited: {message}")]
    RateLimited {
        service: &'static str,
        message: String,
    },

    #[error("{service} API returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("AI summarization failed: {0}")]
    AiFailed(String),

    #[error("Feed fetch failed: {0}")]
    FeedFailed(String),

    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] ytdigest_store::StoreError),

    #[error("Notify error: {0}")]
    Notify(#[from] ytdigest_notify::NotifyError),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn ai_failed(msg: impl Into<String>) -> Self {
        Self::AiFailed(msg.into())
    }

    pub fn feed_failed(msg: impl Into<String>) -> Self {
        Self::FeedFailed(msg.into())
    }

    pub fn dispatch_failed(msg: impl Into<String>) -> Self {
        Self::DispatchFailed(msg.into())
    }

    /// Map a non-success HTTP status from `service` to an error.
    pub fn from_http_status(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized {
                service,
                status,
                message,
            },
            429 => Self::RateLimited { service, message },
            _ => Self::Api {
                service,
                status,
                message,
            },
        }
    }

    /// Map a transport error, keeping the request URL out of the message.
    ///
    /// Query strings may carry API keys.
    pub fn from_request(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{} request timed out", service))
        } else {
            Self::Network(err.without_url())
        }
    }

    /// Credentials were rejected. Retrying will not help.
    pub fn is_auth_error(&self) -> bool {
        match self {
            WorkerError::Unauthorized { .. } => true,
            WorkerError::Notify(e) => e.is_auth_error(),
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, WorkerError::RateLimited { .. })
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            WorkerError::Timeout(_) => true,
            WorkerError::Network(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Fatal for the whole run.
    pub fn is_config_error(&self) -> bool {
        matches!(self, WorkerError::ConfigError(_)) || self.is_auth_error()
    }

    /// Check if error is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !(self.is_config_error() || self.is_timeout())
    }

    /// HTTP status behind this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            WorkerError::Unauthorized { status, .. } | WorkerError::Api { status, .. } => Some(*status),
            WorkerError::RateLimited { .. } => Some(429),
            WorkerError::Network(e) => e.status().map(|s| s.as_u16()),
            WorkerError::Notify(e) => e.http_status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_classification() {
        assert!(WorkerError::from_http_status("Gemini", 401, "bad key").is_auth_error());
        assert!(WorkerError::from_http_status("Gemini", 403, "denied").is_auth_error());
        assert!(WorkerError::from_http_status("Gemini", 429, "slow down").is_rate_limited());

        let err = WorkerError::from_http_status("YouTube", 503, "unavailable");
        assert!(!err.is_auth_error());
        assert!(err.is_retryable());
        assert_eq!(err.http_status(), Some(503));
        assert_eq!(err.to_string(), "YouTube API returned 503: unavailable");
    }

    #[test]
    fn test_timeout_and_config_are_not_retryable() {
        assert!(!WorkerError::Timeout("Gemini request timed out".into()).is_retryable());
        assert!(!WorkerError::config_error("GEMINI_API_KEY not set").is_retryable());
        assert!(WorkerError::ai_failed("no text").is_retryable());
    }

    #[test]
    fn test_notify_auth_error_is_config_error() {
        let err: WorkerError = ytdigest_notify::NotifyError::from_http_status(401, "Unauthorized").into();
        assert!(err.is_auth_error());
        assert!(err.is_config_error());
    }
}
