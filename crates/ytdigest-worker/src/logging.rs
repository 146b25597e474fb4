//! Structured logging.
//!
//! Subscriber setup for the binaries, plus [`VideoLogger`] for consistent
//! per-video lifecycle events.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use ytdigest_models::VideoId;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `LOG_LEVEL` (default `info`) applies
/// to the workspace crates. `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("warn,ytdigest={}", level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}

/// Video logger for structured logging with consistent formatting.
///
/// Every event carries the video id and the pipeline stage.
#[derive(Debug, Clone)]
pub struct VideoLogger {
    video_id: String,
    stage: String,
}

impl VideoLogger {
    pub fn new(video_id: &VideoId, stage: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            stage: stage.to_string(),
        }
    }

    /// Same video, different stage.
    pub fn stage(&self, stage: &str) -> Self {
        Self {
            video_id: self.video_id.clone(),
            stage: stage.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Video started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Video progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Video warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Video error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            stage = %self.stage,
            "Video completed: {}", message
        );
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn stage_name(&self) -> &str {
        &self.stage
    }

    /// Span carrying the video id, for instrumenting the per-video work.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("video", video_id = %self.video_id)
    }
}
