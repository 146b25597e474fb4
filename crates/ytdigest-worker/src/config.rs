//! Worker configuration.
//!
//! Everything is read from the environment once at startup and handed to
//! each component as an explicit sub-config.

use std::path::PathBuf;
use std::time::Duration;

use ytdigest_notify::{RetryQueueConfig, TelegramConfig};

use crate::error::{WorkerError, WorkerResult};
use crate::gemini::GeminiConfig;
use crate::retry::{FeedRetryPolicy, SummarizerPolicy};
use crate::scheduler::ScheduleConfig;
use crate::youtube::YoutubeConfig;

/// Credentials that must be present for any mode.
pub const REQUIRED_ENV_VARS: [&str; 4] = [
    "GEMINI_API_KEY",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "YOUTUBE_API_KEY",
];

/// Locations of the durable state files.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub processed_path: PathBuf,
    pub watermark_path: PathBuf,
}

impl StoreConfig {
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            processed_path: data_dir.join("processed.json"),
            watermark_path: data_dir.join(".last-check"),
            data_dir,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub youtube: YoutubeConfig,
    pub gemini: GeminiConfig,
    pub telegram: TelegramConfig,
    pub store: StoreConfig,
    pub summarizer: SummarizerPolicy,
    pub feed_retry: FeedRetryPolicy,
    pub retry_queue: RetryQueueConfig,
    pub schedule: ScheduleConfig,
    /// How long `run-once` waits for queued chunks before exiting
    pub dispatch_drain_timeout: Duration,
    /// Verbose AI response logging
    pub debug: bool,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_opt(name).and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    env_opt(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Names of required variables that are unset or blank.
pub fn missing_required_env() -> Vec<&'static str> {
    REQUIRED_ENV_VARS
        .iter()
        .copied()
        .filter(|name| env_opt(name).is_none())
        .collect()
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        let missing = missing_required_env();
        if !missing.is_empty() {
            return Err(WorkerError::config_error(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        let required = |name: &str| env_opt(name).unwrap_or_default();

        let debug = env_flag("DEBUG");

        let mut youtube = YoutubeConfig::new(required("YOUTUBE_API_KEY"));
        if let Some(channel_id) = env_opt("YOUTUBE_CHANNEL_ID") {
            youtube.channel_id = channel_id;
        }
        if let Some(base) = env_opt("YOUTUBE_API_BASE") {
            youtube.api_base = base;
        }

        let mut gemini = GeminiConfig::new(required("GEMINI_API_KEY"));
        if let Some(model) = env_opt("GEMINI_MODEL") {
            gemini.model = model;
        }
        if let Some(base) = env_opt("GEMINI_API_BASE") {
            gemini.api_base = base;
        }
        gemini.debug = debug;

        let mut telegram = TelegramConfig::new(required("TELEGRAM_BOT_TOKEN"), required("TELEGRAM_CHAT_ID"));
        if let Some(base) = env_opt("TELEGRAM_API_BASE") {
            telegram.api_base = base;
        }

        let store = StoreConfig::in_dir(env_opt("DATA_DIR").unwrap_or_else(|| "data".to_string()));

        let schedule = ScheduleConfig::new(
            env_parse("SCHEDULE_HOUR_UTC", ScheduleConfig::DEFAULT_HOUR),
            env_parse("SCHEDULE_MINUTE_UTC", ScheduleConfig::DEFAULT_MINUTE),
        )?;

        Ok(Self {
            youtube,
            gemini,
            telegram,
            store,
            summarizer: SummarizerPolicy::default(),
            feed_retry: FeedRetryPolicy::default(),
            retry_queue: RetryQueueConfig::default(),
            schedule,
            dispatch_drain_timeout: Duration::from_secs(env_parse("DISPATCH_DRAIN_TIMEOUT_SECS", 120)),
            debug,
        })
    }
}
