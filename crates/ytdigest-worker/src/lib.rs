//! Channel digest worker.
//!
//! This crate provides:
//! - Feed reading with a durable watermark and liveness filtering
//! - Bilingual summarization through Gemini with a retry policy
//! - HTML formatting and Telegram dispatch
//! - The per-run pipeline and the daily scheduler

pub mod config;
pub mod error;
pub mod feed;
pub mod formatter;
pub mod gemini;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod retry;
pub mod scheduler;
pub mod summarizer;
pub mod youtube;

pub use config::{StoreConfig, WorkerConfig};
pub use error::{WorkerError, WorkerResult};
pub use feed::FeedReader;
pub use formatter::{format_messages, format_summary};
pub use gemini::{GeminiClient, GeminiConfig, SummaryProvider};
pub use logging::{init_tracing, VideoLogger};
pub use pipeline::{validate_credentials, Pipeline, RunReport};
pub use retry::{retry_fixed, FeedRetryPolicy, RetryDecision, SummarizerPolicy};
pub use scheduler::{run_scheduled, ScheduleConfig};
pub use summarizer::Summarizer;
pub use youtube::{FeedSource, YoutubeClient, YoutubeConfig};
