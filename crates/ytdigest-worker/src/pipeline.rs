//! Pipeline orchestrator.
//!
//! One pass: fetch candidates, filter, then for each unseen video
//! summarize, format, dispatch and mark processed. Videos run strictly one
//! after another. A failing video is logged and left unmarked so the next
//! pass picks it up again; it never stops the others.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;
use ytdigest_models::{Language, Summary, Video};
use ytdigest_notify::{DispatchReport, Dispatcher, MessageSender, RetryQueue, TelegramClient};
use ytdigest_store::{DedupStore, WatermarkStore};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::feed::FeedReader;
use crate::formatter::format_messages;
use crate::gemini::GeminiClient;
use crate::logging::VideoLogger;
use crate::metrics::{record_dispatch, record_video_failed, record_video_processed};
use crate::summarizer::Summarizer;
use crate::youtube::YoutubeClient;

/// Outcome of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Published videos returned by the feed
    pub fetched: usize,
    /// Already in the dedup store
    pub skipped: usize,
    pub processed: usize,
    pub failed: usize,
}

impl RunReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            fetched: 0,
            skipped: 0,
            processed: 0,
            failed: 0,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: {} fetched, {} already processed, {} processed, {} failed",
            self.run_id, self.fetched, self.skipped, self.processed, self.failed
        )
    }
}

pub struct Pipeline {
    feed: FeedReader,
    summarizer: Summarizer,
    dispatcher: Dispatcher,
    store: DedupStore,
}

impl Pipeline {
    pub fn new(feed: FeedReader, summarizer: Summarizer, dispatcher: Dispatcher, store: DedupStore) -> Self {
        Self {
            feed,
            summarizer,
            dispatcher,
            store,
        }
    }

    /// Wire the production clients and load the dedup store.
    pub async fn from_config(config: &WorkerConfig) -> WorkerResult<Self> {
        let youtube = Arc::new(YoutubeClient::new(config.youtube.clone())?);
        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);
        let telegram: Arc<dyn MessageSender> = Arc::new(TelegramClient::new(config.telegram.clone())?);

        let feed = FeedReader::new(
            youtube,
            WatermarkStore::new(&config.store.watermark_path),
            config.feed_retry.clone(),
        );
        let summarizer = Summarizer::new(gemini, config.summarizer.clone());
        let queue = RetryQueue::new(Arc::clone(&telegram), config.retry_queue.clone());
        let dispatcher = Dispatcher::new(telegram, queue);
        let store = DedupStore::load(&config.store.processed_path).await;

        Ok(Self::new(feed, summarizer, dispatcher, store))
    }

    /// Run one pass over the feed.
    pub async fn run_once(&mut self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);

        async move {
            let mut report = RunReport::new(run_id);
            info!("Checking for new videos");

            let videos = self.feed.check_new_videos().await;
            report.fetched = videos.len();

            for video in &videos {
                if self.store.is_processed(&video.video_id) {
                    debug!(video_id = %video.video_id, "Already processed, skipping");
                    report.skipped += 1;
                    continue;
                }

                match self.process_video(video).await {
                    Ok(()) => report.processed += 1,
                    Err(_) => report.failed += 1,
                }
            }

            info!("{}", report);
            report
        }
        .instrument(span)
        .await
    }

    /// Summarize, dispatch and mark one video.
    ///
    /// The record is written only after both messages were accepted by the
    /// dispatcher. Queued chunks count as accepted; the retry queue drains
    /// on its own.
    pub async fn process_video(&mut self, video: &Video) -> WorkerResult<()> {
        let logger = VideoLogger::new(&video.video_id, "process");
        let span = logger.create_span();

        async {
            logger.log_start(&video.title);
            self.deliver_video(video).await?;

            let logger = logger.stage("mark_processed");
            match self.store.mark_processed(&video.video_id, &video.title).await {
                Ok(_) => {}
                // In-memory record stands; it may be lost on restart.
                Err(e) => logger.log_error(&format!("Failed to persist processed record: {}", e)),
            }

            record_video_processed();
            logger.log_completion(&video.title);
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Summarize and dispatch without touching the dedup store.
    pub async fn deliver_video(&self, video: &Video) -> WorkerResult<()> {
        let logger = VideoLogger::new(&video.video_id, "summarize");

        let summary = match self.summarizer.summarize(&video.url).await {
            Ok(summary) => summary,
            Err(e) => {
                logger.log_error(&format!("Summarization failed: {}", e));
                record_video_failed("summarize");
                return Err(e);
            }
        };
        logger.log_progress(&format!("summary ready ({} tokens)", summary.token_count));

        let logger = logger.stage("dispatch");
        if let Err(e) = self.dispatch_summary(video, &summary).await {
            logger.log_error(&e.to_string());
            record_video_failed("dispatch");
            return Err(e);
        }
        Ok(())
    }

    /// Dispatch both language messages.
    ///
    /// Fails only when nothing at all was accepted for the video. Once one
    /// message went out, a rejected sibling is logged and the dispatch
    /// counts as done.
    async fn dispatch_summary(&self, video: &Video, summary: &Summary) -> WorkerResult<()> {
        let mut rejected: Vec<Language> = Vec::new();
        let mut delivered = false;

        for (language, text) in format_messages(video, summary) {
            let report = self.dispatcher.send_message(&text).await;
            record_dispatch(report.sent, report.queued, report.rejected);
            if report.is_accepted() {
                delivered = true;
            } else {
                rejected.push(language);
            }
        }

        if rejected.is_empty() {
            return Ok(());
        }
        let languages: Vec<&str> = rejected.iter().map(Language::as_str).collect();
        let message = format!(
            "Telegram rejected every chunk of the {} message",
            languages.join(" and ")
        );
        if delivered {
            error!(video_id = %video.video_id, "{}", message);
            return Ok(());
        }
        Err(WorkerError::dispatch_failed(message))
    }

    /// Send a standalone notice through the dispatcher.
    pub async fn send_notice(&self, text: &str) -> DispatchReport {
        self.dispatcher.send_message(text).await
    }

    /// Wait for queued chunks to drain. Returns `false` on timeout.
    pub async fn wait_for_dispatch(&self, timeout: Duration) -> bool {
        self.dispatcher.retry_queue().wait_idle(timeout).await
    }

    pub fn feed(&self) -> &FeedReader {
        &self.feed
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }
}

/// Check the AI and messaging credentials before doing any work.
pub async fn validate_credentials(config: &WorkerConfig) -> WorkerResult<()> {
    GeminiClient::new(config.gemini.clone())?.test_connection().await?;

    TelegramClient::new(config.telegram.clone())?
        .test_connection()
        .await
        .map_err(|e| {
            if e.is_auth_error() {
                WorkerError::config_error("Telegram token or chat ID is invalid")
            } else {
                WorkerError::from(e)
            }
        })?;

    info!("Credentials verified");
    Ok(())
}
