//! Channel digest worker binary.

use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use ytdigest_models::{escape_html, extract_video_id, Video};
use ytdigest_worker::{init_tracing, run_scheduled, validate_credentials, Pipeline, WorkerConfig, WorkerError, WorkerResult};

const TEST_VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Summarize new uploads of a YouTube channel into Telegram
#[derive(Parser)]
#[command(name = "ytdigest-worker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one pass over the feed and exit
    RunOnce,
    /// Run now, then daily at the configured UTC time
    Schedule,
    /// Summarize and send one video without touching the dedup store
    TestVideo {
        /// Video URL
        #[arg(long, default_value = TEST_VIDEO_URL)]
        url: String,
        /// Title used in the message
        #[arg(long, default_value = "Test Video")]
        title: String,
    },
    /// Process the channel's latest upload regardless of the dedup store
    TestLatest,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::RunOnce);

    if let Err(e) = run(command).await {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> WorkerResult<()> {
    let config = WorkerConfig::from_env()?;
    info!("Worker config: {:?}", config);

    validate_credentials(&config).await?;
    let mut pipeline = Pipeline::from_config(&config).await?;

    match command {
        Command::RunOnce => {
            pipeline.run_once().await;
        }
        Command::Schedule => {
            let shutdown = async {
                tokio::signal::ctrl_c().await.ok();
            };
            run_scheduled(&mut pipeline, config.schedule, shutdown).await;
        }
        Command::TestVideo { url, title } => {
            let video_id = extract_video_id(&url)
                .map_err(|e| WorkerError::config_error(format!("Invalid video URL {}: {}", url, e)))?;
            let mut video = Video::new(video_id, title, Utc::now());
            video.url = url;
            pipeline.deliver_video(&video).await?;
        }
        Command::TestLatest => test_latest(&pipeline).await?,
    }

    if !pipeline.wait_for_dispatch(config.dispatch_drain_timeout).await {
        warn!(
            "Retry queue not drained after {:?}; queued messages are dropped on exit",
            config.dispatch_drain_timeout
        );
    }
    info!("Worker shutdown complete");
    Ok(())
}

async fn test_latest(pipeline: &Pipeline) -> WorkerResult<()> {
    let since = Utc
        .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    let videos = pipeline.feed().fetch_videos_since(since).await?;
    let Some(latest) = videos.first() else {
        return Err(WorkerError::feed_failed("No published videos found on the channel"));
    };

    info!(video_id = %latest.video_id, "Testing with latest video: {}", latest.title);
    pipeline.deliver_video(latest).await?;

    let notice = format!(
        "✅ <b>YouTube Summarizer is Online!</b>\n\nTest run completed successfully.\nLatest video processed: <b>{}</b>",
        escape_html(&latest.title)
    );
    pipeline.send_notice(&notice).await;
    Ok(())
}
