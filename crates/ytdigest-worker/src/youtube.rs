//! YouTube Data API client.
//!
//! Two calls per cycle: a channel search for uploads published after the
//! watermark, then a batched `videos` lookup for liveness details.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use ytdigest_models::{LiveStatus, LiveStreamingDetails, VideoCandidate};

use crate::error::{WorkerError, WorkerResult};

const SERVICE: &str = "YouTube";

/// Source of feed candidates.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Channel uploads published after `published_after`, enriched with
    /// liveness status.
    async fn fetch_candidates(&self, published_after: DateTime<Utc>) -> WorkerResult<Vec<VideoCandidate>>;
}

/// YouTube client configuration.
#[derive(Clone)]
pub struct YoutubeConfig {
    pub api_key: String,
    pub channel_id: String,
    pub api_base: String,
    pub timeout: Duration,
    /// Search page size; results are not paginated
    pub max_results: u32,
}

impl std::fmt::Debug for YoutubeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeConfig")
            .field("api_key", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl YoutubeConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/youtube/v3";
    pub const DEFAULT_CHANNEL_ID: &'static str = "UCbRP3c757lWg9M-U7TyEkXA";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            channel_id: Self::DEFAULT_CHANNEL_ID.to_string(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
            max_results: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    #[serde(default)]
    live_streaming_details: Option<LiveStreamingDetails>,
}

/// YouTube Data API v3 client.
pub struct YoutubeClient {
    http: Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    pub fn new(config: YoutubeConfig) -> WorkerResult<Self> {
        if config.api_key.is_empty() {
            return Err(WorkerError::config_error("YOUTUBE_API_KEY not set"));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WorkerError::from_request(SERVICE, e))?;

        Ok(Self { http, config })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), name)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> WorkerResult<T> {
        let response = self
            .http
            .get(self.endpoint(endpoint))
            .query(&[("key", self.config.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| WorkerError::from_request(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkerError::from_request(SERVICE, e))?;

        if !status.is_success() {
            return Err(WorkerError::from_http_status(
                SERVICE,
                status.as_u16(),
                body.chars().take(300).collect::<String>(),
            ));
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn search(&self, published_after: DateTime<Utc>) -> WorkerResult<Vec<SearchItem>> {
        let query = [
            ("channelId", self.config.channel_id.clone()),
            ("part", "snippet".to_string()),
            ("order", "date".to_string()),
            ("type", "video".to_string()),
            (
                "publishedAfter",
                published_after.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            ),
            ("maxResults", self.config.max_results.to_string()),
        ];

        let response: SearchResponse = self.get_json("search", &query).await?;
        Ok(response.items)
    }

    async fn live_details(&self, ids: &[String]) -> WorkerResult<HashMap<String, LiveStreamingDetails>> {
        let query = [
            ("id", ids.join(",")),
            ("part", "liveStreamingDetails,status".to_string()),
        ];

        let response: VideosResponse = self.get_json("videos", &query).await?;
        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.live_streaming_details.map(|d| (item.id, d)))
            .collect())
    }
}

#[async_trait]
impl FeedSource for YoutubeClient {
    async fn fetch_candidates(&self, published_after: DateTime<Utc>) -> WorkerResult<Vec<VideoCandidate>> {
        let items = self.search(published_after).await?;
        let items: Vec<(String, Snippet)> = items
            .into_iter()
            .filter_map(|item| item.id.video_id.map(|id| (id, item.snippet)))
            .collect();

        if items.is_empty() {
            debug!(%published_after, "No uploads since watermark");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = items.iter().map(|(id, _)| id.clone()).collect();
        let details = self.live_details(&ids).await?;
        let now = Utc::now();

        let candidates: Vec<VideoCandidate> = items
            .into_iter()
            .map(|(id, snippet)| {
                let status = LiveStatus::from_details(details.get(&id), now);
                VideoCandidate::new(id, unescape_entities(&snippet.title), snippet.published_at, status)
            })
            .collect();

        info!(count = candidates.len(), "Fetched feed candidates");
        Ok(candidates)
    }
}

/// Search snippets return titles with HTML entities; undo the common ones.
fn unescape_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> YoutubeClient {
        let mut config = YoutubeConfig::new("yt-key");
        config.channel_id = "UCchannel".to_string();
        config.api_base = server.uri();
        YoutubeClient::new(config).unwrap()
    }

    fn search_item(id: &str, title: &str) -> serde_json::Value {
        json!({
            "id": {"kind": "youtube#video", "videoId": id},
            "snippet": {"title": title, "publishedAt": "2024-05-01T10:00:00Z"}
        })
    }

    #[tokio::test]
    async fn test_fetch_candidates_classifies_liveness() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("key", "yt-key"))
            .and(query_param("channelId", "UCchannel"))
            .and(query_param("order", "date"))
            .and(query_param("type", "video"))
            .and(query_param("maxResults", "50"))
            .and(query_param("publishedAfter", "2024-05-01T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    search_item("aaaaaaaaaaa", "Regular &amp; upload"),
                    search_item("bbbbbbbbbbb", "Live now"),
                    search_item("ccccccccccc", "Premiere"),
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "aaaaaaaaaaa,bbbbbbbbbbb,ccccccccccc"))
            .and(query_param("part", "liveStreamingDetails,status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "aaaaaaaaaaa", "status": {"privacyStatus": "public"}},
                    {"id": "bbbbbbbbbbb", "liveStreamingDetails": {"actualStartTime": "2024-05-01T09:00:00Z"}},
                    {"id": "ccccccccccc", "liveStreamingDetails": {"scheduledStartTime": "2999-01-01T00:00:00Z"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let after = DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let candidates = client_for(&server).fetch_candidates(after).await.unwrap();

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].title, "Regular & upload");
        assert_eq!(candidates[0].live_status, LiveStatus::NotLive);
        assert!(matches!(candidates[1].live_status, LiveStatus::Live { .. }));
        assert!(matches!(candidates[2].live_status, LiveStatus::Upcoming { .. }));
        assert_eq!(candidates[0].url, "https://www.youtube.com/watch?v=aaaaaaaaaaa");
    }

    #[tokio::test]
    async fn test_empty_search_skips_details_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let candidates = client_for(&server).fetch_candidates(Utc::now()).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_quota_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_candidates(Utc::now()).await.unwrap_err();
        assert_eq!(err.http_status(), Some(403));
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_entities("Tom&#39;s &quot;AT&amp;T&quot;"), "Tom's \"AT&T\"");
        assert_eq!(unescape_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", YoutubeConfig::new("secret"));
        assert!(!rendered.contains("secret"));
    }
}
