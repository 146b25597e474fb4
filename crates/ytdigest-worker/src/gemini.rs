//! Gemini client for bilingual video summaries.
//!
//! The video is passed by URL as `file_data`; the model watches it directly
//! and answers with JSON constrained by [`response_schema`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use validator::Validate;
use ytdigest_models::{response_schema, Summary, SummaryPayload};

use crate::error::{WorkerError, WorkerResult};

const SERVICE: &str = "Gemini";

const SUMMARY_PROMPT: &str = "Please watch and summarize this YouTube video in BOTH English and Hebrew.

Provide:
1. A brief overview (1-2 sentences)
2. Key points with timestamps (if available)
3. Actionable takeaways

Focus on the main topics and important information.";

const PING_PROMPT: &str = "Say \"OK\" if you can read this.";

/// Overview phrases that suggest the model described a generic video
/// instead of watching this one.
const GENERIC_MARKERS: [&str; 3] = ["time management", "productivity", "habit"];

/// One summarization attempt. Retry policy lives with the caller.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn generate_summary(&self, video_url: &str) -> WorkerResult<Summary>;
}

/// Gemini client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base up to and including the API version
    pub api_base: String,
    pub timeout: Duration,
    /// Timeout of the startup ping
    pub ping_timeout: Duration,
    /// Log raw responses and flag generic-looking summaries
    pub debug: bool,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish()
    }
}

impl GeminiConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(120),
            ping_timeout: Duration::from_secs(10),
            debug: false,
        }
    }
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    File { file_data: FileData },
}

#[derive(Debug, Serialize)]
struct FileData {
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: Option<u64>,
}

impl GeminiResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    fn total_tokens(&self) -> u64 {
        self.usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count)
            .unwrap_or(0)
    }
}

/// Gemini API client.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> WorkerResult<Self> {
        if config.api_key.is_empty() {
            return Err(WorkerError::config_error("GEMINI_API_KEY not set"));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WorkerError::from_request(SERVICE, e))?;

        Ok(Self { http, config })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Call `generateContent` and return the parsed response.
    async fn call_gemini_api(&self, request: &GeminiRequest, timeout: Duration) -> WorkerResult<GeminiResponse> {
        let response = self
            .http
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| WorkerError::from_request(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(WorkerError::from_http_status(
                SERVICE,
                status.as_u16(),
                error_text.chars().take(500).collect::<String>(),
            ));
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                WorkerError::from_request(SERVICE, e)
            } else {
                WorkerError::ai_failed(format!("Failed to parse Gemini response: {}", e.without_url()))
            }
        })
    }

    /// Verify the API key with a tiny prompt.
    pub async fn test_connection(&self) -> WorkerResult<()> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: PING_PROMPT.to_string(),
                }],
            }],
            generation_config: None,
        };

        let response = match self.call_gemini_api(&request, self.config.ping_timeout).await {
            Ok(response) => response,
            Err(e) if e.is_auth_error() => {
                return Err(WorkerError::config_error("Gemini API key is invalid"));
            }
            Err(e) => return Err(e),
        };

        response
            .first_text()
            .ok_or_else(|| WorkerError::ai_failed("Gemini ping returned no text"))?;
        info!(model = %self.config.model, "Gemini connection verified");
        Ok(())
    }

    fn log_debug_details(&self, raw: &str, payload: &SummaryPayload) {
        let preview: String = raw.chars().take(300).collect();
        info!(raw_preview = %preview, "Gemini raw response");

        let overview = payload.english.overview.to_lowercase();
        if GENERIC_MARKERS.iter().any(|m| overview.contains(m)) {
            warn!(
                "Summary looks generic, the model may not have watched the video: {}",
                payload.english.overview
            );
        }
    }
}

/// Strip a markdown code fence around a JSON body, if present.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[async_trait]
impl SummaryProvider for GeminiClient {
    async fn generate_summary(&self, video_url: &str) -> WorkerResult<Summary> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: SUMMARY_PROMPT.to_string(),
                    },
                    Part::File {
                        file_data: FileData {
                            file_uri: video_url.to_string(),
                        },
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            }),
        };

        let response = self.call_gemini_api(&request, self.config.timeout).await?;
        let raw = response
            .first_text()
            .ok_or_else(|| WorkerError::ai_failed("No summary text in Gemini response"))?;

        let payload: SummaryPayload = serde_json::from_str(strip_code_fence(raw))
            .map_err(|e| WorkerError::ai_failed(format!("Failed to parse summary JSON: {}", e)))?;
        payload
            .validate()
            .map_err(|e| WorkerError::ai_failed(format!("Summary failed validation: {}", e)))?;

        if self.config.debug {
            self.log_debug_details(raw, &payload);
        }

        let tokens = response.total_tokens();
        debug!(tokens, "Summary generated");
        Ok(Summary::from_payload(payload, tokens))
    }
}
