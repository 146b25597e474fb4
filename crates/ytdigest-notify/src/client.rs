//! Telegram Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NotifyError, NotifyResult};

/// Something that can deliver one message chunk.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver `text` to the configured destination.
    async fn send_text(&self, text: &str) -> NotifyResult<()>;
}

/// Telegram client configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    /// API base, without the `/bot<token>` suffix
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    /// Request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TelegramConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://api.telegram.org";

    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client. The bot token is part of the request path.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> NotifyResult<Self> {
        if config.bot_token.is_empty() || config.chat_id.is_empty() {
            return Err(NotifyError::config_error(
                "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set",
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("ytdigest-notify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NotifyError::Network)?;

        Ok(Self { http, config })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    /// Verify the bot token with `getMe`.
    pub async fn test_connection(&self) -> NotifyResult<()> {
        let response = self
            .http
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.without_url()))?;

        Self::check_response(response).await
    }

    async fn check_response(response: reqwest::Response) -> NotifyResult<()> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Network(e.without_url()))?;

        let parsed: Option<TelegramResponse> = serde_json::from_str(&body).ok();
        let description = parsed
            .as_ref()
            .and_then(|r| r.description.clone())
            .unwrap_or_else(|| body.clone());

        if !status.is_success() {
            return Err(NotifyError::from_http_status(status.as_u16(), description));
        }

        match parsed {
            Some(r) if r.ok => Ok(()),
            Some(_) => Err(NotifyError::InvalidResponse(description)),
            None => Err(NotifyError::InvalidResponse(format!(
                "unexpected body: {}",
                body.chars().take(200).collect::<String>()
            ))),
        }
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send_text(&self, text: &str) -> NotifyResult<()> {
        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: "HTML",
        };

        debug!(chars = text.chars().count(), "Sending Telegram message");

        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            // The URL carries the bot token; keep it out of error messages.
            .map_err(|e| NotifyError::Network(e.without_url()))?;

        Self::check_response(response).await
    }
}
