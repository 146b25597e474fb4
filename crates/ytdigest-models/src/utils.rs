//! URL and text helpers shared by the feed reader, formatter and CLI.

use url::Url;

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeIdError {
    /// URL is not a valid YouTube URL
    InvalidYoutubeUrl,
    /// Video ID has invalid format
    InvalidVideoId,
    /// Video ID not found in URL
    VideoIdNotFound,
}

impl std::fmt::Display for YoutubeIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YoutubeIdError::InvalidYoutubeUrl => write!(f, "URL is not a valid YouTube URL"),
            YoutubeIdError::InvalidVideoId => write!(f, "Video ID has invalid format"),
            YoutubeIdError::VideoIdNotFound => write!(f, "Video ID not found in URL"),
        }
    }
}

impl std::error::Error for YoutubeIdError {}

/// Extract the 11-character video id from a watch, short, embed or shorts URL.
pub fn extract_video_id(raw: &str) -> Result<String, YoutubeIdError> {
    let url = Url::parse(raw.trim()).map_err(|_| YoutubeIdError::InvalidYoutubeUrl)?;
    let host = url
        .host_str()
        .map(|h| h.to_ascii_lowercase())
        .ok_or(YoutubeIdError::InvalidYoutubeUrl)?;

    let candidate = if host == "youtu.be" {
        url.path_segments().and_then(|mut s| s.next()).map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        let mut segments = url.path_segments().map(|s| s.collect::<Vec<_>>()).unwrap_or_default();
        match segments.first().copied() {
            Some("watch") => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some("embed") | Some("shorts") | Some("v") | Some("live") if segments.len() > 1 => {
                Some(segments.swap_remove(1).to_string())
            }
            _ => None,
        }
    } else {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    };

    match candidate {
        Some(id) if id.is_empty() => Err(YoutubeIdError::VideoIdNotFound),
        Some(id) => validate_video_id(id),
        None => Err(YoutubeIdError::VideoIdNotFound),
    }
}

fn validate_video_id(id: String) -> Result<String, YoutubeIdError> {
    let valid = id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(YoutubeIdError::InvalidVideoId)
    }
}

/// Escape text for Telegram's HTML parse mode.
///
/// Only `&`, `<` and `>` are significant outside attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for use inside a double-quoted HTML attribute.
pub fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}
