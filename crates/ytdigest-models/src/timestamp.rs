//! Timestamp parsing and deep-link utilities.
//!
//! Key points returned by the summarizer carry `MM:SS` or `HH:MM:SS`
//! timestamps. These helpers turn them into seconds and into watch URLs that
//! jump straight to the moment in the video.

use url::Url;

/// Parse a timestamp string to total seconds.
///
/// Supports formats:
/// - `HH:MM:SS`
/// - `MM:SS`
///
/// # Examples
/// ```
/// use ytdigest_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<u64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let component = |name: &'static str, value: &str| -> Result<u64, TimestampError> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| TimestampError::InvalidValue(name, value.to_string()))
    };

    match parts.len() {
        2 => {
            let minutes = component("minutes", parts[0])?;
            let seconds = component("seconds", parts[1])?;
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .ok_or_else(|| TimestampError::InvalidValue("minutes", parts[0].to_string()))
        }
        3 => {
            let hours = component("hours", parts[0])?;
            let minutes = component("minutes", parts[1])?;
            let seconds = component("seconds", parts[2])?;
            hours
                .checked_mul(3600)
                .ok_or_else(|| TimestampError::InvalidValue("hours", parts[0].to_string()))?
                .checked_add(
                    minutes
                        .checked_mul(60)
                        .ok_or_else(|| TimestampError::InvalidValue("minutes", parts[1].to_string()))?,
                )
                .and_then(|s| s.checked_add(seconds))
                .ok_or_else(|| TimestampError::InvalidValue("hours", parts[0].to_string()))
        }
        _ => Err(TimestampError::InvalidFormat(ts.to_string())),
    }
}

/// Lenient variant of [`parse_timestamp`]: anything unparseable is `0`.
///
/// A zero result means "no usable offset"; callers link to the start of the
/// video in that case.
pub fn timestamp_to_seconds(ts: &str) -> u64 {
    parse_timestamp(ts).unwrap_or(0)
}

/// Format seconds as `MM:SS` (minutes are not wrapped into hours).
pub fn format_timestamp(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Build a deep link into `video_url` at the given timestamp.
///
/// Returns the URL unchanged when the timestamp resolves to zero seconds.
/// Appends `t=<N>s` with `&` when the URL already carries a query string,
/// `?` otherwise.
pub fn create_timestamp_link(video_url: &str, timestamp: &str) -> String {
    let seconds = timestamp_to_seconds(timestamp);
    if seconds == 0 {
        return video_url.to_string();
    }

    match Url::parse(video_url) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("t", &format!("{}s", seconds));
            url.to_string()
        }
        Err(_) => {
            let separator = if video_url.contains('?') { '&' } else { '?' };
            format!("{}{}t={}s", video_url, separator, seconds)
        }
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Timestamp string is empty
    Empty,
    /// Invalid numeric value for a component
    InvalidValue(&'static str, String),
    /// Neither `MM:SS` nor `HH:MM:SS`
    InvalidFormat(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Timestamp cannot be empty"),
            Self::InvalidValue(component, value) => {
                write!(f, "Invalid {} value: {}", component, value)
            }
            Self::InvalidFormat(ts) => write!(
                f,
                "Invalid timestamp format '{}'. Use MM:SS or HH:MM:SS",
                ts
            ),
        }
    }
}

impl std::error::Error for TimestampError {}
