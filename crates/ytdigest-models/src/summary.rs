//! Bilingual video summary models.
//!
//! The summarizer asks the model for a JSON document shaped like [`SummaryPayload`];
//! [`response_schema`] is the matching schema sent along with the request so
//! the model is constrained to it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

/// One key moment of the video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct KeyPoint {
    /// `MM:SS` or `HH:MM:SS`
    pub timestamp: String,
    #[validate(length(min = 1))]
    pub point: String,
}

/// Summary in a single language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSummary {
    #[validate(length(min = 1))]
    pub overview: String,
    #[serde(default)]
    #[validate(nested)]
    pub key_points: Vec<KeyPoint>,
    #[serde(default)]
    pub takeaways: Vec<String>,
}

/// The JSON document produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SummaryPayload {
    #[validate(nested)]
    pub english: LanguageSummary,
    #[validate(nested)]
    pub hebrew: LanguageSummary,
}

/// A validated summary plus the token usage reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub english: LanguageSummary,
    pub hebrew: LanguageSummary,
    pub token_count: u64,
}

impl Summary {
    pub fn from_payload(payload: SummaryPayload, token_count: u64) -> Self {
        Self {
            english: payload.english,
            hebrew: payload.hebrew,
            token_count,
        }
    }
}

/// Output language of a formatted summary message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Hebrew,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hebrew => "hebrew",
        }
    }
}

fn language_section_schema(
    overview_desc: &str,
    point_desc: &str,
    key_points_desc: &str,
    takeaways_desc: &str,
) -> Value {
    json!({
        "type": "object",
        "properties": {
            "overview": { "type": "string", "description": overview_desc },
            "keyPoints": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "timestamp": { "type": "string", "description": "Timestamp in MM:SS format" },
                        "point": { "type": "string", "description": point_desc }
                    },
                    "required": ["timestamp", "point"]
                },
                "description": key_points_desc
            },
            "takeaways": {
                "type": "array",
                "items": { "type": "string" },
                "description": takeaways_desc
            }
        },
        "required": ["overview", "keyPoints", "takeaways"]
    })
}

/// Response schema for the generative API (OpenAPI subset, no `$ref`s).
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "english": language_section_schema(
                "1-2 sentence overview of the video",
                "Key point description",
                "List of key points with timestamps",
                "Actionable takeaways from the video",
            ),
            "hebrew": language_section_schema(
                "סקירה של 1-2 משפטים של הווידאו",
                "תיאור נקודת מפתח",
                "רשימת נקודות מפתח עם חותמות זמן",
                "טיפים פעולים מהווידאו",
            ),
        },
        "required": ["english", "hebrew"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "english": {
            "overview": "A walkthrough of async Rust.",
            "keyPoints": [{"timestamp": "01:05", "point": "Futures are lazy"}],
            "takeaways": ["Use tokio::select! carefully"]
        },
        "hebrew": {
            "overview": "סקירה של Rust אסינכרוני.",
            "keyPoints": [{"timestamp": "01:05", "point": "פיוצ'רים עצלים"}],
            "takeaways": ["השתמשו בזהירות"]
        }
    }"#;

    #[test]
    fn test_payload_parses_camel_case() {
        let payload: SummaryPayload = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(payload.english.key_points.len(), 1);
        assert_eq!(payload.english.key_points[0].timestamp, "01:05");
        assert_eq!(payload.hebrew.takeaways.len(), 1);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_empty_overview_fails_validation() {
        let mut payload: SummaryPayload = serde_json::from_str(SAMPLE).unwrap();
        payload.hebrew.overview.clear();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_missing_section_fails_to_parse() {
        let json = r#"{"english": {"overview": "x", "keyPoints": [], "takeaways": []}}"#;
        assert!(serde_json::from_str::<SummaryPayload>(json).is_err());
    }

    #[test]
    fn test_response_schema_shape() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["english", "hebrew"]));
        assert_eq!(
            schema["properties"]["hebrew"]["properties"]["keyPoints"]["items"]["required"],
            json!(["timestamp", "point"])
        );
    }
}
