//! Telegram HTML rendering of a summary.
//!
//! One message per language. Model output and titles are escaped; key
//! points link into the video at their timestamp.

use std::fmt::Write;

use ytdigest_models::{create_timestamp_link, escape_attr, escape_html, Language, LanguageSummary, Summary, Video};

struct Headings {
    summary: &'static str,
    key_points: &'static str,
    takeaways: &'static str,
}

fn headings(language: Language) -> Headings {
    match language {
        Language::English => Headings {
            summary: "📝 Summary (English)",
            key_points: "🎯 Key Points:",
            takeaways: "💡 Takeaways:",
        },
        Language::Hebrew => Headings {
            summary: "📝 סיכום (עברית)",
            key_points: "🎯 נקודות מפתח:",
            takeaways: "💡 טיפים:",
        },
    }
}

/// Render one language section of `summary` for `video`.
pub fn format_summary(video: &Video, summary: &LanguageSummary, language: Language) -> String {
    let h = headings(language);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = write!(
        out,
        "<b>📺 {}</b>\n\n<b>🔗 Watch:</b> {}\n\n<b>{}</b>\n{}\n",
        escape_html(&video.title),
        escape_html(&video.url),
        h.summary,
        escape_html(&summary.overview),
    );

    if !summary.key_points.is_empty() {
        let _ = write!(out, "\n<b>{}</b>\n", h.key_points);
        for kp in &summary.key_points {
            let link = create_timestamp_link(&video.url, &kp.timestamp);
            let _ = writeln!(
                out,
                "<a href=\"{}\">[{}]</a> {}",
                escape_attr(&link),
                escape_html(&kp.timestamp),
                escape_html(&kp.point)
            );
        }
    }

    if !summary.takeaways.is_empty() {
        let _ = write!(out, "\n<b>{}</b>\n", h.takeaways);
        for takeaway in &summary.takeaways {
            let _ = writeln!(out, "• {}", escape_html(takeaway));
        }
    }

    out
}

/// English then Hebrew message for `video`.
pub fn format_messages(video: &Video, summary: &Summary) -> [(Language, String); 2] {
    [
        (Language::English, format_summary(video, &summary.english, Language::English)),
        (Language::Hebrew, format_summary(video, &summary.hebrew, Language::Hebrew)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ytdigest_models::KeyPoint;

    fn video() -> Video {
        Video::new("dQw4w9WgXcQ", "Tips & <Tricks>", Utc::now())
    }

    fn section(overview: &str) -> LanguageSummary {
        LanguageSummary {
            overview: overview.to_string(),
            key_points: vec![
                KeyPoint {
                    timestamp: "01:30".to_string(),
                    point: "Intro".to_string(),
                },
                KeyPoint {
                    timestamp: "00:00".to_string(),
                    point: "Start".to_string(),
                },
            ],
            takeaways: vec!["Ship it".to_string()],
        }
    }

    #[test]
    fn test_english_layout() {
        let text = format_summary(&video(), &section("Overview here."), Language::English);

        let expected = "<b>📺 Tips &amp; &lt;Tricks&gt;</b>\n\n\
            <b>🔗 Watch:</b> https://www.youtube.com/watch?v=dQw4w9WgXcQ\n\n\
            <b>📝 Summary (English)</b>\nOverview here.\n\n\
            <b>🎯 Key Points:</b>\n\
            <a href=\"https://www.youtube.com/watch?v=dQw4w9WgXcQ&amp;t=90s\">[01:30]</a> Intro\n\
            <a href=\"https://www.youtube.com/watch?v=dQw4w9WgXcQ\">[00:00]</a> Start\n\n\
            <b>💡 Takeaways:</b>\n• Ship it\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_hebrew_headings() {
        let text = format_summary(&video(), &section("סקירה"), Language::Hebrew);

        assert!(text.contains("<b>📝 סיכום (עברית)</b>\nסקירה\n"));
        assert!(text.contains("<b>🎯 נקודות מפתח:</b>"));
        assert!(text.contains("<b>💡 טיפים:</b>"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let summary = LanguageSummary {
            overview: "Short.".to_string(),
            key_points: Vec::new(),
            takeaways: Vec::new(),
        };
        let text = format_summary(&video(), &summary, Language::English);

        assert!(!text.contains("Key Points"));
        assert!(!text.contains("Takeaways"));
        assert!(text.ends_with("Short.\n"));
    }

    #[test]
    fn test_model_text_is_escaped() {
        let mut summary = section("a <script> b");
        summary.takeaways = vec!["x & y".to_string()];
        let text = format_summary(&video(), &summary, Language::English);

        assert!(text.contains("a &lt;script&gt; b"));
        assert!(text.contains("• x &amp; y"));
    }

    #[test]
    fn test_format_messages_order() {
        let summary = Summary {
            english: section("en"),
            hebrew: section("he"),
            token_count: 0,
        };
        let messages = format_messages(&video(), &summary);

        assert_eq!(messages[0].0, Language::English);
        assert_eq!(messages[1].0, Language::Hebrew);
        assert!(messages[1].1.contains("טיפים"));
    }
}
