//! Message chunking.
//!
//! Telegram caps a message at 4096 characters; chunks are kept at 4000 to
//! leave headroom. Cuts prefer the last line break in the final fifth of
//! the window so lines stay intact, and fall back to a hard cut so the
//! bound always holds.

/// Maximum chunk length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Split `text` into chunks of at most [`MAX_MESSAGE_LENGTH`] characters.
pub fn split_message(text: &str) -> Vec<String> {
    split_message_with_limit(text, MAX_MESSAGE_LENGTH)
}

/// Split `text` into chunks of at most `limit` characters.
///
/// Text within the limit is returned untouched as a single chunk.
/// Otherwise each chunk ends at the last `\n` of the window when that line
/// break sits past 80% of the limit, or exactly at the limit. Leading
/// whitespace of the remainder is dropped before the next chunk.
pub fn split_message_with_limit(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let min_break = limit * 4 / 5;
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        // Byte offset of the first character past the window.
        let window_end = match remaining.char_indices().nth(limit) {
            Some((idx, _)) => idx,
            None => {
                chunks.push(remaining.to_string());
                break;
            }
        };

        let window = &remaining[..window_end];
        let cut = match window.rfind('\n') {
            Some(newline) if window[..newline].chars().count() > min_break => newline,
            _ => window_end,
        };

        chunks.push(remaining[..cut].to_string());
        remaining = remaining[cut..].trim_start();
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Check that `chunks` rebuild `text` when the dropped whitespace is put back.
    fn reconstructs(text: &str, chunks: &[String]) -> bool {
        let mut rest = text;
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                rest = rest.trim_start();
            }
            match rest.strip_prefix(chunk.as_str()) {
                Some(after) => rest = after,
                None => return false,
            }
        }
        rest.trim().is_empty()
    }

    fn assert_bounded(chunks: &[String], limit: usize) {
        for chunk in chunks {
            assert!(chunk.chars().count() <= limit, "chunk of {} chars", chunk.chars().count());
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        assert_eq!(split_message("hello"), vec!["hello".to_string()]);
        assert_eq!(split_message(""), vec![String::new()]);

        let exact = "x".repeat(MAX_MESSAGE_LENGTH);
        assert_eq!(split_message(&exact), vec![exact.clone()]);

        let padded = format!("  {}\n", "y".repeat(MAX_MESSAGE_LENGTH - 3));
        assert_eq!(split_message(&padded), vec![padded.clone()]);
    }

    #[test]
    fn test_no_newlines_cuts_at_bound() {
        let text = "a".repeat(MAX_MESSAGE_LENGTH * 2 + 10);
        let chunks = split_message(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), MAX_MESSAGE_LENGTH);
        assert_eq!(chunks[1].len(), MAX_MESSAGE_LENGTH);
        assert_eq!(chunks[2].len(), 10);
        assert!(reconstructs(&text, &chunks));
    }

    #[test]
    fn test_prefers_late_newline() {
        let first = "a".repeat(3500);
        let text = format!("{}\n{}", first, "b".repeat(1000));
        let chunks = split_message(&text);

        assert_eq!(chunks, vec![first, "b".repeat(1000)]);
    }

    #[test]
    fn test_ignores_early_newline() {
        // Line break at char 100 is before the 80% mark, so cut hard.
        let text = format!("{}\n{}", "a".repeat(100), "b".repeat(5000));
        let chunks = split_message(&text);

        assert_eq!(chunks[0].chars().count(), MAX_MESSAGE_LENGTH);
        assert!(chunks[0].contains('\n'));
        assert!(reconstructs(&text, &chunks));
    }

    #[test]
    fn test_newline_exactly_at_threshold_is_not_used() {
        let threshold = MAX_MESSAGE_LENGTH * 4 / 5;
        let text = format!("{}\n{}", "a".repeat(threshold), "b".repeat(2000));
        let chunks = split_message(&text);

        assert_eq!(chunks[0].chars().count(), MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn test_multibyte_characters_are_counted_as_chars() {
        let text = "ש".repeat(MAX_MESSAGE_LENGTH + 1);
        let chunks = split_message(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), MAX_MESSAGE_LENGTH);
        assert_eq!(chunks[1], "ש");
    }

    #[test]
    fn test_leading_whitespace_of_remainder_is_trimmed() {
        let text = format!("{}\n   \n\t{}", "a".repeat(3900), "b".repeat(500));
        let chunks = split_message(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "b".repeat(500));
    }

    #[test]
    fn test_long_realistic_messages_reconstruct_within_bound() {
        for line_len in [7usize, 63, 199, 811, 3999, 4500] {
            let line = format!("{}•", "word ".repeat(line_len / 5));
            let lines = 9000 / (line.chars().count() + 1) + 2;
            let text = vec![line; lines].join("\n");
            assert!(text.chars().count() > MAX_MESSAGE_LENGTH);

            let chunks = split_message(&text);

            assert_bounded(&chunks, MAX_MESSAGE_LENGTH);
            assert!(reconstructs(&text, &chunks), "line_len={}", line_len);
        }
    }

    #[test]
    fn test_custom_limit() {
        let chunks = split_message_with_limit("line one\nline two\nline three", 9);
        assert_bounded(&chunks, 9);
        assert_eq!(chunks, vec!["line one", "line two", "line thre", "e"]);
    }
}
