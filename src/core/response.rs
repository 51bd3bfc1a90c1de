//! Discord message-size utilities.
//!
//! Transcripts and settings dumps can exceed Discord's embed limit, so
//! anything of unbounded length is truncated before sending.

/// Discord embed description limit
pub const EMBED_LIMIT: usize = 4096;

/// Truncate text to fit embed limit, adding ellipsis if needed
pub fn truncate_for_embed(text: &str) -> String {
    if text.len() <= EMBED_LIMIT {
        return text.to_string();
    }
    // Find a safe UTF-8 boundary with room for the ellipsis
    let mut end = EMBED_LIMIT - 3;
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_embed_short() {
        assert_eq!(truncate_for_embed("short text"), "short text");
    }

    #[test]
    fn test_truncate_for_embed_long() {
        let result = truncate_for_embed(&"a".repeat(5000));
        assert!(result.len() <= EMBED_LIMIT);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_utf8_safety() {
        let text = "transcript 世界! ".repeat(300);
        let result = truncate_for_embed(&text);
        assert!(result.len() <= EMBED_LIMIT);
        assert!(result.is_char_boundary(result.len() - 3));
    }
}
