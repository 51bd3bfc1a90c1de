//! Plain-text transcript rendering for closed tickets.
//!
//! Works on lightweight entries instead of serenity messages so rendering
//! is testable; the handler maps fetched history into entries.

use chrono::{TimeZone, Utc};

/// One message in the ticket surface, oldest-first after sorting.
#[derive(Clone, Debug)]
pub struct TranscriptEntry {
    /// Unix seconds the message was created.
    pub timestamp: i64,
    /// `username#discriminator` style tag.
    pub author_tag: String,
    pub author_id: u64,
    pub content: String,
    /// (filename, url) pairs.
    pub attachments: Vec<(String, String)>,
    pub has_embeds: bool,
}

/// Closing metadata for the transcript header.
#[derive(Clone, Debug)]
pub struct TranscriptHeader {
    pub channel_name: String,
    pub closed_by_tag: String,
    pub closed_by_id: u64,
    pub closed_at: i64,
    pub reason: String,
}

fn format_time(unix_secs: i64) -> String {
    match Utc.timestamp_opt(unix_secs, 0).single() {
        Some(time) => time.to_rfc3339(),
        None => unix_secs.to_string(),
    }
}

/// Render the full transcript: header block, then one block per message
/// with attachment links and an embed placeholder line.
pub fn render_transcript(header: &TranscriptHeader, entries: &mut Vec<TranscriptEntry>) -> String {
    entries.sort_by_key(|entry| entry.timestamp);

    let mut out = String::new();
    out.push_str(&format!("Ticket Transcript - {}\n", header.channel_name));
    out.push_str(&format!(
        "Closed by: {} ({})\n",
        header.closed_by_tag, header.closed_by_id
    ));
    out.push_str(&format!("Closed at: {}\n", format_time(header.closed_at)));
    out.push_str(&format!("Reason: {}\n", header.reason));
    out.push_str(&"=".repeat(51));
    out.push_str("\n\n");

    for entry in entries.iter() {
        let content = if entry.content.is_empty() {
            "[No text content]"
        } else {
            &entry.content
        };
        out.push_str(&format!(
            "[{}] {} ({}): {}\n",
            format_time(entry.timestamp),
            entry.author_tag,
            entry.author_id,
            content
        ));
        for (name, url) in &entry.attachments {
            out.push_str(&format!("  Attachment: {name} ({url})\n"));
        }
        if entry.has_embeds {
            out.push_str("  [Embed content present]\n");
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> TranscriptHeader {
        TranscriptHeader {
            channel_name: "ticket-user-123456".to_string(),
            closed_by_tag: "mod#0001".to_string(),
            closed_by_id: 42,
            closed_at: 1_700_000_100,
            reason: "resolved".to_string(),
        }
    }

    #[test]
    fn test_transcript_sorted_oldest_first() {
        let mut entries = vec![
            TranscriptEntry {
                timestamp: 1_700_000_050,
                author_tag: "user#1234".to_string(),
                author_id: 7,
                content: "second".to_string(),
                attachments: vec![],
                has_embeds: false,
            },
            TranscriptEntry {
                timestamp: 1_700_000_000,
                author_tag: "user#1234".to_string(),
                author_id: 7,
                content: "first".to_string(),
                attachments: vec![],
                has_embeds: false,
            },
        ];

        let transcript = render_transcript(&header(), &mut entries);
        let first = transcript.find("first").unwrap();
        let second = transcript.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_transcript_header_fields() {
        let transcript = render_transcript(&header(), &mut Vec::new());
        assert!(transcript.starts_with("Ticket Transcript - ticket-user-123456\n"));
        assert!(transcript.contains("Closed by: mod#0001 (42)"));
        assert!(transcript.contains("Reason: resolved"));
    }

    #[test]
    fn test_attachments_and_embeds_annotated() {
        let mut entries = vec![TranscriptEntry {
            timestamp: 1_700_000_000,
            author_tag: "user#1234".to_string(),
            author_id: 7,
            content: String::new(),
            attachments: vec![(
                "screenshot.png".to_string(),
                "https://cdn.example/screenshot.png".to_string(),
            )],
            has_embeds: true,
        }];

        let transcript = render_transcript(&header(), &mut entries);
        assert!(transcript.contains("[No text content]"));
        assert!(transcript.contains("Attachment: screenshot.png (https://cdn.example/screenshot.png)"));
        assert!(transcript.contains("[Embed content present]"));
    }
}
