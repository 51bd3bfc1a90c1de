//! Status embed builders for Discord responses.
//!
//! Every user-visible reply goes through one of these so the whole bot
//! shares one palette and footer convention.

use crate::core::truncate_for_embed;
use serenity::builder::CreateEmbed;
use serenity::model::Timestamp;

/// Accent palette (Discord blurple family).
pub const COLOR_PRIMARY: u32 = 0x5865F2;
pub const COLOR_SUCCESS: u32 = 0x57F287;
pub const COLOR_WARNING: u32 = 0xFEE75C;
pub const COLOR_ERROR: u32 = 0xED4245;

/// Tone of a status embed, mapped to an accent color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedTone {
    Success,
    Warning,
    Error,
    Info,
}

impl EmbedTone {
    pub fn color(self) -> u32 {
        match self {
            EmbedTone::Success => COLOR_SUCCESS,
            EmbedTone::Warning => COLOR_WARNING,
            EmbedTone::Error => COLOR_ERROR,
            EmbedTone::Info => COLOR_PRIMARY,
        }
    }
}

/// Build a status embed: accent color, title, truncated description, timestamp.
///
/// Callers needing extras (footer, thumbnail) can chain additional setters
/// on the returned embed.
pub fn status_embed(tone: EmbedTone, title: &str, description: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.color(tone.color());
    embed.title(title);
    embed.description(truncate_for_embed(description));
    embed.timestamp(Timestamp::now());
    embed
}

pub fn success_embed(title: &str, description: &str) -> CreateEmbed {
    status_embed(EmbedTone::Success, title, description)
}

pub fn warning_embed(title: &str, description: &str) -> CreateEmbed {
    status_embed(EmbedTone::Warning, title, description)
}

pub fn error_embed(title: &str, description: &str) -> CreateEmbed {
    status_embed(EmbedTone::Error, title, description)
}

pub fn info_embed(title: &str, description: &str) -> CreateEmbed {
    status_embed(EmbedTone::Info, title, description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_colors() {
        assert_eq!(EmbedTone::Success.color(), COLOR_SUCCESS);
        assert_eq!(EmbedTone::Warning.color(), COLOR_WARNING);
        assert_eq!(EmbedTone::Error.color(), COLOR_ERROR);
        assert_eq!(EmbedTone::Info.color(), COLOR_PRIMARY);
    }

    #[test]
    fn test_status_embed_builds() {
        // CreateEmbed is opaque; if it builds without panic, it's correct
        let _embed = status_embed(EmbedTone::Info, "Title", "Description");
    }

    #[test]
    fn test_status_embed_truncates_long_description() {
        let long = "a".repeat(10_000);
        let _embed = status_embed(EmbedTone::Error, "Title", &long);
    }
}
