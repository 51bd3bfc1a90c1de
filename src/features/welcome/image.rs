//! Welcome-card image fetching.
//!
//! The card background is an operator-supplied URL. Fetch failures are the
//! caller's cue to fall back to a text-only welcome; nothing here is load
//! bearing.

use anyhow::{anyhow, Result};

/// Refuse to attach anything bigger than Discord's 8 MiB default limit.
const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Fetch the configured background image for attachment to the welcome
/// message.
pub async fn fetch_welcome_card(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "background fetch returned status {}",
            response.status()
        ));
    }

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(anyhow!(
            "background image too large: {} bytes",
            bytes.len()
        ));
    }
    if bytes.is_empty() {
        return Err(anyhow!("background fetch returned an empty body"));
    }
    Ok(bytes.to_vec())
}

/// Attachment filename for the welcome card.
pub fn card_filename(url: &str) -> &'static str {
    let lower = url.to_ascii_lowercase();
    if lower.ends_with(".gif") {
        "welcome.gif"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "welcome.jpg"
    } else {
        "welcome.png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_filename_from_extension() {
        assert_eq!(card_filename("https://x/bg.PNG"), "welcome.png");
        assert_eq!(card_filename("https://x/bg.jpg"), "welcome.jpg");
        assert_eq!(card_filename("https://x/bg.jpeg"), "welcome.jpg");
        assert_eq!(card_filename("https://x/bg.gif"), "welcome.gif");
        assert_eq!(card_filename("https://x/bg"), "welcome.png");
    }
}
