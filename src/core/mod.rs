//! # Core Module
//!
//! Configuration, embed construction, response utilities and the typed
//! rejection catalogue shared by every workflow.

pub mod config;
pub mod embeds;
pub mod rejection;
pub mod response;

// Re-export commonly used items
pub use config::Config;
pub use embeds::{
    error_embed, info_embed, success_embed, warning_embed, EmbedTone, COLOR_ERROR, COLOR_PRIMARY,
    COLOR_SUCCESS, COLOR_WARNING,
};
pub use rejection::Rejection;
pub use response::{truncate_for_embed, EMBED_LIMIT};
