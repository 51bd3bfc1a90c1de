//! # Features Layer
//!
//! Workflow modules: the business rules the command layer drives.

pub mod moderation;
pub mod rate_limiting;
pub mod tickets;
pub mod welcome;

// Re-export primary workflow types
pub use moderation::{parse_duration, ModerationWorkflow, AUTO_MUTE_MS, MAX_TIMEOUT_MS};
pub use rate_limiting::RateLimiter;
pub use tickets::TicketWorkflow;
pub use welcome::WelcomeWorkflow;
