// Core layer - shared types, configuration, embed and response helpers
pub mod core;

// Features layer - workflow modules
pub mod features;

// Infrastructure
pub mod database;
pub mod health;

// Application layer
pub mod commands;

// Re-export core config
pub use core::Config;

// Re-export feature items
pub use features::{
    // Moderation
    parse_duration, ModerationWorkflow, MAX_TIMEOUT_MS,
    // Rate limiting
    RateLimiter,
    // Tickets
    TicketWorkflow,
    // Welcome / auto-role
    WelcomeWorkflow,
};

pub use database::Database;
