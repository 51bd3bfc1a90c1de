//! # Command System
//!
//! Slash command definitions, handlers and dispatch.

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod registry;
pub mod slash;

// Re-export handler infrastructure
pub use context::CommandContext;
pub use dispatcher::CommandDispatcher;
pub use handler::SlashCommandHandler;
pub use registry::{CommandCategory, CommandRegistry};

// Re-export commonly used items from submodules
pub use slash::{
    create_slash_commands, get_bool_option, get_channel_option, get_integer_option,
    get_role_option, get_string_option, get_user_option, register_global_commands,
    register_guild_commands,
};
