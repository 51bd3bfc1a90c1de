//! Slash command handler trait.

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

use super::context::CommandContext;

/// Trait for slash command handlers
///
/// Each handler processes one or more slash commands. Handlers are
/// registered with a CommandRegistry and dispatched by command name.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl SlashCommandHandler for PingHandler {
///     fn command_names(&self) -> &'static [&'static str] {
///         &["ping"]
///     }
///
///     async fn handle(
///         &self,
///         ctx: Arc<CommandContext>,
///         serenity_ctx: &Context,
///         command: &ApplicationCommandInteraction,
///     ) -> Result<()> {
///         // Handle ping command
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Command name(s) this handler processes
    fn command_names(&self) -> &'static [&'static str];

    /// Handle the slash command
    ///
    /// Expected precondition failures are rendered by the handler itself
    /// (ephemeral error embeds); only unexpected failures propagate as
    /// errors to the dispatch boundary.
    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait must stay object-safe for the registry.
    fn _assert_object_safe(_: &dyn SlashCommandHandler) {}
}
