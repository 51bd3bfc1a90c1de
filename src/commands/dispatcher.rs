//! Interaction dispatch: rate limiting, permission gate, error boundary.

use anyhow::Result;
use log::{error, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::permissions::Permissions;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::{error_embed, warning_embed, Rejection};
use crate::features::RateLimiter;

use super::context::{respond_embed, respond_rejection, CommandContext};
use super::registry::{command_meta, CommandRegistry};

/// Routes each slash command through the gate sequence: known command,
/// rate limit, actor permission, then the handler itself behind a
/// catch-all error boundary. Raw errors never reach the platform.
pub struct CommandDispatcher {
    registry: CommandRegistry,
    rate_limiter: RateLimiter,
    context: Arc<CommandContext>,
}

impl CommandDispatcher {
    pub fn new(
        registry: CommandRegistry,
        rate_limiter: RateLimiter,
        context: Arc<CommandContext>,
    ) -> Self {
        Self {
            registry,
            rate_limiter,
            context,
        }
    }

    /// Whether a handler is registered under this name.
    pub fn knows_command(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub async fn dispatch(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let name = command.data.name.clone();
        let user_id = command.user.id.to_string();
        info!("[{request_id}] /{name} from user {user_id}");

        let Some(handler) = self.registry.get(&name) else {
            warn!("[{request_id}] No handler registered for /{name}");
            return respond_embed(
                serenity_ctx,
                command,
                error_embed("Unavailable", "This command is currently unavailable."),
                true,
            )
            .await;
        };

        if !self.rate_limiter.try_acquire(&user_id) {
            info!("[{request_id}] Rate limited user {user_id}");
            return respond_embed(
                serenity_ctx,
                command,
                warning_embed(
                    "Slow Down",
                    "You are using commands too quickly. Please wait a moment and try again.",
                ),
                true,
            )
            .await;
        }

        if let Some(rejection) = self.check_permission(&name, command) {
            info!("[{request_id}] Permission denied for user {user_id} on /{name}");
            return respond_rejection(serenity_ctx, command, &rejection).await;
        }

        if let Err(e) = handler
            .handle(Arc::clone(&self.context), serenity_ctx, command)
            .await
        {
            error!("[{request_id}] Error handling /{name}: {e:#}");
            self.send_generic_error(serenity_ctx, command).await;
        }
        Ok(())
    }

    /// Actor-side permission gate from the static command table, with the
    /// owner bypass. Bot-side and hierarchy checks stay in the handlers
    /// where the live guild is available.
    fn check_permission(
        &self,
        name: &str,
        command: &ApplicationCommandInteraction,
    ) -> Option<Rejection> {
        let (required, label) = command_meta(name)?.required_permission?;

        if command.guild_id.is_none() {
            return Some(Rejection::GuildOnly);
        }
        if self.context.config.is_owner(&command.user.id.to_string()) {
            return None;
        }

        let actor = command
            .member
            .as_ref()
            .and_then(|member| member.permissions)
            .unwrap_or(Permissions::empty());
        if actor.contains(required) || actor.contains(Permissions::ADMINISTRATOR) {
            None
        } else {
            Some(Rejection::MissingPermission(label))
        }
    }

    /// Last-resort user notice once the handler has failed. Tries to edit
    /// a deferred response first, then falls back to a fresh one.
    async fn send_generic_error(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) {
        let message = "Something went wrong while processing your command. Please try again.";

        let edited = command
            .edit_original_interaction_response(&serenity_ctx.http, |response| {
                response.content(message)
            })
            .await;
        if edited.is_err() {
            let _ = respond_embed(
                serenity_ctx,
                command,
                error_embed("Error", message),
                true,
            )
            .await;
        }
    }
}
