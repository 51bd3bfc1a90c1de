//! Admin command handlers
//!
//! Handles: autorole, welcome, logs, setup, embed
//!
//! All of these mutate guild settings through the whitelisted settings
//! accessor; the view subcommands read the same rows back so configured
//! text round-trips unchanged.

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serenity::builder::CreateEmbed;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption,
};
use serenity::model::channel::AttachmentType;
use serenity::model::id::{ChannelId, RoleId};
use serenity::model::user::User;
use serenity::model::Timestamp;
use serenity::prelude::Context;
use std::borrow::Cow;
use std::sync::Arc;

use crate::commands::context::{respond_embed, respond_rejection, CommandContext};
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{
    get_bool_option, get_channel_option, get_role_option, get_string_option,
};
use crate::core::{error_embed, info_embed, success_embed, Rejection, COLOR_PRIMARY};
use crate::features::welcome::{card_filename, fetch_welcome_card, render_welcome, DEFAULT_WELCOME_MESSAGE};

/// Handler for admin configuration commands
pub struct AdminHandler;

#[async_trait]
impl SlashCommandHandler for AdminHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["autorole", "welcome", "logs", "setup", "embed"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "autorole" => self.handle_autorole(&ctx, serenity_ctx, command).await,
            "welcome" => self.handle_welcome(&ctx, serenity_ctx, command).await,
            "logs" => self.handle_logs(&ctx, serenity_ctx, command).await,
            "setup" => self.handle_setup(&ctx, serenity_ctx, command).await,
            "embed" => self.handle_embed(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

/// First-level subcommand name and its nested options.
fn subcommand(command: &ApplicationCommandInteraction) -> Option<(&str, &[CommandDataOption])> {
    command
        .data
        .options
        .first()
        .map(|opt| (opt.name.as_str(), opt.options.as_slice()))
}

impl AdminHandler {
    async fn handle_autorole(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return respond_rejection(serenity_ctx, command, &Rejection::GuildOnly).await;
        };
        let guild_key = guild_id.to_string();
        let Some((sub, options)) = subcommand(command) else {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::MissingOption("a subcommand"),
            )
            .await;
        };

        match sub {
            "add" => {
                let Some(role_id) = get_role_option(options, "role") else {
                    return respond_rejection(
                        serenity_ctx,
                        command,
                        &Rejection::MissingOption("a role"),
                    )
                    .await;
                };
                if role_id == guild_id.0 {
                    return respond_embed(
                        serenity_ctx,
                        command,
                        error_embed("Invalid Role", "The @everyone role cannot be an auto-role."),
                        true,
                    )
                    .await;
                }
                if let Some(role) = serenity_ctx.cache.role(guild_id, RoleId(role_id)) {
                    if role.managed {
                        return respond_embed(
                            serenity_ctx,
                            command,
                            error_embed(
                                "Invalid Role",
                                "That role is managed by an integration and cannot be assigned.",
                            ),
                            true,
                        )
                        .await;
                    }
                }

                let added = ctx.database.add_auto_role(&guild_key, &role_id.to_string()).await?;
                let embed = if added {
                    success_embed("Auto-Role Added", &format!("<@&{role_id}> will be granted to new members."))
                } else {
                    info_embed("Already Configured", &format!("<@&{role_id}> is already an auto-role."))
                };
                respond_embed(serenity_ctx, command, embed, true).await
            }
            "remove" => {
                let Some(role_id) = get_role_option(options, "role") else {
                    return respond_rejection(
                        serenity_ctx,
                        command,
                        &Rejection::MissingOption("a role"),
                    )
                    .await;
                };
                let removed = ctx
                    .database
                    .remove_auto_role(&guild_key, &role_id.to_string())
                    .await?;
                let embed = if removed {
                    success_embed("Auto-Role Removed", &format!("<@&{role_id}> will no longer be granted."))
                } else {
                    info_embed("Not Configured", &format!("<@&{role_id}> is not an auto-role."))
                };
                respond_embed(serenity_ctx, command, embed, true).await
            }
            "list" => {
                let roles = ctx.database.get_auto_roles(&guild_key).await?;
                let description = if roles.is_empty() {
                    "No auto-roles configured.".to_string()
                } else {
                    roles
                        .iter()
                        .map(|id| format!("<@&{id}>"))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                respond_embed(
                    serenity_ctx,
                    command,
                    info_embed("Auto-Roles", &description),
                    true,
                )
                .await
            }
            _ => Ok(()),
        }
    }

    async fn handle_welcome(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return respond_rejection(serenity_ctx, command, &Rejection::GuildOnly).await;
        };
        let guild_key = guild_id.to_string();
        let Some((sub, options)) = subcommand(command) else {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::MissingOption("a subcommand"),
            )
            .await;
        };

        match sub {
            "set" => {
                let Some(channel_id) = get_channel_option(options, "channel") else {
                    return respond_rejection(
                        serenity_ctx,
                        command,
                        &Rejection::MissingOption("a channel"),
                    )
                    .await;
                };
                let message = get_string_option(options, "message")
                    .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string());

                ctx.database
                    .update_settings(
                        &guild_key,
                        &[
                            ("welcome_channel", Some(channel_id.to_string())),
                            ("welcome_message", Some(message.clone())),
                        ],
                    )
                    .await?;
                respond_embed(
                    serenity_ctx,
                    command,
                    success_embed(
                        "Welcome Configured",
                        &format!("New members will be welcomed in <#{channel_id}>.\n**Message:** {message}"),
                    ),
                    true,
                )
                .await
            }
            "background" => {
                let Some(url) = get_string_option(options, "url") else {
                    return respond_rejection(
                        serenity_ctx,
                        command,
                        &Rejection::MissingOption("an image URL"),
                    )
                    .await;
                };
                ctx.database
                    .update_settings(&guild_key, &[("background_url", Some(url.clone()))])
                    .await?;
                respond_embed(
                    serenity_ctx,
                    command,
                    success_embed("Background Set", &format!("Welcome card background set to {url}")),
                    true,
                )
                .await
            }
            "toggle_image" => {
                let enabled = get_bool_option(options, "enabled").unwrap_or(false);
                ctx.database.set_welcome_image_enabled(&guild_key, enabled).await?;
                let state = if enabled { "enabled" } else { "disabled" };
                respond_embed(
                    serenity_ctx,
                    command,
                    success_embed("Welcome Image", &format!("The welcome card image is now {state}.")),
                    true,
                )
                .await
            }
            "disable" => {
                ctx.database
                    .update_settings(&guild_key, &[("welcome_channel", None)])
                    .await?;
                respond_embed(
                    serenity_ctx,
                    command,
                    success_embed("Welcome Disabled", "Welcome messages are now disabled."),
                    true,
                )
                .await
            }
            "test" => {
                let outcome = post_welcome(ctx, serenity_ctx, &guild_key, &command.user).await?;
                respond_embed(serenity_ctx, command, outcome.test_reply(), true).await
            }
            "view" => {
                let settings = ctx.database.get_guild_settings(&guild_key).await?.unwrap_or_default();
                let channel = settings
                    .welcome_channel
                    .map(|id| format!("<#{id}>"))
                    .unwrap_or_else(|| "not set".to_string());
                let message = settings
                    .welcome_message
                    .unwrap_or_else(|| "not set".to_string());
                let background = settings
                    .background_url
                    .unwrap_or_else(|| "not set".to_string());
                let image = if settings.welcome_image_enabled { "enabled" } else { "disabled" };

                respond_embed(
                    serenity_ctx,
                    command,
                    info_embed(
                        "Welcome Configuration",
                        &format!(
                            "**Channel:** {channel}\n**Message:** {message}\n**Card image:** {image}\n**Background:** {background}"
                        ),
                    ),
                    true,
                )
                .await
            }
            _ => Ok(()),
        }
    }

    async fn handle_logs(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return respond_rejection(serenity_ctx, command, &Rejection::GuildOnly).await;
        };
        let guild_key = guild_id.to_string();
        let Some((sub, options)) = subcommand(command) else {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::MissingOption("a subcommand"),
            )
            .await;
        };

        let column = match sub {
            "mod_log" => Some(("mod_log_channel", "Moderation actions")),
            "member_log" => Some(("member_log_channel", "Member joins and leaves")),
            "message_log" => Some(("message_log_channel", "Message events")),
            _ => None,
        };

        if let Some((column, what)) = column {
            let Some(channel_id) = get_channel_option(options, "channel") else {
                return respond_rejection(
                    serenity_ctx,
                    command,
                    &Rejection::MissingOption("a channel"),
                )
                .await;
            };
            ctx.database
                .update_settings(&guild_key, &[(column, Some(channel_id.to_string()))])
                .await?;
            return respond_embed(
                serenity_ctx,
                command,
                success_embed("Log Channel Set", &format!("{what} will be logged in <#{channel_id}>.")),
                true,
            )
            .await;
        }

        match sub {
            "disable" => {
                ctx.database
                    .update_settings(
                        &guild_key,
                        &[
                            ("mod_log_channel", None),
                            ("member_log_channel", None),
                            ("message_log_channel", None),
                        ],
                    )
                    .await?;
                respond_embed(
                    serenity_ctx,
                    command,
                    success_embed("Logging Disabled", "All logging channels have been cleared."),
                    true,
                )
                .await
            }
            "view" => {
                let settings = ctx.database.get_guild_settings(&guild_key).await?.unwrap_or_default();
                let format_channel = |value: Option<String>| {
                    value
                        .map(|id| format!("<#{id}>"))
                        .unwrap_or_else(|| "not set".to_string())
                };
                respond_embed(
                    serenity_ctx,
                    command,
                    info_embed(
                        "Logging Configuration",
                        &format!(
                            "**Moderation log:** {}\n**Member log:** {}\n**Message log:** {}",
                            format_channel(settings.mod_log_channel),
                            format_channel(settings.member_log_channel),
                            format_channel(settings.message_log_channel),
                        ),
                    ),
                    true,
                )
                .await
            }
            _ => Ok(()),
        }
    }

    async fn handle_setup(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return respond_rejection(serenity_ctx, command, &Rejection::GuildOnly).await;
        };
        let guild_key = guild_id.to_string();
        let Some(("ticket", options)) = subcommand(command) else {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::MissingOption("a subcommand"),
            )
            .await;
        };

        let mut assignments: Vec<(&str, Option<String>)> = Vec::new();
        if let Some(role_id) = get_role_option(options, "support_role") {
            assignments.push(("ticket_support_role", Some(role_id.to_string())));
        }
        if let Some(category_id) = get_channel_option(options, "category") {
            assignments.push(("ticket_category", Some(category_id.to_string())));
        }
        if let Some(channel_id) = get_channel_option(options, "log_channel") {
            assignments.push(("ticket_log_channel", Some(channel_id.to_string())));
        }
        let panel_text = get_string_option(options, "message");
        if let Some(text) = &panel_text {
            assignments.push(("ticket_message", Some(text.clone())));
        }
        if !assignments.is_empty() {
            ctx.database.update_settings(&guild_key, &assignments).await?;
        }

        let description = panel_text.unwrap_or_else(|| {
            "Need help? Click the button below to open a private support ticket.".to_string()
        });

        // Panel goes into the invoking channel with the create button.
        command
            .channel_id
            .send_message(&serenity_ctx.http, |message| {
                message
                    .embed(|embed| {
                        embed
                            .color(COLOR_PRIMARY)
                            .title("Support Tickets")
                            .description(&description)
                            .timestamp(Timestamp::now())
                    })
                    .components(|components| {
                        components.create_action_row(|row| {
                            row.create_button(|button| {
                                button
                                    .custom_id("create_ticket")
                                    .label("Create Ticket")
                                    .style(ButtonStyle::Primary)
                                    .emoji('🎫')
                            })
                        })
                    })
            })
            .await?;

        respond_embed(
            serenity_ctx,
            command,
            success_embed("Ticket System Ready", "The ticket panel has been posted."),
            true,
        )
        .await
    }

    async fn handle_embed(
        &self,
        _ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let options = &command.data.options;
        let Some(title) = get_string_option(options, "title") else {
            return respond_rejection(serenity_ctx, command, &Rejection::MissingOption("a title"))
                .await;
        };
        let Some(description) = get_string_option(options, "description") else {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::MissingOption("a description"),
            )
            .await;
        };

        let color = get_string_option(options, "color")
            .and_then(|raw| u32::from_str_radix(raw.trim_start_matches('#'), 16).ok())
            .unwrap_or(COLOR_PRIMARY);
        let target = get_channel_option(options, "channel")
            .map(ChannelId)
            .unwrap_or(command.channel_id);

        let mut embed = CreateEmbed::default();
        embed.color(color);
        embed.title(&title);
        embed.description(&description);
        embed.timestamp(Timestamp::now());
        if let Some(footer) = get_string_option(options, "footer") {
            embed.footer(|f| f.text(footer));
        }
        if let Some(image) = get_string_option(options, "image") {
            embed.image(image);
        }

        if target
            .send_message(&serenity_ctx.http, |message| message.set_embed(embed))
            .await
            .is_err()
        {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::ChannelPermission("Send Messages and Embed Links"),
            )
            .await;
        }

        respond_embed(
            serenity_ctx,
            command,
            success_embed("Embed Posted", &format!("Your embed was posted in <#{target}>.")),
            true,
        )
        .await
    }
}

/// Outcome of a welcome post attempt. The join event only logs, but
/// `/welcome test` reports each case differently to the operator.
#[derive(Debug, PartialEq, Eq)]
pub enum WelcomePost {
    Posted,
    NotConfigured,
    SendFailed,
}

impl WelcomePost {
    /// User-facing reply for `/welcome test`.
    fn test_reply(&self) -> CreateEmbed {
        match self {
            WelcomePost::Posted => success_embed(
                "Test Sent",
                "A test welcome was posted to the configured channel.",
            ),
            WelcomePost::NotConfigured => {
                let rejection = Rejection::NotConfigured(
                    "No welcome channel is configured. Use /welcome set first.",
                );
                error_embed(rejection.title(), &rejection.message())
            }
            WelcomePost::SendFailed => error_embed(
                "Test Failed",
                "The welcome channel is configured but the message could not be sent. Check my permissions in that channel.",
            ),
        }
    }
}

/// Post the configured welcome message (and card, when enabled) for a user.
/// Shared between `/welcome test` and the member-join event.
pub async fn post_welcome(
    ctx: &CommandContext,
    serenity_ctx: &Context,
    guild_id: &str,
    user: &User,
) -> Result<WelcomePost> {
    let Some(settings) = ctx.database.get_guild_settings(guild_id).await? else {
        return Ok(WelcomePost::NotConfigured);
    };
    let Some(channel) = settings.welcome_channel else {
        return Ok(WelcomePost::NotConfigured);
    };
    let Ok(channel_id) = channel.parse::<u64>() else {
        warn!("Welcome channel {channel} for guild {guild_id} is not numeric");
        return Ok(WelcomePost::NotConfigured);
    };

    let template = settings
        .welcome_message
        .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string());
    let content = render_welcome(&template, user.id.0);

    // Card fetch failure falls back to a text-only welcome.
    let mut card: Option<(Vec<u8>, &'static str)> = None;
    if settings.welcome_image_enabled {
        if let Some(url) = &settings.background_url {
            match fetch_welcome_card(url).await {
                Ok(bytes) => card = Some((bytes, card_filename(url))),
                Err(e) => warn!("Welcome card fetch failed for guild {guild_id}: {e}"),
            }
        }
    }

    let result = ChannelId(channel_id)
        .send_message(&serenity_ctx.http, |message| {
            message.content(&content);
            if let Some((bytes, filename)) = card {
                message.add_file(AttachmentType::Bytes {
                    data: Cow::from(bytes),
                    filename: filename.to_string(),
                });
            }
            message
        })
        .await;

    match result {
        Ok(_) => Ok(WelcomePost::Posted),
        Err(e) => {
            warn!("Could not post welcome in guild {guild_id}: {e}");
            Ok(WelcomePost::SendFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_handler_commands() {
        let handler = AdminHandler;
        let names = handler.command_names();

        for expected in ["autorole", "welcome", "logs", "setup", "embed"] {
            assert!(names.contains(&expected));
        }
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_welcome_test_reply_distinguishes_send_failure() {
        let failed = WelcomePost::SendFailed.test_reply();
        let unconfigured = WelcomePost::NotConfigured.test_reply();
        assert_ne!(failed.0.get("title"), unconfigured.0.get("title"));
        assert_ne!(failed.0.get("description"), unconfigured.0.get("description"));

        let posted = WelcomePost::Posted.test_reply();
        assert_eq!(
            posted.0.get("title").and_then(|v| v.as_str()),
            Some("Test Sent")
        );
    }
}
