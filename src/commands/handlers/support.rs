//! Support ticket command handlers
//!
//! Handles: ticket, close. The `create_ticket` panel button drives the
//! same open flow via [`handle_ticket_button`].
//!
//! The store decisions (uniqueness, owner-or-staff, reconciliation) live
//! in the ticket workflow; this module owns the platform surface: channel
//! creation with overwrites, the intro message, the transcript delivery
//! and the delayed deletion.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use serenity::builder::CreateEmbed;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::{
    AttachmentType, ChannelType, PermissionOverwrite, PermissionOverwriteType,
};
use serenity::model::id::{ChannelId, GuildId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use serenity::model::user::User;
use serenity::model::Timestamp;
use serenity::prelude::Context;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use crate::commands::context::{
    mirror_to_channel, respond_embed, respond_rejection, CommandContext,
};
use crate::commands::handler::SlashCommandHandler;
use crate::commands::handlers::moderation::user_tag;
use crate::commands::slash::get_string_option;
use crate::core::{error_embed, info_embed, success_embed, Rejection, COLOR_PRIMARY};
use crate::features::tickets::{
    render_transcript, CreateGuard, TranscriptEntry, TranscriptHeader, CLOSE_DELETE_DELAY_SECS,
};

/// Handler for the ticket lifecycle commands
pub struct SupportHandler;

#[async_trait]
impl SlashCommandHandler for SupportHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["ticket", "close"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "ticket" => self.handle_ticket(&ctx, serenity_ctx, command).await,
            "close" => self.handle_close(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl SupportHandler {
    async fn handle_ticket(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return respond_rejection(serenity_ctx, command, &Rejection::GuildOnly).await;
        };
        let reason = get_string_option(&command.data.options, "reason");

        match open_ticket(ctx, serenity_ctx, guild_id, &command.user, reason.as_deref()).await? {
            Ok(channel_id) => {
                respond_embed(
                    serenity_ctx,
                    command,
                    success_embed(
                        "Ticket Created",
                        &format!("Your ticket has been created: <#{channel_id}>"),
                    ),
                    true,
                )
                .await
            }
            Err(rejection) => respond_rejection(serenity_ctx, command, &rejection).await,
        }
    }

    async fn handle_close(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return respond_rejection(serenity_ctx, command, &Rejection::GuildOnly).await;
        };
        let reason = get_string_option(&command.data.options, "reason")
            .unwrap_or_else(|| "No reason provided".to_string());

        let actor_id = command.user.id.to_string();
        let actor_is_staff = ctx.config.is_owner(&actor_id)
            || command
                .member
                .as_ref()
                .and_then(|member| member.permissions)
                .map(|perms| {
                    perms.contains(Permissions::MANAGE_CHANNELS)
                        || perms.contains(Permissions::ADMINISTRATOR)
                })
                .unwrap_or(false);

        let ticket = match ctx
            .tickets
            .close(&command.channel_id.to_string(), &actor_id, actor_is_staff, &reason)
            .await?
        {
            Ok(ticket) => ticket,
            Err(rejection) => {
                return respond_rejection(serenity_ctx, command, &rejection).await
            }
        };

        // Store row is committed; everything past here is advisory. The
        // delayed deletion is always scheduled, whatever fails in between.
        let transcript = transcript_or_fallback(
            build_transcript(
                serenity_ctx,
                command.channel_id,
                &command.user,
                &ticket.channel_id,
                &reason,
            )
            .await,
        );

        let notice = respond_embed(
            serenity_ctx,
            command,
            success_embed(
                "Ticket Closed",
                &format!(
                    "Closed by {}.\n**Reason:** {reason}\nThis channel will be deleted in {CLOSE_DELETE_DELAY_SECS} seconds.",
                    user_tag(&command.user)
                ),
            ),
            false,
        )
        .await;
        if let Err(e) = notice {
            warn!("Could not post closing notice in {}: {e}", command.channel_id);
        }

        deliver_transcript(ctx, serenity_ctx, &guild_id.to_string(), &ticket.user_id, &transcript)
            .await;

        let http = Arc::clone(&serenity_ctx.http);
        let channel_id = command.channel_id;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(CLOSE_DELETE_DELAY_SECS)).await;
            if let Err(e) = channel_id.delete(&http).await {
                warn!("Could not delete ticket channel {channel_id}: {e}");
            }
        });

        info!("Ticket {} closed in guild {guild_id}", ticket.id);
        Ok(())
    }
}

/// Full create flow shared by `/ticket` and the panel button: workflow
/// guard (with stale-surface reconciliation), channel creation with
/// overwrites, the open-row insert, intro message and log mirror.
pub async fn open_ticket(
    ctx: &CommandContext,
    serenity_ctx: &Context,
    guild_id: GuildId,
    user: &User,
    reason: Option<&str>,
) -> Result<Result<ChannelId, Rejection>> {
    let guild_key = guild_id.to_string();

    let guard = ctx
        .tickets
        .guard_create(&guild_key, &user.id.to_string(), |channel_id| {
            channel_id
                .parse::<u64>()
                .map(|id| serenity_ctx.cache.channel(ChannelId(id)).is_some())
                .unwrap_or(false)
        })
        .await?;
    if let CreateGuard::Blocked(rejection) = guard {
        return Ok(Err(rejection));
    }

    let settings = ctx.database.get_guild_settings(&guild_key).await?.unwrap_or_default();
    let category_id = ensure_ticket_category(ctx, serenity_ctx, guild_id, settings.ticket_category.as_deref()).await?;

    let bot_id = serenity_ctx.cache.current_user_id();
    let member_allow =
        Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY;
    let mut overwrites = vec![
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            // @everyone shares the guild's id
            kind: PermissionOverwriteType::Role(RoleId(guild_id.0)),
        },
        PermissionOverwrite {
            allow: member_allow,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(user.id),
        },
        PermissionOverwrite {
            allow: member_allow | Permissions::MANAGE_CHANNELS,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(bot_id),
        },
    ];
    let support_role = settings
        .ticket_support_role
        .as_deref()
        .and_then(|id| id.parse::<u64>().ok());
    if let Some(role_id) = support_role {
        overwrites.push(PermissionOverwrite {
            allow: member_allow,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(RoleId(role_id)),
        });
    }

    let channel = guild_id
        .create_channel(&serenity_ctx.http, |channel| {
            channel
                .name(ticket_channel_name(&user.name))
                .kind(ChannelType::Text)
                .category(category_id)
                .topic(format!("Support ticket for {} ({})", user_tag(user), user.id))
                .permissions(overwrites)
        })
        .await?;

    match ctx
        .tickets
        .open(&guild_key, &channel.id.to_string(), &user.id.to_string(), reason)
        .await?
    {
        Ok(_) => {}
        Err(rejection) => {
            // Lost the create race after the surface went up; tear it down.
            if let Err(e) = channel.id.delete(&serenity_ctx.http).await {
                warn!("Could not delete surplus ticket channel {}: {e}", channel.id);
            }
            return Ok(Err(rejection));
        }
    }

    let intro_text = settings.ticket_message.unwrap_or_else(|| {
        "Support will be with you shortly. Describe your issue in as much detail as you can."
            .to_string()
    });
    let mut content = format!("<@{}>", user.id);
    if let Some(role_id) = support_role {
        content.push_str(&format!(" <@&{role_id}>"));
    }

    let intro = channel
        .id
        .send_message(&serenity_ctx.http, |message| {
            message.content(&content).embed(|embed| {
                embed
                    .color(COLOR_PRIMARY)
                    .title("Support Ticket")
                    .description(&intro_text)
                    .timestamp(Timestamp::now());
                if let Some(reason) = reason {
                    embed.field("Reason", reason, false);
                }
                embed.field("Closing", "Use /close when your issue is resolved.", false)
            })
        })
        .await;
    if let Err(e) = intro {
        warn!("Could not post ticket intro in {}: {e}", channel.id);
    }

    if let Some(log_channel) = settings.ticket_log_channel {
        mirror_to_channel(
            serenity_ctx,
            &log_channel,
            info_embed(
                "Ticket Opened",
                &format!(
                    "**User:** {} ({})\n**Channel:** <#{}>\n**Reason:** {}",
                    user_tag(user),
                    user.id,
                    channel.id,
                    reason.unwrap_or("none given")
                ),
            ),
        )
        .await;
    }

    info!("Ticket channel {} opened for user {} in guild {guild_id}", channel.id, user.id);
    Ok(Ok(channel.id))
}

/// Resolve the configured ticket category, creating a "Support Tickets"
/// category (and persisting it) when unset or stale.
async fn ensure_ticket_category(
    ctx: &CommandContext,
    serenity_ctx: &Context,
    guild_id: GuildId,
    configured: Option<&str>,
) -> Result<ChannelId> {
    if let Some(id) = configured.and_then(|raw| raw.parse::<u64>().ok()) {
        if serenity_ctx.cache.channel(ChannelId(id)).is_some() {
            return Ok(ChannelId(id));
        }
        warn!("Configured ticket category {id} no longer exists in guild {guild_id}");
    }

    let category = guild_id
        .create_channel(&serenity_ctx.http, |channel| {
            channel.name("Support Tickets").kind(ChannelType::Category)
        })
        .await?;
    ctx.database
        .update_settings(
            &guild_id.to_string(),
            &[("ticket_category", Some(category.id.to_string()))],
        )
        .await?;
    Ok(category.id)
}

/// Channel-name slug from the requester's username.
fn ticket_channel_name(username: &str) -> String {
    let slug: String = username
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "ticket".to_string()
    } else {
        format!("ticket-{}", &slug[..slug.len().min(80)])
    }
}

/// Placeholder delivered when the history fetch fails after the close
/// has already committed.
const TRANSCRIPT_FALLBACK: &str = "Error creating transcript.";

fn transcript_or_fallback(result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        warn!("Could not build transcript: {e}");
        TRANSCRIPT_FALLBACK.to_string()
    })
}

/// Fetch the surface history and render the plain-text transcript.
async fn build_transcript(
    serenity_ctx: &Context,
    channel_id: ChannelId,
    closer: &User,
    channel_key: &str,
    reason: &str,
) -> Result<String> {
    let messages = channel_id
        .messages(&serenity_ctx.http, |builder| builder.limit(100))
        .await?;

    let mut entries: Vec<TranscriptEntry> = messages
        .iter()
        .map(|message| TranscriptEntry {
            timestamp: message.timestamp.unix_timestamp(),
            author_tag: user_tag(&message.author),
            author_id: message.author.id.0,
            content: message.content.clone(),
            attachments: message
                .attachments
                .iter()
                .map(|attachment| (attachment.filename.clone(), attachment.url.clone()))
                .collect(),
            has_embeds: !message.embeds.is_empty(),
        })
        .collect();

    let channel_name = serenity_ctx
        .cache
        .guild_channel(channel_id)
        .map(|channel| channel.name)
        .unwrap_or_else(|| channel_key.to_string());

    let header = TranscriptHeader {
        channel_name,
        closed_by_tag: user_tag(closer),
        closed_by_id: closer.id.0,
        closed_at: Utc::now().timestamp(),
        reason: reason.to_string(),
    };
    Ok(render_transcript(&header, &mut entries))
}

/// Advisory transcript delivery: DM to the requester and a copy to the
/// configured ticket-log channel. Failures are logged, never fatal.
async fn deliver_transcript(
    ctx: &CommandContext,
    serenity_ctx: &Context,
    guild_id: &str,
    requester_id: &str,
    transcript: &str,
) {
    let attachment = |filename: String| AttachmentType::Bytes {
        data: Cow::from(transcript.as_bytes().to_vec()),
        filename,
    };

    if let Ok(user_id) = requester_id.parse::<u64>() {
        match UserId(user_id).to_user(&serenity_ctx.http).await {
            Ok(user) => {
                let delivered = user
                    .direct_message(&serenity_ctx.http, |message| {
                        message
                            .content("Your support ticket was closed. The transcript is attached.")
                            .add_file(attachment("transcript.txt".to_string()))
                    })
                    .await;
                if let Err(e) = delivered {
                    warn!("Could not DM transcript to user {requester_id}: {e}");
                }
            }
            Err(e) => warn!("Could not fetch ticket requester {requester_id}: {e}"),
        }
    }

    let log_channel = match ctx.database.get_guild_settings(guild_id).await {
        Ok(Some(settings)) => settings.ticket_log_channel,
        Ok(None) => None,
        Err(e) => {
            warn!("Could not load settings for guild {guild_id}: {e}");
            None
        }
    };
    if let Some(channel) = log_channel.and_then(|raw| raw.parse::<u64>().ok()) {
        let mirrored = ChannelId(channel)
            .send_message(&serenity_ctx.http, |message| {
                message
                    .set_embed(info_embed(
                        "Ticket Closed",
                        &format!("Requester: <@{requester_id}>"),
                    ))
                    .add_file(attachment("transcript.txt".to_string()))
            })
            .await;
        if let Err(e) = mirrored {
            warn!("Could not mirror transcript to channel {channel}: {e}");
        }
    }
}

/// Entry point for the `create_ticket` panel button.
pub async fn handle_ticket_button(
    ctx: &CommandContext,
    serenity_ctx: &Context,
    component: &MessageComponentInteraction,
) -> Result<()> {
    let embed = match component.guild_id {
        None => error_embed(Rejection::GuildOnly.title(), &Rejection::GuildOnly.message()),
        Some(guild_id) => {
            match open_ticket(ctx, serenity_ctx, guild_id, &component.user, None).await? {
                Ok(channel_id) => success_embed(
                    "Ticket Created",
                    &format!("Your ticket has been created: <#{channel_id}>"),
                ),
                Err(rejection) => error_embed(rejection.title(), &rejection.message()),
            }
        }
    };

    respond_component(serenity_ctx, component, embed).await
}

/// Ephemeral embed response to a component interaction.
pub async fn respond_component(
    serenity_ctx: &Context,
    component: &MessageComponentInteraction,
    embed: CreateEmbed,
) -> Result<()> {
    component
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.add_embed(embed).ephemeral(true))
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_handler_commands() {
        let handler = SupportHandler;
        let names = handler.command_names();
        assert!(names.contains(&"ticket"));
        assert!(names.contains(&"close"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_transcript_fallback_keeps_close_alive() {
        assert_eq!(
            transcript_or_fallback(Ok("content".to_string())),
            "content"
        );
        assert_eq!(
            transcript_or_fallback(Err(anyhow::anyhow!("history fetch failed"))),
            TRANSCRIPT_FALLBACK
        );
    }

    #[test]
    fn test_ticket_channel_name_slug() {
        assert_eq!(ticket_channel_name("Alice"), "ticket-alice");
        assert_eq!(ticket_channel_name("spaced name!"), "ticket-spaced-name");
        assert_eq!(ticket_channel_name("---"), "ticket");

        let long = "a".repeat(200);
        assert!(ticket_channel_name(&long).len() <= 87);
    }
}
