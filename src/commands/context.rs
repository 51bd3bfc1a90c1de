//! Shared context and response helpers for command handlers.

use crate::core::{error_embed, Config, Rejection};
use crate::database::Database;
use crate::features::{ModerationWorkflow, TicketWorkflow, WelcomeWorkflow};
use anyhow::Result;
use log::warn;
use serenity::builder::CreateEmbed;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::guild::{Guild, Member};
use serenity::model::id::{ChannelId, RoleId};
use serenity::model::permissions::Permissions;
use serenity::model::user::User;
use serenity::prelude::Context;

/// Shared context for all command handlers
///
/// Carries the persistence layer, the three workflow services, the static
/// configuration and the process start time for uptime reporting.
#[derive(Clone)]
pub struct CommandContext {
    pub database: Database,
    pub moderation: ModerationWorkflow,
    pub tickets: TicketWorkflow,
    pub welcome: WelcomeWorkflow,
    pub config: Config,
    pub start_time: std::time::Instant,
}

impl CommandContext {
    pub fn new(
        database: Database,
        moderation: ModerationWorkflow,
        tickets: TicketWorkflow,
        welcome: WelcomeWorkflow,
        config: Config,
    ) -> Self {
        Self {
            database,
            moderation,
            tickets,
            welcome,
            config,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Send an embed as the initial interaction response.
pub async fn respond_embed(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    embed: CreateEmbed,
    ephemeral: bool,
) -> Result<()> {
    command
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| {
                    message.add_embed(embed).ephemeral(ephemeral)
                })
        })
        .await?;
    Ok(())
}

/// Render a typed rejection as an ephemeral error embed.
pub async fn respond_rejection(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    rejection: &Rejection,
) -> Result<()> {
    respond_embed(
        serenity_ctx,
        command,
        error_embed(rejection.title(), &rejection.message()),
        true,
    )
    .await
}

/// Best-effort direct message. Returns whether delivery succeeded; failure
/// is logged and never propagated (closed DMs are routine).
pub async fn dm_user_advisory(serenity_ctx: &Context, user: &User, embed: CreateEmbed) -> bool {
    match user
        .direct_message(&serenity_ctx.http, |m| m.set_embed(embed))
        .await
    {
        Ok(_) => true,
        Err(e) => {
            warn!("Could not DM user {}: {e}", user.id);
            false
        }
    }
}

/// Best-effort mirror of an embed to a configured channel (stored as a
/// text snowflake). Returns whether the post went through.
pub async fn mirror_to_channel(
    serenity_ctx: &Context,
    channel_id: &str,
    embed: CreateEmbed,
) -> bool {
    let Ok(id) = channel_id.parse::<u64>() else {
        warn!("Configured channel id {channel_id} is not numeric");
        return false;
    };

    match ChannelId(id)
        .send_message(&serenity_ctx.http, |m| m.set_embed(embed))
        .await
    {
        Ok(_) => true,
        Err(e) => {
            warn!("Could not mirror to channel {channel_id}: {e}");
            false
        }
    }
}

/// Effective guild permissions for a member, computed from its roles.
/// The guild owner and administrators hold everything.
pub fn guild_member_permissions(guild: &Guild, member: &Member) -> Permissions {
    if guild.owner_id == member.user.id {
        return Permissions::all();
    }

    // The @everyone role shares the guild's id.
    let mut permissions = guild
        .roles
        .get(&RoleId(guild.id.0))
        .map(|role| role.permissions)
        .unwrap_or_default();
    for role_id in &member.roles {
        if let Some(role) = guild.roles.get(role_id) {
            permissions |= role.permissions;
        }
    }

    if permissions.contains(Permissions::ADMINISTRATOR) {
        Permissions::all()
    } else {
        permissions
    }
}

/// Highest role position held by a member; 0 when only @everyone.
pub fn top_role_position(guild: &Guild, member: &Member) -> i64 {
    member
        .roles
        .iter()
        .filter_map(|id| guild.roles.get(id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_context_clone() {
        // CommandContext is shared across handlers via Arc + Clone.
        fn assert_clone<T: Clone>() {}
        assert_clone::<CommandContext>();
    }
}
