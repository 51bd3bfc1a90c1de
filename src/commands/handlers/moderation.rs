//! Moderation command handlers
//!
//! Handles: ban, kick, mute, unmute, warn, purge, slowmode
//!
//! Precondition checks run in a fixed order (identity, bot permission,
//! hierarchy, action-specific) and every failure is a typed rejection.
//! Side effects follow the audit ordering: advisory DM, platform action,
//! audit row, success reply, advisory mirror to the mod-log channel.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use serenity::builder::CreateEmbed;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::guild::{Guild, Member};
use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;
use serenity::model::user::User;
use serenity::model::Timestamp;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::{
    dm_user_advisory, guild_member_permissions, mirror_to_channel, respond_embed,
    respond_rejection, top_role_position, CommandContext,
};
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_integer_option, get_string_option, get_user_option};
use crate::core::{success_embed, warning_embed, Rejection};
use crate::features::moderation::{
    check_hierarchy, check_target_identity, parse_duration, purge_eligible, AUTO_MUTE_MS,
};

/// Handler for moderation commands
pub struct ModerationHandler;

#[async_trait]
impl SlashCommandHandler for ModerationHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["ban", "kick", "mute", "unmute", "warn", "purge", "slowmode"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "ban" => self.handle_ban(&ctx, serenity_ctx, command).await,
            "kick" => self.handle_kick(&ctx, serenity_ctx, command).await,
            "mute" => self.handle_mute(&ctx, serenity_ctx, command).await,
            "unmute" => self.handle_unmute(&ctx, serenity_ctx, command).await,
            "warn" => self.handle_warn(&ctx, serenity_ctx, command).await,
            "purge" => self.handle_purge(&ctx, serenity_ctx, command).await,
            "slowmode" => self.handle_slowmode(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

/// Live guild material every punitive command needs.
struct ActionScene {
    guild: Guild,
    guild_id: GuildId,
    bot_member: Member,
    actor_position: i64,
    bot_position: i64,
}

impl ModerationHandler {
    async fn handle_ban(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let scene = match self.load_scene(serenity_ctx, command).await? {
            Ok(scene) => scene,
            Err(rejection) => return respond_rejection(serenity_ctx, command, &rejection).await,
        };
        let Some(target) = get_user_option(&command.data.options, "user") else {
            return respond_rejection(serenity_ctx, command, &Rejection::MissingOption("a user"))
                .await;
        };
        let reason = get_string_option(&command.data.options, "reason")
            .unwrap_or_else(|| "No reason provided".to_string());
        let delete_days = get_integer_option(&command.data.options, "delete_days")
            .unwrap_or(0)
            .clamp(0, 7) as u8;

        if let Err(rejection) = self
            .check_target(serenity_ctx, command, &scene, &target, "ban", Permissions::BAN_MEMBERS, "Ban Members", false)
            .await?
        {
            return respond_rejection(serenity_ctx, command, &rejection).await;
        }

        dm_user_advisory(
            serenity_ctx,
            &target,
            warning_embed(
                "You Have Been Banned",
                &format!("Server: **{}**\nReason: {reason}", scene.guild.name),
            ),
        )
        .await;

        scene
            .guild_id
            .ban_with_reason(&serenity_ctx.http, target.id, delete_days, &reason)
            .await?;

        ctx.moderation
            .record_action(
                &scene.guild_id.to_string(),
                &target.id.to_string(),
                &command.user.id.to_string(),
                "ban",
                &reason,
                None,
            )
            .await?;

        let embed = success_embed(
            "User Banned",
            &format!("**{}** has been banned.\n**Reason:** {reason}", user_tag(&target)),
        );
        respond_embed(serenity_ctx, command, embed.clone(), false).await?;
        mirror_mod_action(ctx, serenity_ctx, &scene.guild_id.to_string(), embed).await;

        info!("User {} banned in guild {} by {}", target.id, scene.guild_id, command.user.id);
        Ok(())
    }

    async fn handle_kick(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let scene = match self.load_scene(serenity_ctx, command).await? {
            Ok(scene) => scene,
            Err(rejection) => return respond_rejection(serenity_ctx, command, &rejection).await,
        };
        let Some(target) = get_user_option(&command.data.options, "user") else {
            return respond_rejection(serenity_ctx, command, &Rejection::MissingOption("a user"))
                .await;
        };
        let reason = get_string_option(&command.data.options, "reason")
            .unwrap_or_else(|| "No reason provided".to_string());

        if let Err(rejection) = self
            .check_target(serenity_ctx, command, &scene, &target, "kick", Permissions::KICK_MEMBERS, "Kick Members", true)
            .await?
        {
            return respond_rejection(serenity_ctx, command, &rejection).await;
        }

        dm_user_advisory(
            serenity_ctx,
            &target,
            warning_embed(
                "You Have Been Kicked",
                &format!("Server: **{}**\nReason: {reason}", scene.guild.name),
            ),
        )
        .await;

        scene
            .guild_id
            .kick_with_reason(&serenity_ctx.http, target.id, &reason)
            .await?;

        ctx.moderation
            .record_action(
                &scene.guild_id.to_string(),
                &target.id.to_string(),
                &command.user.id.to_string(),
                "kick",
                &reason,
                None,
            )
            .await?;

        let embed = success_embed(
            "User Kicked",
            &format!("**{}** has been kicked.\n**Reason:** {reason}", user_tag(&target)),
        );
        respond_embed(serenity_ctx, command, embed.clone(), false).await?;
        mirror_mod_action(ctx, serenity_ctx, &scene.guild_id.to_string(), embed).await;
        Ok(())
    }

    async fn handle_mute(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let scene = match self.load_scene(serenity_ctx, command).await? {
            Ok(scene) => scene,
            Err(rejection) => return respond_rejection(serenity_ctx, command, &rejection).await,
        };
        let Some(target) = get_user_option(&command.data.options, "user") else {
            return respond_rejection(serenity_ctx, command, &Rejection::MissingOption("a user"))
                .await;
        };
        let duration_text =
            get_string_option(&command.data.options, "duration").unwrap_or_else(|| "1h".to_string());
        let reason = get_string_option(&command.data.options, "reason")
            .unwrap_or_else(|| "No reason provided".to_string());

        let mut target_member = match self
            .check_target(serenity_ctx, command, &scene, &target, "mute", Permissions::MODERATE_MEMBERS, "Moderate Members", true)
            .await?
        {
            Ok(Some(member)) => member,
            Ok(None) => {
                return respond_rejection(serenity_ctx, command, &Rejection::TargetNotInGuild)
                    .await
            }
            Err(rejection) => return respond_rejection(serenity_ctx, command, &rejection).await,
        };

        // Parse before touching anything: bad durations reject with no side
        // effects at all.
        let Some(duration_ms) = parse_duration(&duration_text) else {
            return respond_rejection(serenity_ctx, command, &Rejection::InvalidDuration).await;
        };

        if is_timed_out(&target_member) {
            return respond_rejection(serenity_ctx, command, &Rejection::AlreadyMuted).await;
        }

        dm_user_advisory(
            serenity_ctx,
            &target,
            warning_embed(
                "You Have Been Muted",
                &format!(
                    "Server: **{}**\nDuration: {duration_text}\nReason: {reason}",
                    scene.guild.name
                ),
            ),
        )
        .await;

        let until = Timestamp::from_unix_timestamp(Utc::now().timestamp() + duration_ms / 1000)?;
        target_member
            .disable_communication_until_datetime(&serenity_ctx.http, until)
            .await?;

        ctx.moderation
            .record_action(
                &scene.guild_id.to_string(),
                &target.id.to_string(),
                &command.user.id.to_string(),
                "mute",
                &reason,
                Some(duration_ms),
            )
            .await?;

        let embed = success_embed(
            "User Muted",
            &format!(
                "**{}** has been muted for {duration_text}.\n**Reason:** {reason}",
                user_tag(&target)
            ),
        );
        respond_embed(serenity_ctx, command, embed.clone(), false).await?;
        mirror_mod_action(ctx, serenity_ctx, &scene.guild_id.to_string(), embed).await;
        Ok(())
    }

    async fn handle_unmute(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let scene = match self.load_scene(serenity_ctx, command).await? {
            Ok(scene) => scene,
            Err(rejection) => return respond_rejection(serenity_ctx, command, &rejection).await,
        };
        let Some(target) = get_user_option(&command.data.options, "user") else {
            return respond_rejection(serenity_ctx, command, &Rejection::MissingOption("a user"))
                .await;
        };
        let reason = get_string_option(&command.data.options, "reason")
            .unwrap_or_else(|| "No reason provided".to_string());

        if !guild_member_permissions(&scene.guild, &scene.bot_member)
            .contains(Permissions::MODERATE_MEMBERS)
        {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::BotMissingPermission("Moderate Members"),
            )
            .await;
        }

        let mut target_member = match scene.guild_id.member(&serenity_ctx.http, target.id).await {
            Ok(member) => member,
            Err(_) => {
                return respond_rejection(serenity_ctx, command, &Rejection::TargetNotInGuild)
                    .await
            }
        };
        if !is_timed_out(&target_member) {
            return respond_rejection(serenity_ctx, command, &Rejection::NotMuted).await;
        }

        target_member.enable_communication(&serenity_ctx.http).await?;

        ctx.moderation
            .record_action(
                &scene.guild_id.to_string(),
                &target.id.to_string(),
                &command.user.id.to_string(),
                "unmute",
                &reason,
                None,
            )
            .await?;

        let embed = success_embed(
            "User Unmuted",
            &format!("**{}** has been unmuted.\n**Reason:** {reason}", user_tag(&target)),
        );
        respond_embed(serenity_ctx, command, embed.clone(), false).await?;
        mirror_mod_action(ctx, serenity_ctx, &scene.guild_id.to_string(), embed).await;
        Ok(())
    }

    async fn handle_warn(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let scene = match self.load_scene(serenity_ctx, command).await? {
            Ok(scene) => scene,
            Err(rejection) => return respond_rejection(serenity_ctx, command, &rejection).await,
        };
        let Some(target) = get_user_option(&command.data.options, "user") else {
            return respond_rejection(serenity_ctx, command, &Rejection::MissingOption("a user"))
                .await;
        };
        let Some(reason) = get_string_option(&command.data.options, "reason") else {
            return respond_rejection(serenity_ctx, command, &Rejection::MissingOption("a reason"))
                .await;
        };

        if let Err(rejection) = self
            .check_target(serenity_ctx, command, &scene, &target, "warn", Permissions::MODERATE_MEMBERS, "Moderate Members", true)
            .await?
        {
            return respond_rejection(serenity_ctx, command, &rejection).await;
        }

        let guild_key = scene.guild_id.to_string();

        dm_user_advisory(
            serenity_ctx,
            &target,
            warning_embed(
                "You Have Been Warned",
                &format!("Server: **{}**\nReason: {reason}", scene.guild.name),
            ),
        )
        .await;

        let record = ctx
            .moderation
            .record_warning(
                &guild_key,
                &target.id.to_string(),
                &command.user.id.to_string(),
                &reason,
            )
            .await?;

        let mut description = format!(
            "**{}** has been warned.\n**Reason:** {reason}\n**Active warnings:** {}",
            user_tag(&target),
            record.active_count
        );

        if record.escalate {
            match self.apply_auto_mute(ctx, serenity_ctx, &scene, &target).await {
                Ok(()) => {
                    description.push_str(
                        "\n\nWarning threshold reached: a 24 hour mute was applied automatically.",
                    );
                }
                Err(e) => {
                    warn!("Auto-mute for user {} failed: {e}", target.id);
                    description.push_str(
                        "\n\nWarning threshold reached, but the automatic mute could not be applied.",
                    );
                }
            }
        }

        let embed = warning_embed("User Warned", &description);
        respond_embed(serenity_ctx, command, embed.clone(), false).await?;
        mirror_mod_action(ctx, serenity_ctx, &guild_key, embed).await;
        Ok(())
    }

    /// Apply the threshold timeout and audit it with the bot as moderator.
    async fn apply_auto_mute(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        scene: &ActionScene,
        target: &User,
    ) -> Result<()> {
        let mut member = scene.guild_id.member(&serenity_ctx.http, target.id).await?;
        let until = Timestamp::from_unix_timestamp(Utc::now().timestamp() + AUTO_MUTE_MS / 1000)?;
        member
            .disable_communication_until_datetime(&serenity_ctx.http, until)
            .await?;

        dm_user_advisory(
            serenity_ctx,
            target,
            warning_embed(
                "You Have Been Muted",
                &format!(
                    "Server: **{}**\nReason: {}",
                    scene.guild.name,
                    ctx.moderation.escalation_reason()
                ),
            ),
        )
        .await;

        ctx.moderation
            .record_auto_mute(
                &scene.guild_id.to_string(),
                &target.id.to_string(),
                &scene.bot_member.user.id.to_string(),
            )
            .await
    }

    async fn handle_purge(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let scene = match self.load_scene(serenity_ctx, command).await? {
            Ok(scene) => scene,
            Err(rejection) => return respond_rejection(serenity_ctx, command, &rejection).await,
        };
        let amount = get_integer_option(&command.data.options, "amount")
            .unwrap_or(0)
            .clamp(1, 100) as usize;
        let target = get_user_option(&command.data.options, "user");
        let reason = get_string_option(&command.data.options, "reason")
            .unwrap_or_else(|| "No reason provided".to_string());

        if !guild_member_permissions(&scene.guild, &scene.bot_member)
            .contains(Permissions::MANAGE_MESSAGES)
        {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::BotMissingPermission("Manage Messages"),
            )
            .await;
        }

        let messages = command
            .channel_id
            .messages(&serenity_ctx.http, |builder| builder.limit(100))
            .await?;
        let candidates: Vec<(u64, i64)> = messages
            .iter()
            .filter(|message| {
                target
                    .as_ref()
                    .map(|user| message.author.id == user.id)
                    .unwrap_or(true)
            })
            .map(|message| (message.id.0, message.timestamp.unix_timestamp()))
            .collect();

        let eligible = purge_eligible(candidates, amount, Utc::now().timestamp());
        if eligible.is_empty() {
            return respond_rejection(serenity_ctx, command, &Rejection::NothingToDelete).await;
        }

        let deleted = eligible.len();
        if deleted == 1 {
            command
                .channel_id
                .delete_message(&serenity_ctx.http, eligible[0])
                .await?;
        } else {
            command
                .channel_id
                .delete_messages(
                    &serenity_ctx.http,
                    eligible.iter().map(|id| serenity::model::id::MessageId(*id)),
                )
                .await?;
        }

        let audit_target = target
            .as_ref()
            .map(|user| user.id.to_string())
            .unwrap_or_else(|| "all".to_string());
        ctx.moderation
            .record_action(
                &scene.guild_id.to_string(),
                &audit_target,
                &command.user.id.to_string(),
                "purge",
                &reason,
                None,
            )
            .await?;

        let embed = success_embed("Messages Purged", &format!("Deleted {deleted} message(s)."));
        respond_embed(serenity_ctx, command, embed.clone(), true).await?;
        mirror_mod_action(ctx, serenity_ctx, &scene.guild_id.to_string(), embed).await;
        Ok(())
    }

    async fn handle_slowmode(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let scene = match self.load_scene(serenity_ctx, command).await? {
            Ok(scene) => scene,
            Err(rejection) => return respond_rejection(serenity_ctx, command, &rejection).await,
        };
        let seconds = get_integer_option(&command.data.options, "seconds")
            .unwrap_or(0)
            .clamp(0, 21600) as u64;
        let reason = get_string_option(&command.data.options, "reason")
            .unwrap_or_else(|| "No reason provided".to_string());

        if !guild_member_permissions(&scene.guild, &scene.bot_member)
            .contains(Permissions::MANAGE_CHANNELS)
        {
            return respond_rejection(
                serenity_ctx,
                command,
                &Rejection::BotMissingPermission("Manage Channels"),
            )
            .await;
        }

        command
            .channel_id
            .edit(&serenity_ctx.http, |channel| channel.rate_limit_per_user(seconds))
            .await?;

        ctx.moderation
            .record_action(
                &scene.guild_id.to_string(),
                "channel",
                &command.user.id.to_string(),
                "slowmode",
                &reason,
                Some(seconds as i64 * 1000),
            )
            .await?;

        let description = if seconds == 0 {
            "Slowmode disabled for this channel.".to_string()
        } else {
            format!("Slowmode set to {seconds} second(s) for this channel.")
        };
        let embed = success_embed("Slowmode Updated", &description);
        respond_embed(serenity_ctx, command, embed.clone(), false).await?;
        mirror_mod_action(ctx, serenity_ctx, &scene.guild_id.to_string(), embed).await;
        Ok(())
    }

    /// Resolve the guild, bot member and role positions from the cache.
    async fn load_scene(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<Result<ActionScene, Rejection>> {
        let Some(guild_id) = command.guild_id else {
            return Ok(Err(Rejection::GuildOnly));
        };
        let guild = serenity_ctx
            .cache
            .guild(guild_id)
            .ok_or_else(|| anyhow!("guild {guild_id} missing from cache"))?;

        let bot_id = serenity_ctx.cache.current_user_id();
        let bot_member = guild_id.member(&serenity_ctx.http, bot_id).await?;
        let actor_position = command
            .member
            .as_ref()
            .map(|member| top_role_position(&guild, member))
            .unwrap_or(0);
        let bot_position = top_role_position(&guild, &bot_member);

        Ok(Ok(ActionScene {
            guild,
            guild_id,
            bot_member,
            actor_position,
            bot_position,
        }))
    }

    /// Identity, bot-permission and hierarchy checks shared by the
    /// target-directed commands. `require_member` decides whether a target
    /// absent from the guild is a rejection (kick/mute/warn) or merely
    /// skips the hierarchy comparison (ban). Passing commands get the
    /// resolved target member back so they need not fetch it again.
    #[allow(clippy::too_many_arguments)]
    async fn check_target(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        scene: &ActionScene,
        target: &User,
        action: &'static str,
        bot_permission: Permissions,
        bot_permission_label: &'static str,
        require_member: bool,
    ) -> Result<Result<Option<Member>, Rejection>> {
        if let Err(rejection) = check_target_identity(
            action,
            command.user.id.0,
            scene.bot_member.user.id.0,
            target.id.0,
        ) {
            return Ok(Err(rejection));
        }

        if !guild_member_permissions(&scene.guild, &scene.bot_member).contains(bot_permission) {
            return Ok(Err(Rejection::BotMissingPermission(bot_permission_label)));
        }

        match scene.guild_id.member(&serenity_ctx.http, target.id).await {
            Ok(target_member) => {
                let target_position = top_role_position(&scene.guild, &target_member);
                if let Err(rejection) = check_hierarchy(
                    action,
                    scene.actor_position,
                    scene.bot_position,
                    target_position,
                ) {
                    return Ok(Err(rejection));
                }
                Ok(Ok(Some(target_member)))
            }
            Err(_) if require_member => Ok(Err(Rejection::TargetNotInGuild)),
            Err(_) => Ok(Ok(None)),
        }
    }
}

/// Canonical `name#discriminator` tag.
pub fn user_tag(user: &User) -> String {
    format!("{}#{:04}", user.name, user.discriminator)
}

fn is_timed_out(member: &Member) -> bool {
    member
        .communication_disabled_until
        .map(|until| until.unix_timestamp() > Utc::now().timestamp())
        .unwrap_or(false)
}

/// Advisory mirror of a moderation embed to the configured mod-log channel.
pub async fn mirror_mod_action(
    ctx: &CommandContext,
    serenity_ctx: &Context,
    guild_id: &str,
    embed: CreateEmbed,
) {
    match ctx.database.get_guild_settings(guild_id).await {
        Ok(Some(settings)) => {
            if let Some(channel) = settings.mod_log_channel {
                mirror_to_channel(serenity_ctx, &channel, embed).await;
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Could not load settings for guild {guild_id}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_handler_commands() {
        let handler = ModerationHandler;
        let names = handler.command_names();

        for expected in ["ban", "kick", "mute", "unmute", "warn", "purge", "slowmode"] {
            assert!(names.contains(&expected));
        }
        assert_eq!(names.len(), 7);
    }
}
