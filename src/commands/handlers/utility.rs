//! Utility command handlers
//!
//! Handles: help, faq, ping, avatar, serverinfo, userinfo
//!
//! Help and FAQ drive select menus; the component interactions route back
//! into [`handle_help_select`] and [`handle_faq_select`].

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serenity::builder::CreateEmbed;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::{respond_embed, respond_rejection, CommandContext};
use crate::commands::handler::SlashCommandHandler;
use crate::commands::handlers::moderation::user_tag;
use crate::commands::registry::{commands_in_category, CommandCategory};
use crate::commands::slash::get_user_option;
use crate::core::{info_embed, Rejection};

/// Static FAQ entries: (menu value, question, answer).
const FAQ_ENTRIES: &[(&str, &str, &str)] = &[
    (
        "tickets",
        "How do I get help from the staff?",
        "Open a support ticket with /ticket or the Create Ticket button. A private channel is created for you and the support team.",
    ),
    (
        "warnings",
        "What happens when I get warned?",
        "Warnings are recorded per server. Reaching the warning threshold applies an automatic 24 hour mute.",
    ),
    (
        "mute",
        "How long do mutes last?",
        "Moderators choose a duration up to 28 days, for example 30m, 1h or 1d. The timeout lifts automatically when it expires.",
    ),
    (
        "appeal",
        "How do I appeal a moderation action?",
        "Open a ticket and explain the situation. A moderator will review the audit log with you.",
    ),
];

/// First category shown when /help opens.
const DEFAULT_HELP_CATEGORY: CommandCategory = CommandCategory::Utility;

/// Handler for utility commands
pub struct UtilityHandler;

#[async_trait]
impl SlashCommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["help", "faq", "ping", "avatar", "serverinfo", "userinfo"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "help" => self.handle_help(serenity_ctx, command).await,
            "faq" => self.handle_faq(serenity_ctx, command).await,
            "ping" => self.handle_ping(&ctx, serenity_ctx, command).await,
            "avatar" => self.handle_avatar(serenity_ctx, command).await,
            "serverinfo" => self.handle_serverinfo(serenity_ctx, command).await,
            "userinfo" => self.handle_userinfo(serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl UtilityHandler {
    async fn handle_help(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .add_embed(help_embed(DEFAULT_HELP_CATEGORY))
                            .ephemeral(true)
                            .components(|components| {
                                components.create_action_row(|row| {
                                    row.create_select_menu(|menu| {
                                        menu.custom_id("help_category")
                                            .placeholder("Pick a category")
                                            .options(|options| {
                                                for category in CommandCategory::all() {
                                                    options.create_option(|option| {
                                                        option
                                                            .label(category.label())
                                                            .value(category.label().to_lowercase())
                                                    });
                                                }
                                                options
                                            })
                                    })
                                })
                            })
                    })
            })
            .await?;
        Ok(())
    }

    async fn handle_faq(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .add_embed(faq_overview_embed())
                            .ephemeral(true)
                            .components(|components| {
                                components.create_action_row(|row| {
                                    row.create_select_menu(|menu| {
                                        menu.custom_id("faq_topic")
                                            .placeholder("Pick a question")
                                            .options(|options| {
                                                for (value, question, _) in FAQ_ENTRIES {
                                                    options.create_option(|option| {
                                                        option.label(*question).value(*value)
                                                    });
                                                }
                                                options
                                            })
                                    })
                                })
                            })
                    })
            })
            .await?;
        Ok(())
    }

    async fn handle_ping(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        // Command id is a snowflake; its embedded timestamp gives the
        // round-trip delay without a second request.
        let created_ms = (command.id.0 >> 22) as i64 + 1_420_070_400_000;
        let latency_ms = (Utc::now().timestamp_millis() - created_ms).max(0);

        let uptime = ctx.start_time.elapsed().as_secs();
        let hours = uptime / 3600;
        let minutes = (uptime % 3600) / 60;
        let seconds = uptime % 60;

        respond_embed(
            serenity_ctx,
            command,
            info_embed(
                "Pong!",
                &format!("**Latency:** {latency_ms} ms\n**Uptime:** {hours}h {minutes}m {seconds}s"),
            ),
            false,
        )
        .await
    }

    async fn handle_avatar(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user = get_user_option(&command.data.options, "user")
            .unwrap_or_else(|| command.user.clone());

        let mut embed = info_embed(&format!("{}'s Avatar", user_tag(&user)), "");
        embed.image(user.face());
        respond_embed(serenity_ctx, command, embed, false).await
    }

    async fn handle_serverinfo(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return respond_rejection(serenity_ctx, command, &Rejection::GuildOnly).await;
        };
        let guild = serenity_ctx
            .cache
            .guild(guild_id)
            .ok_or_else(|| anyhow!("guild {guild_id} missing from cache"))?;

        let mut embed = info_embed(
            &guild.name,
            &format!(
                "**Owner:** <@{}>\n**Members:** {}\n**Channels:** {}\n**Roles:** {}\n**Created:** <t:{}:F>",
                guild.owner_id,
                guild.member_count,
                guild.channels.len(),
                guild.roles.len(),
                guild_id.created_at().unix_timestamp(),
            ),
        );
        if let Some(icon) = guild.icon_url() {
            embed.thumbnail(icon);
        }
        embed.footer(|footer| footer.text(format!("Server ID: {guild_id}")));

        respond_embed(serenity_ctx, command, embed, false).await
    }

    async fn handle_userinfo(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(guild_id) = command.guild_id else {
            return respond_rejection(serenity_ctx, command, &Rejection::GuildOnly).await;
        };
        let user = get_user_option(&command.data.options, "user")
            .unwrap_or_else(|| command.user.clone());

        let mut description = format!(
            "**Tag:** {}\n**ID:** {}\n**Created:** <t:{}:F>",
            user_tag(&user),
            user.id,
            user.id.created_at().unix_timestamp(),
        );

        if let Ok(member) = guild_id.member(&serenity_ctx.http, user.id).await {
            if let Some(joined) = member.joined_at {
                description.push_str(&format!("\n**Joined:** <t:{}:F>", joined.unix_timestamp()));
            }
            if !member.roles.is_empty() {
                let roles: Vec<String> = member
                    .roles
                    .iter()
                    .map(|role| format!("<@&{role}>"))
                    .collect();
                description.push_str(&format!("\n**Roles:** {}", roles.join(" ")));
            }
        } else {
            description.push_str("\n*Not a member of this server.*");
        }

        let mut embed = info_embed(&user.name, &description);
        embed.thumbnail(user.face());
        respond_embed(serenity_ctx, command, embed, false).await
    }
}

/// Command list embed for one category, built from the static table.
fn help_embed(category: CommandCategory) -> CreateEmbed {
    let lines: Vec<String> = commands_in_category(category)
        .iter()
        .map(|meta| format!("`/{}` - {}", meta.name, meta.summary))
        .collect();
    info_embed(&format!("{} Commands", category.label()), &lines.join("\n"))
}

fn faq_overview_embed() -> CreateEmbed {
    let lines: Vec<String> = FAQ_ENTRIES
        .iter()
        .map(|(_, question, _)| format!("- {question}"))
        .collect();
    info_embed(
        "Frequently Asked Questions",
        &format!("Pick a question from the menu below.\n\n{}", lines.join("\n")),
    )
}

fn category_from_value(value: &str) -> Option<CommandCategory> {
    CommandCategory::all()
        .iter()
        .copied()
        .find(|category| category.label().eq_ignore_ascii_case(value))
}

/// Swap the help embed when a category is picked from the menu.
pub async fn handle_help_select(
    serenity_ctx: &Context,
    component: &MessageComponentInteraction,
) -> Result<()> {
    let category = component
        .data
        .values
        .first()
        .and_then(|value| category_from_value(value))
        .unwrap_or(DEFAULT_HELP_CATEGORY);

    component
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::UpdateMessage)
                .interaction_response_data(|message| message.add_embed(help_embed(category)))
        })
        .await?;
    Ok(())
}

/// Swap the FAQ embed when a question is picked from the menu.
pub async fn handle_faq_select(
    serenity_ctx: &Context,
    component: &MessageComponentInteraction,
) -> Result<()> {
    let embed = component
        .data
        .values
        .first()
        .and_then(|value| {
            FAQ_ENTRIES
                .iter()
                .find(|(entry_value, _, _)| *entry_value == value.as_str())
        })
        .map(|(_, question, answer)| info_embed(question, answer))
        .unwrap_or_else(faq_overview_embed);

    component
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::UpdateMessage)
                .interaction_response_data(|message| message.add_embed(embed))
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_handler_commands() {
        let handler = UtilityHandler;
        let names = handler.command_names();

        for expected in ["help", "faq", "ping", "avatar", "serverinfo", "userinfo"] {
            assert!(names.contains(&expected));
        }
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_category_from_value_round_trips() {
        for category in CommandCategory::all() {
            let value = category.label().to_lowercase();
            assert_eq!(category_from_value(&value), Some(*category));
        }
        assert!(category_from_value("nonsense").is_none());
    }

    #[test]
    fn test_faq_values_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (value, _, _) in FAQ_ENTRIES {
            assert!(seen.insert(*value), "duplicate FAQ value: {value}");
        }
    }
}
