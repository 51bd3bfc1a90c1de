//! # Slash Commands (/)
//!
//! Native slash command definitions and registration.

pub mod admin;
pub mod moderation;
pub mod support;
pub mod utility;

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::application_command::{
    CommandDataOption, CommandDataOptionValue,
};
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::Context;

/// Creates all slash command definitions
pub fn create_slash_commands() -> Vec<CreateApplicationCommand> {
    let mut commands = Vec::new();

    commands.extend(moderation::create_commands());
    commands.extend(admin::create_commands());
    commands.extend(support::create_commands());
    commands.extend(utility::create_commands());

    commands
}

/// Registers all slash commands globally
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    Command::set_global_application_commands(&ctx.http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("Global slash commands registered successfully ({count} commands)");
    Ok(())
}

/// Registers all slash commands for a specific guild (faster for testing)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    guild_id
        .set_application_commands(&ctx.http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!("Guild slash commands registered for guild {guild_id} ({count} commands)");
    Ok(())
}

/// Utility function to get string option from slash command
pub fn get_string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

/// Utility function to get channel option from slash command
pub fn get_channel_option(options: &[CommandDataOption], name: &str) -> Option<u64> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .and_then(|s| s.parse().ok())
}

/// Utility function to get role option from slash command
pub fn get_role_option(options: &[CommandDataOption], name: &str) -> Option<u64> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .and_then(|s| s.parse().ok())
}

/// Utility function to get integer option from slash command
pub fn get_integer_option(options: &[CommandDataOption], name: &str) -> Option<i64> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_i64())
}

/// Utility function to get boolean option from slash command
pub fn get_bool_option(options: &[CommandDataOption], name: &str) -> Option<bool> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_bool())
}

/// Utility function to get a resolved user option from slash command
pub fn get_user_option(options: &[CommandDataOption], name: &str) -> Option<User> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.resolved.as_ref())
        .and_then(|val| match val {
            CommandDataOptionValue::User(user, _) => Some(user.clone()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::registry::COMMAND_TABLE;

    #[test]
    fn test_create_slash_commands() {
        let commands = create_slash_commands();

        let command_names: Vec<String> = commands
            .iter()
            .map(|cmd| cmd.0.get("name").unwrap().as_str().unwrap().to_string())
            .collect();

        let expected_commands = vec![
            "ban",
            "kick",
            "mute",
            "unmute",
            "warn",
            "purge",
            "slowmode",
            "autorole",
            "welcome",
            "logs",
            "setup",
            "embed",
            "ticket",
            "close",
            "help",
            "faq",
            "ping",
            "avatar",
            "serverinfo",
            "userinfo",
        ];

        assert_eq!(commands.len(), expected_commands.len());
        for expected in expected_commands {
            assert!(
                command_names.contains(&expected.to_string()),
                "Missing command: {expected}"
            );
        }
    }

    #[test]
    fn test_every_definition_has_metadata() {
        let commands = create_slash_commands();
        for cmd in &commands {
            let name = cmd.0.get("name").unwrap().as_str().unwrap();
            assert!(
                COMMAND_TABLE.iter().any(|meta| meta.name == name),
                "Command {name} has no metadata entry"
            );
        }
    }
}
