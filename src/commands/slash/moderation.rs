//! Moderation slash commands: /ban, /kick, /mute, /unmute, /warn, /purge, /slowmode

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::permissions::Permissions;

/// Creates moderation commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_ban_command(),
        create_kick_command(),
        create_mute_command(),
        create_unmute_command(),
        create_warn_command(),
        create_purge_command(),
        create_slowmode_command(),
    ]
}

fn create_ban_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("ban")
        .description("Ban a user from the server")
        .default_member_permissions(Permissions::BAN_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The user to ban")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the ban")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("delete_days")
                .description("Days of messages to delete (0-7)")
                .kind(CommandOptionType::Integer)
                .min_int_value(0)
                .max_int_value(7)
                .required(false)
        })
        .to_owned()
}

fn create_kick_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("kick")
        .description("Kick a user from the server")
        .default_member_permissions(Permissions::KICK_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The user to kick")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the kick")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

fn create_mute_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("mute")
        .description("Timeout a user")
        .default_member_permissions(Permissions::MODERATE_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The user to mute")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("duration")
                .description("Duration like 30m, 1h, 1d (max 28 days, default 1h)")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the mute")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

fn create_unmute_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("unmute")
        .description("Remove a user's timeout")
        .default_member_permissions(Permissions::MODERATE_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The user to unmute")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the unmute")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

fn create_warn_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("warn")
        .description("Warn a user")
        .default_member_permissions(Permissions::MODERATE_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The user to warn")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the warning")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

fn create_purge_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("purge")
        .description("Bulk delete recent messages in this channel")
        .default_member_permissions(Permissions::MANAGE_MESSAGES)
        .create_option(|option| {
            option
                .name("amount")
                .description("Number of messages to delete (1-100)")
                .kind(CommandOptionType::Integer)
                .min_int_value(1)
                .max_int_value(100)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("user")
                .description("Only delete messages from this user")
                .kind(CommandOptionType::User)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the purge")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

fn create_slowmode_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("slowmode")
        .description("Set the slowmode interval for this channel")
        .default_member_permissions(Permissions::MANAGE_CHANNELS)
        .create_option(|option| {
            option
                .name("seconds")
                .description("Seconds between messages (0-21600, 0 disables)")
                .kind(CommandOptionType::Integer)
                .min_int_value(0)
                .max_int_value(21600)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the change")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}
