//! Admin slash commands: /autorole, /welcome, /logs, /setup, /embed

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::channel::ChannelType;
use serenity::model::permissions::Permissions;

/// Creates admin commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_autorole_command(),
        create_welcome_command(),
        create_logs_command(),
        create_setup_command(),
        create_embed_command(),
    ]
}

fn create_autorole_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("autorole")
        .description("Manage roles granted automatically to new members")
        .default_member_permissions(Permissions::MANAGE_ROLES)
        .create_option(|option| {
            option
                .name("add")
                .description("Add a role to the auto-role list")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("role")
                        .description("The role to grant to new members")
                        .kind(CommandOptionType::Role)
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("remove")
                .description("Remove a role from the auto-role list")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("role")
                        .description("The role to stop granting")
                        .kind(CommandOptionType::Role)
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("list")
                .description("List the configured auto-roles")
                .kind(CommandOptionType::SubCommand)
        })
        .to_owned()
}

fn create_welcome_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("welcome")
        .description("Configure the welcome message for new members")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .create_option(|option| {
            option
                .name("set")
                .description("Set the welcome channel and message")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("channel")
                        .description("Channel to post welcomes in")
                        .kind(CommandOptionType::Channel)
                        .channel_types(&[ChannelType::Text])
                        .required(true)
                })
                .create_sub_option(|sub| {
                    sub.name("message")
                        .description("Welcome text; {user} becomes a mention")
                        .kind(CommandOptionType::String)
                        .required(false)
                })
        })
        .create_option(|option| {
            option
                .name("background")
                .description("Set the welcome card background image")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("url")
                        .description("Image URL for the card background")
                        .kind(CommandOptionType::String)
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("toggle_image")
                .description("Enable or disable the welcome card image")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("enabled")
                        .description("Whether to attach the card image")
                        .kind(CommandOptionType::Boolean)
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("disable")
                .description("Disable welcome messages")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("test")
                .description("Post a test welcome for yourself")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("view")
                .description("View the current welcome configuration")
                .kind(CommandOptionType::SubCommand)
        })
        .to_owned()
}

fn create_logs_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("logs")
        .description("Configure logging channels")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .create_option(|option| {
            option
                .name("mod_log")
                .description("Set the moderation log channel")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("channel")
                        .description("Channel for moderation actions")
                        .kind(CommandOptionType::Channel)
                        .channel_types(&[ChannelType::Text])
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("member_log")
                .description("Set the member join/leave log channel")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("channel")
                        .description("Channel for member events")
                        .kind(CommandOptionType::Channel)
                        .channel_types(&[ChannelType::Text])
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("message_log")
                .description("Set the message log channel")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("channel")
                        .description("Channel for message events")
                        .kind(CommandOptionType::Channel)
                        .channel_types(&[ChannelType::Text])
                        .required(true)
                })
        })
        .create_option(|option| {
            option
                .name("disable")
                .description("Disable all logging channels")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("view")
                .description("View the current logging configuration")
                .kind(CommandOptionType::SubCommand)
        })
        .to_owned()
}

fn create_setup_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("setup")
        .description("Set up bot systems")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .create_option(|option| {
            option
                .name("ticket")
                .description("Set up the ticket system and post the panel")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("support_role")
                        .description("Role granted access to tickets")
                        .kind(CommandOptionType::Role)
                        .required(false)
                })
                .create_sub_option(|sub| {
                    sub.name("category")
                        .description("Category to create ticket channels under")
                        .kind(CommandOptionType::Channel)
                        .channel_types(&[ChannelType::Category])
                        .required(false)
                })
                .create_sub_option(|sub| {
                    sub.name("log_channel")
                        .description("Channel for ticket transcripts")
                        .kind(CommandOptionType::Channel)
                        .channel_types(&[ChannelType::Text])
                        .required(false)
                })
                .create_sub_option(|sub| {
                    sub.name("message")
                        .description("Custom text shown on the ticket panel")
                        .kind(CommandOptionType::String)
                        .required(false)
                })
        })
        .to_owned()
}

fn create_embed_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("embed")
        .description("Build and post a custom embed")
        .default_member_permissions(Permissions::MANAGE_MESSAGES)
        .create_option(|option| {
            option
                .name("title")
                .description("Embed title")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("description")
                .description("Embed body text")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("color")
                .description("Hex color like #5865F2")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("channel")
                .description("Channel to post in (defaults to here)")
                .kind(CommandOptionType::Channel)
                .channel_types(&[ChannelType::Text])
                .required(false)
        })
        .create_option(|option| {
            option
                .name("footer")
                .description("Footer text")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("image")
                .description("Image URL")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}
