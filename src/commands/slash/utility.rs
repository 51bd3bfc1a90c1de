//! Utility slash commands: /help, /faq, /ping, /avatar, /serverinfo, /userinfo

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates utility commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_help_command(),
        create_faq_command(),
        create_ping_command(),
        create_avatar_command(),
        create_serverinfo_command(),
        create_userinfo_command(),
    ]
}

fn create_help_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("help")
        .description("Show the command list by category")
        .to_owned()
}

fn create_faq_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("faq")
        .description("Frequently asked questions")
        .to_owned()
}

fn create_ping_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("ping")
        .description("Check bot responsiveness")
        .to_owned()
}

fn create_avatar_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("avatar")
        .description("Show a user's avatar")
        .create_option(|option| {
            option
                .name("user")
                .description("User to show (defaults to you)")
                .kind(CommandOptionType::User)
                .required(false)
        })
        .to_owned()
}

fn create_serverinfo_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("serverinfo")
        .description("Show information about this server")
        .to_owned()
}

fn create_userinfo_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("userinfo")
        .description("Show information about a user")
        .create_option(|option| {
            option
                .name("user")
                .description("User to show (defaults to you)")
                .kind(CommandOptionType::User)
                .required(false)
        })
        .to_owned()
}
