//! Support slash commands: /ticket, /close

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates support commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_ticket_command(), create_close_command()]
}

fn create_ticket_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("ticket")
        .description("Open a support ticket")
        .create_option(|option| {
            option
                .name("reason")
                .description("What do you need help with?")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

fn create_close_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("close")
        .description("Close the current support ticket")
        .create_option(|option| {
            option
                .name("reason")
                .description("Why is the ticket being closed?")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}
