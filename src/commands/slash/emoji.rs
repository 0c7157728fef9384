//! # Emoji Command
//!
//! Inspect a Unicode or custom emoji.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_emoji_command()]
}

fn create_emoji_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("emoji")
        .description("🔍 | Emoji information")
        .create_option(|option| {
            option
                .name("emoji")
                .description("Emoji to inspect: a Unicode emoji or <:name:id> / <a:name:id>")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(100)
        });
    command
}
