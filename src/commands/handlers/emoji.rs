//! Emoji command handler
//!
//! Handles: emoji
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_string_option;
use crate::features::emoji::{
    Invocation, LookupOutcome, SerenityCommandResponder, SerenityPlatform,
};

pub struct EmojiHandler;

#[async_trait]
impl SlashCommandHandler for EmojiHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["emoji"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let start_time = Instant::now();

        // Discord enforces the required option; an absent value is treated as empty input
        let token = get_string_option(&command.data.options, "emoji").unwrap_or_default();
        let invocation = Invocation {
            user_id: command.user.id.0,
            guild_id: command.guild_id.map(|id| id.0),
        };

        info!(
            "[{request_id}] /emoji command | Token: {token:?} | User: {} | Guild: {:?}",
            invocation.user_id, invocation.guild_id
        );

        let platform = Arc::new(SerenityPlatform::from_context(serenity_ctx));
        let responder = SerenityCommandResponder::new(&serenity_ctx.http, command);
        let outcome = ctx
            .emoji
            .lookup(platform, &invocation, &token, &responder, request_id)
            .await;

        let summary = match &outcome {
            LookupOutcome::Custom { widget: Some(id) } => format!("custom emoji, widget {id}"),
            LookupOutcome::Custom { widget: None } => "custom emoji".to_string(),
            LookupOutcome::Pictograph => "pictograph".to_string(),
            LookupOutcome::Rejected(err) => format!("rejected: {err}"),
        };
        info!(
            "[{request_id}] /emoji completed in {:?} ({summary})",
            start_time.elapsed()
        );
        Ok(())
    }
}
