//! Slash command handler trait
//!
//! - **Version**: 1.0.0
//! - **Since**: 3.38.0

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

use super::context::CommandContext;

/// Trait for slash command handlers
///
/// Handlers are registered with a [`super::CommandRegistry`] and dispatched by command name.
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Command name(s) this handler processes
    fn command_names(&self) -> &'static [&'static str];

    /// Handle the slash command
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared command context
    /// * `serenity_ctx` - Serenity context for Discord API calls
    /// * `command` - The slash command interaction to handle
    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}
