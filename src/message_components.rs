//! # Message Components
//!
//! Routes button presses to the feature that owns them.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 2.0.0: Route `emoji_add_` buttons to the emoji service; drop persona and debate buttons

use anyhow::Result;
use log::info;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::CommandContext;
use crate::features::emoji::{
    parse_add_emoji_id, SerenityComponentResponder, SerenityPlatform, ADD_EMOJI_PREFIX,
};

/// Custom id families this router understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRoute {
    AddEmoji(Uuid),
    Unknown,
}

impl ComponentRoute {
    pub fn from_custom_id(custom_id: &str) -> Self {
        if custom_id.starts_with(ADD_EMOJI_PREFIX) {
            if let Some(widget_id) = parse_add_emoji_id(custom_id) {
                return ComponentRoute::AddEmoji(widget_id);
            }
        }
        ComponentRoute::Unknown
    }
}

/// Handler for all message component interactions
pub struct MessageComponentHandler {
    context: Arc<CommandContext>,
}

impl MessageComponentHandler {
    pub fn new(context: Arc<CommandContext>) -> Self {
        Self { context }
    }

    /// Handle all types of component interactions
    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let user_id = interaction.user.id.0;
        let request_id = Uuid::new_v4();

        info!("[{request_id}] Processing component interaction: {custom_id} from user: {user_id}");

        match ComponentRoute::from_custom_id(custom_id) {
            ComponentRoute::AddEmoji(widget_id) => {
                let platform = SerenityPlatform::from_context(ctx);
                let responder = SerenityComponentResponder::new(&ctx.http, interaction);
                let outcome = self
                    .context
                    .emoji
                    .press(&platform, widget_id, user_id, &responder, request_id)
                    .await;
                info!("[{request_id}] Add button {widget_id} finished: {outcome:?}");
            }
            ComponentRoute::Unknown => {
                interaction
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message.content("Unknown component interaction.").ephemeral(true)
                            })
                    })
                    .await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_add_emoji_button() {
        let id = Uuid::new_v4();
        let custom_id = format!("{ADD_EMOJI_PREFIX}{id}");
        assert_eq!(
            ComponentRoute::from_custom_id(&custom_id),
            ComponentRoute::AddEmoji(id)
        );
    }

    #[test]
    fn test_route_malformed_add_emoji_button() {
        assert_eq!(
            ComponentRoute::from_custom_id("emoji_add_not-a-uuid"),
            ComponentRoute::Unknown
        );
    }

    #[test]
    fn test_route_foreign_button() {
        assert_eq!(
            ComponentRoute::from_custom_id("persona_muppet"),
            ComponentRoute::Unknown
        );
    }
}
