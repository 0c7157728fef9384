//! Serenity implementations of the emoji platform traits

use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use log::debug;
use serenity::builder::CreateComponents;
use serenity::cache::Cache;
use serenity::http::error::Error as HttpError;
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::guild::{Emoji, PremiumTier};
use serenity::model::id::{ChannelId, EmojiId, GuildId, MessageId, UserId};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;

use super::card::{AddEmojiButton, Card, ADD_EMOJI_ICON, ADD_EMOJI_LABEL};
use super::platform::{
    emoji_slot_limit, CommandResponder, ComponentResponder, EditOutcome, EmojiPlatform,
    FetchedImage, GuildEmoji, GuildEmojiSnapshot, MessageRef,
};
use crate::core::embeds::card_embed;

/// Discord guild feature that lifts the emoji limit to at least 200
const MORE_EMOJI_FEATURE: &str = "MORE_EMOJI";

/// Components holding just the add button
pub fn add_emoji_components(button: &AddEmojiButton) -> CreateComponents {
    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        row.create_button(|btn| {
            btn.custom_id(&button.custom_id)
                .label(ADD_EMOJI_LABEL)
                .emoji(ADD_EMOJI_ICON)
                .style(ButtonStyle::Secondary)
                .disabled(button.disabled)
        })
    });
    components
}

fn tier_level(tier: PremiumTier) -> u8 {
    match tier {
        PremiumTier::Tier1 => 1,
        PremiumTier::Tier2 => 2,
        PremiumTier::Tier3 => 3,
        _ => 0,
    }
}

fn snapshot_of(
    owner_id: UserId,
    emojis: &HashMap<EmojiId, Emoji>,
    tier: PremiumTier,
    features: &[String],
) -> GuildEmojiSnapshot {
    GuildEmojiSnapshot {
        owner_id: owner_id.0,
        emoji_limit: emoji_slot_limit(
            tier_level(tier),
            features.iter().any(|f| f == MORE_EMOJI_FEATURE),
        ),
        emojis: emojis
            .values()
            .map(|e| GuildEmoji {
                id: e.id.0,
                animated: e.animated,
            })
            .collect(),
    }
}

fn message_ref(message: &Message) -> MessageRef {
    MessageRef {
        channel_id: message.channel_id.0,
        message_id: message.id.0,
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(http_err) => match &**http_err {
            HttpError::UnsuccessfulRequest(response) => response.status_code.as_u16() == 404,
            _ => false,
        },
        _ => false,
    }
}

/// Guild operations over the gateway cache and the REST API
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    pub fn from_context(ctx: &Context) -> Self {
        Self::new(ctx.http.clone(), ctx.cache.clone())
    }
}

#[async_trait]
impl EmojiPlatform for SerenityPlatform {
    async fn guild_owner(&self, guild_id: u64) -> Result<u64> {
        let guild_id = GuildId(guild_id);
        if let Some(owner_id) = self.cache.guild_field(guild_id, |g| g.owner_id) {
            return Ok(owner_id.0);
        }
        let guild = guild_id.to_partial_guild(&self.http).await?;
        Ok(guild.owner_id.0)
    }

    async fn guild_emojis(&self, guild_id: u64) -> Result<GuildEmojiSnapshot> {
        let guild_id = GuildId(guild_id);
        if let Some(guild) = self.cache.guild(guild_id) {
            return Ok(snapshot_of(
                guild.owner_id,
                &guild.emojis,
                guild.premium_tier,
                &guild.features,
            ));
        }
        debug!("Guild {guild_id} not cached, fetching over HTTP");
        let guild = guild_id.to_partial_guild(&self.http).await?;
        Ok(snapshot_of(
            guild.owner_id,
            &guild.emojis,
            guild.premium_tier,
            &guild.features,
        ))
    }

    async fn create_emoji(
        &self,
        guild_id: u64,
        name: &str,
        image: &FetchedImage,
    ) -> std::result::Result<String, String> {
        let mime = image.content_type.as_deref().unwrap_or("image/png");
        let data_uri = format!("data:{mime};base64,{}", BASE64_ENGINE.encode(&image.bytes));
        GuildId(guild_id)
            .create_emoji(&self.http, name, &data_uri)
            .await
            .map(|emoji| emoji.to_string())
            .map_err(|e| e.to_string())
    }

    async fn edit_button(&self, message: MessageRef, button: &AddEmojiButton) -> Result<EditOutcome> {
        let components = add_emoji_components(button);
        let edited = ChannelId(message.channel_id)
            .edit_message(&self.http, MessageId(message.message_id), |m| {
                m.components(|c| {
                    *c = components;
                    c
                })
            })
            .await;
        match edited {
            Ok(_) => Ok(EditOutcome::Edited),
            Err(e) if is_not_found(&e) => Ok(EditOutcome::MessageMissing),
            Err(e) => Err(e.into()),
        }
    }
}

/// Replies to an `/emoji` invocation
pub struct SerenityCommandResponder<'a> {
    http: &'a Http,
    command: &'a ApplicationCommandInteraction,
}

impl<'a> SerenityCommandResponder<'a> {
    pub fn new(http: &'a Http, command: &'a ApplicationCommandInteraction) -> Self {
        Self { http, command }
    }
}

#[async_trait]
impl CommandResponder for SerenityCommandResponder<'_> {
    async fn defer(&self) -> Result<()> {
        self.command
            .create_interaction_response(self.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await?;
        Ok(())
    }

    async fn reply_private(&self, card: &Card) -> Result<()> {
        let embed = card_embed(card);
        self.command
            .create_interaction_response(self.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| m.ephemeral(true).add_embed(embed))
            })
            .await?;
        Ok(())
    }

    async fn followup(&self, card: &Card, button: Option<&AddEmojiButton>) -> Result<MessageRef> {
        let embed = card_embed(card);
        let components = button.map(add_emoji_components);
        let message = self
            .command
            .create_followup_message(self.http, |m| {
                m.set_embed(embed);
                if let Some(components) = components {
                    m.components(|c| {
                        *c = components;
                        c
                    });
                }
                m
            })
            .await?;
        Ok(message_ref(&message))
    }

    async fn followup_private(&self, card: &Card) -> Result<()> {
        let embed = card_embed(card);
        self.command
            .create_followup_message(self.http, |m| m.ephemeral(true).set_embed(embed))
            .await?;
        Ok(())
    }

    async fn withdraw_deferral(&self) -> Result<()> {
        self.command
            .delete_original_interaction_response(self.http)
            .await?;
        Ok(())
    }
}

/// Replies to a press on an add button
pub struct SerenityComponentResponder<'a> {
    http: &'a Http,
    component: &'a MessageComponentInteraction,
}

impl<'a> SerenityComponentResponder<'a> {
    pub fn new(http: &'a Http, component: &'a MessageComponentInteraction) -> Self {
        Self { http, component }
    }
}

#[async_trait]
impl ComponentResponder for SerenityComponentResponder<'_> {
    async fn reply_private(&self, card: &Card) -> Result<()> {
        let embed = card_embed(card);
        self.component
            .create_interaction_response(self.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| m.ephemeral(true).add_embed(embed))
            })
            .await?;
        Ok(())
    }

    async fn acknowledge_button(&self, button: &AddEmojiButton) -> Result<()> {
        let components = add_emoji_components(button);
        self.component
            .create_interaction_response(self.http, |r| {
                r.kind(InteractionResponseType::UpdateMessage)
                    .interaction_response_data(|m| m.set_components(components))
            })
            .await?;
        Ok(())
    }

    async fn followup_private(&self, card: &Card) -> Result<()> {
        let embed = card_embed(card);
        self.component
            .create_followup_message(self.http, |m| m.ephemeral(true).set_embed(embed))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_levels() {
        assert_eq!(tier_level(PremiumTier::Tier0), 0);
        assert_eq!(tier_level(PremiumTier::Tier1), 1);
        assert_eq!(tier_level(PremiumTier::Tier3), 3);
    }

    #[test]
    fn test_snapshot_of_applies_more_emoji() {
        let snapshot = snapshot_of(
            UserId(5),
            &HashMap::new(),
            PremiumTier::Tier1,
            &["MORE_EMOJI".to_string()],
        );
        assert_eq!(snapshot.owner_id, 5);
        assert_eq!(snapshot.emoji_limit, 200);
        assert!(snapshot.emojis.is_empty());
    }

    #[test]
    fn test_add_emoji_components_build() {
        let button = AddEmojiButton::new(uuid::Uuid::new_v4(), true);
        let components = add_emoji_components(&button);
        assert_eq!(components.0.len(), 1);
    }

    #[test]
    fn test_unrelated_errors_are_not_missing_messages() {
        assert!(!is_not_found(&serenity::Error::Other("boom")));
    }
}
