//! Card to embed conversion
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Render platform-neutral cards instead of persona embeds
//! - 1.0.0: Shared embed construction

use serenity::builder::CreateEmbed;

use crate::features::emoji::card::{Card, CARD_COLOR};

/// Discord embed description limit
pub const EMBED_LIMIT: usize = 4096;

/// Discord embed field value limit
pub const FIELD_LIMIT: usize = 1024;

/// Truncate text to `limit` bytes on a char boundary, adding an ellipsis if cut
pub fn truncate_to(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit.saturating_sub(3);
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

pub fn truncate_for_embed(text: &str) -> String {
    truncate_to(text, EMBED_LIMIT)
}

/// Build the embed for a card. Platform error texts can be long, so descriptions and
/// field values are clipped to Discord's limits.
pub fn card_embed(card: &Card) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.color(CARD_COLOR);
    if let Some(title) = &card.title {
        embed.title(title);
    }
    if let Some(description) = &card.description {
        embed.description(truncate_for_embed(description));
    }
    if let Some(url) = &card.image_url {
        embed.image(url);
    }
    for field in &card.fields {
        embed.field(&field.name, truncate_to(&field.value, FIELD_LIMIT), field.inline);
    }
    embed
}
