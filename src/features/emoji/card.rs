//! Platform-neutral cards and the add button
//!
//! The command and the widget describe what to show with these types; the Discord adapter
//! turns them into embeds and components.

use uuid::Uuid;

use super::error::EmojiError;
use super::reference::{codepoints, pictograph_name, CustomEmoji};

/// Accent colour of every card
pub const CARD_COLOR: u32 = 0x2B2D31;

/// Custom id prefix of the add button
pub const ADD_EMOJI_PREFIX: &str = "emoji_add_";

pub const ADD_EMOJI_LABEL: &str = "Add emoji";
pub const ADD_EMOJI_ICON: char = '➕';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub fields: Vec<CardField>,
}

impl Card {
    fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(CardField {
            name: name.to_string(),
            value: value.into(),
            inline: true,
        });
        self
    }

    /// Value of the first field named `name`
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Info card for a custom emoji
pub fn custom_emoji_card(emoji: &CustomEmoji) -> Card {
    let url = emoji.source_url();
    Card {
        title: Some("Emoji".to_string()),
        image_url: Some(url.clone()),
        ..Card::default()
    }
    .field("ID", emoji.id.to_string())
    .field("Animated", if emoji.animated { "✅" } else { "❌" })
    .field("Link", format!("[Download]({url})"))
}

/// Info card for a standard pictograph
pub fn pictograph_card(sequence: &str) -> Card {
    let code = match pictograph_name(sequence) {
        Some(name) => format!("`{}` ({name})", codepoints(sequence)),
        None => format!("`{}`", codepoints(sequence)),
    };
    Card {
        title: Some(format!("Emoji {sequence}")),
        description: Some("Standard Unicode emoji".to_string()),
        ..Card::default()
    }
    .field("Code", code)
}

pub fn error_card(err: &EmojiError) -> Card {
    notice_card(format!("❌ | {err}"))
}

pub fn success_card(mention: &str) -> Card {
    notice_card(format!("✅ | Emoji added: {mention}"))
}

/// Single-line card with no title
pub fn notice_card(text: impl Into<String>) -> Card {
    Card {
        description: Some(text.into()),
        ..Card::default()
    }
}

/// The one button of an add-emoji widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEmojiButton {
    pub custom_id: String,
    pub disabled: bool,
}

impl AddEmojiButton {
    pub fn new(widget_id: Uuid, disabled: bool) -> Self {
        Self {
            custom_id: format!("{ADD_EMOJI_PREFIX}{widget_id}"),
            disabled,
        }
    }
}

/// Parse an add button custom_id back to its widget id
pub fn parse_add_emoji_id(custom_id: &str) -> Option<Uuid> {
    custom_id
        .strip_prefix(ADD_EMOJI_PREFIX)
        .and_then(|id| Uuid::parse_str(id).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_card_fields() {
        let emoji = CustomEmoji {
            name: "blob".to_string(),
            id: 77,
            animated: true,
        };
        let card = custom_emoji_card(&emoji);
        assert_eq!(card.title.as_deref(), Some("Emoji"));
        assert_eq!(
            card.image_url.as_deref(),
            Some("https://cdn.discordapp.com/emojis/77.gif")
        );
        assert_eq!(card.field_value("ID"), Some("77"));
        assert_eq!(card.field_value("Animated"), Some("✅"));
        assert_eq!(
            card.field_value("Link"),
            Some("[Download](https://cdn.discordapp.com/emojis/77.gif)")
        );
    }

    #[test]
    fn test_static_card_marks_not_animated() {
        let emoji = CustomEmoji {
            name: "blob".to_string(),
            id: 1,
            animated: false,
        };
        assert_eq!(custom_emoji_card(&emoji).field_value("Animated"), Some("❌"));
    }

    #[test]
    fn test_pictograph_card() {
        let card = pictograph_card("😀");
        assert_eq!(card.title.as_deref(), Some("Emoji 😀"));
        assert_eq!(card.field_value("Code"), Some("`U+1F600` (grinning face)"));
    }

    #[test]
    fn test_error_card_text() {
        let card = error_card(&EmojiError::InvalidFormat);
        assert!(card.description.unwrap().starts_with("❌ | Invalid emoji format"));
        assert!(card.title.is_none());
    }

    #[test]
    fn test_button_id_roundtrip() {
        let id = Uuid::new_v4();
        let button = AddEmojiButton::new(id, false);
        assert!(button.custom_id.starts_with(ADD_EMOJI_PREFIX));
        assert_eq!(parse_add_emoji_id(&button.custom_id), Some(id));
    }

    #[test]
    fn test_invalid_button_ids() {
        assert!(parse_add_emoji_id("emoji_add_not-a-uuid").is_none());
        assert!(parse_add_emoji_id("confirm_123").is_none());
    }
}
