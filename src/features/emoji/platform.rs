//! Capabilities the emoji flow needs from the chat platform
//!
//! The command and widget logic is written once against these traits. The serenity adapter
//! in [`super::discord`] implements them for Discord, tests implement them with recorders.

use anyhow::Result;
use async_trait::async_trait;

use super::card::{AddEmojiButton, Card};
use super::error::SlotCategory;

/// Location of a message the bot sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: u64,
    pub message_id: u64,
}

/// One emoji a guild already hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuildEmoji {
    pub id: u64,
    pub animated: bool,
}

/// Slot usage of one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUsage {
    pub category: SlotCategory,
    pub used: usize,
    pub limit: usize,
}

impl SlotUsage {
    pub fn is_full(&self) -> bool {
        self.used >= self.limit
    }
}

/// Emoji-related view of a guild at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildEmojiSnapshot {
    pub owner_id: u64,
    pub emoji_limit: usize,
    pub emojis: Vec<GuildEmoji>,
}

impl GuildEmojiSnapshot {
    pub fn has_emoji(&self, id: u64) -> bool {
        self.emojis.iter().any(|e| e.id == id)
    }

    /// Usage of the animated or static pool
    pub fn usage(&self, animated: bool) -> SlotUsage {
        SlotUsage {
            category: SlotCategory::for_animated(animated),
            used: self.emojis.iter().filter(|e| e.animated == animated).count(),
            limit: self.emoji_limit,
        }
    }
}

/// Per-category emoji limit for a boost tier (0-3)
///
/// Guilds with the `MORE_EMOJI` feature never drop below 200.
pub fn emoji_slot_limit(premium_tier: u8, more_emoji: bool) -> usize {
    let tier_limit = match premium_tier {
        1 => 100,
        2 => 150,
        3 => 250,
        _ => 50,
    };
    if more_emoji {
        tier_limit.max(200)
    } else {
        tier_limit
    }
}

/// Result of editing a widget message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Edited,
    /// The message was deleted in the meantime
    MessageMissing,
}

/// Guild-level operations
#[async_trait]
pub trait EmojiPlatform: Send + Sync {
    /// Current owner of the guild
    async fn guild_owner(&self, guild_id: u64) -> Result<u64>;

    async fn guild_emojis(&self, guild_id: u64) -> Result<GuildEmojiSnapshot>;

    /// Create a custom emoji; `Ok` carries the new emoji's mention, `Err` the platform's
    /// rejection text
    async fn create_emoji(
        &self,
        guild_id: u64,
        name: &str,
        image: &FetchedImage,
    ) -> std::result::Result<String, String>;

    /// Replace the button on a previously sent message
    async fn edit_button(&self, message: MessageRef, button: &AddEmojiButton) -> Result<EditOutcome>;
}

/// Replies to a slash command invocation
#[async_trait]
pub trait CommandResponder: Send + Sync {
    /// Acknowledge now, answer later with follow-ups
    async fn defer(&self) -> Result<()>;

    /// Initial response visible only to the requester
    async fn reply_private(&self, card: &Card) -> Result<()>;

    /// Public follow-up, optionally carrying the add button
    async fn followup(&self, card: &Card, button: Option<&AddEmojiButton>) -> Result<MessageRef>;

    async fn followup_private(&self, card: &Card) -> Result<()>;

    /// Remove the public placeholder left by [`CommandResponder::defer`], so the next
    /// follow-up is posted as a new message and keeps its own visibility
    async fn withdraw_deferral(&self) -> Result<()>;
}

/// Replies to a button press
#[async_trait]
pub trait ComponentResponder: Send + Sync {
    async fn reply_private(&self, card: &Card) -> Result<()>;

    /// Acknowledge the press by updating the pressed message's button
    async fn acknowledge_button(&self, button: &AddEmojiButton) -> Result<()>;

    async fn followup_private(&self, card: &Card) -> Result<()>;
}

/// Raw HTTP response for an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Downloads emoji images
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(animated: usize, still: usize, limit: usize) -> GuildEmojiSnapshot {
        let mut emojis = Vec::new();
        for i in 0..animated {
            emojis.push(GuildEmoji {
                id: i as u64,
                animated: true,
            });
        }
        for i in 0..still {
            emojis.push(GuildEmoji {
                id: 1000 + i as u64,
                animated: false,
            });
        }
        GuildEmojiSnapshot {
            owner_id: 1,
            emoji_limit: limit,
            emojis,
        }
    }

    #[test]
    fn test_usage_counts_categories_separately() {
        let snap = snapshot(3, 50, 50);
        let animated = snap.usage(true);
        assert_eq!(animated.used, 3);
        assert!(!animated.is_full());

        let still = snap.usage(false);
        assert_eq!(still.category, SlotCategory::Static);
        assert_eq!((still.used, still.limit), (50, 50));
        assert!(still.is_full());
    }

    #[test]
    fn test_has_emoji() {
        let snap = snapshot(1, 1, 50);
        assert!(snap.has_emoji(0));
        assert!(snap.has_emoji(1000));
        assert!(!snap.has_emoji(7));
    }

    #[test]
    fn test_slot_limits_by_tier() {
        assert_eq!(emoji_slot_limit(0, false), 50);
        assert_eq!(emoji_slot_limit(1, false), 100);
        assert_eq!(emoji_slot_limit(2, false), 150);
        assert_eq!(emoji_slot_limit(3, false), 250);
        assert_eq!(emoji_slot_limit(9, false), 50);
    }

    #[test]
    fn test_more_emoji_feature_raises_floor() {
        assert_eq!(emoji_slot_limit(0, true), 200);
        assert_eq!(emoji_slot_limit(3, true), 250);
    }

    #[test]
    fn test_fetched_image_status() {
        let mut image = FetchedImage {
            status: 200,
            content_type: None,
            bytes: vec![1, 2, 3],
        };
        assert!(image.is_success());
        image.status = 404;
        assert!(!image.is_success());
    }
}
