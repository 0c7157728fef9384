//! # Emoji Feature
//!
//! `/emoji` lookup cards and the owner-only "add emoji" button.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Bounded widget registry with shutdown teardown
//! - 1.0.0: Initial release

pub mod card;
pub mod discord;
pub mod error;
pub mod platform;
pub mod reference;
pub mod registry;
pub mod service;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use card::{parse_add_emoji_id, AddEmojiButton, Card, ADD_EMOJI_PREFIX};
pub use discord::{SerenityCommandResponder, SerenityComponentResponder, SerenityPlatform};
pub use error::{EmojiError, SlotCategory};
pub use platform::{EmojiPlatform, ImageFetcher};
pub use reference::{parse_token, CustomEmoji, EmojiReference};
pub use registry::{WidgetRegistry, DEFAULT_MAX_ACTIVE_WIDGETS};
pub use service::{EmojiService, EmojiSettings, Invocation, LookupOutcome, PressOutcome};
pub use widget::{AddEmojiWidget, WidgetState};
