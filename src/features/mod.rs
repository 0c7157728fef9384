//! # Features
//!
//! Feature modules of the bot.

pub mod emoji;

pub use emoji::{EmojiService, EmojiSettings};
