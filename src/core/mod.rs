//! # Core Module
//!
//! Configuration, embed rendering and HTTP downloads shared by the bot.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.7.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Card embeds and image downloads for the emoji command
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod download;
pub mod embeds;

// Re-export commonly used items
pub use config::Config;
pub use download::HttpImageFetcher;
pub use embeds::{card_embed, truncate_for_embed, EMBED_LIMIT};
