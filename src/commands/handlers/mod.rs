//! Per-command handler implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 3.38.0
//!
//! ## Changelog
//! - 3.0.0: Emoji lookup is the only command
//! - 1.0.0: Initial extraction from monolithic command_handler.rs

pub mod emoji;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Create all registered command handlers
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![Arc::new(emoji::EmojiHandler)]
}
