// Core layer - configuration and shared helpers
pub mod core;

// Features layer - emoji lookup and the add-emoji widget
pub mod features;

// UI components
pub mod message_components;

// Application layer
pub mod commands;

pub use core::Config;

pub use features::emoji::{EmojiError, EmojiService, EmojiSettings, WidgetRegistry};
