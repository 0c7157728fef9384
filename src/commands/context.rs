//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 3.38.0
//!
//! ## Changelog
//! - 2.0.0: Carry the emoji service instead of persona and database services
//! - 1.0.0: Initial implementation with core shared state

use crate::features::emoji::EmojiService;

/// Shared context for all command and component handlers
#[derive(Clone)]
pub struct CommandContext {
    pub emoji: EmojiService,
    pub start_time: std::time::Instant,
}

impl CommandContext {
    pub fn new(emoji: EmojiService) -> Self {
        Self {
            emoji,
            start_time: std::time::Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_context_clone() {
        // CommandContext should be Clone for sharing across handlers
        fn assert_clone<T: Clone>() {}
        assert_clone::<CommandContext>();
    }
}
