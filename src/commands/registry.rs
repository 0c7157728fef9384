//! Command handler registry
//!
//! - **Version**: 1.1.0
//! - **Since**: 3.38.0
//!
//! ## Changelog
//! - 1.1.0: Build the default registry from the handler list
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::SlashCommandHandler;
use super::handlers::create_all_handlers;

/// Registry mapping command names to handlers
///
/// # Example
///
/// ```ignore
/// let registry = CommandRegistry::with_default_handlers();
///
/// if let Some(handler) = registry.get("emoji") {
///     handler.handle(ctx, serenity_ctx, command).await?;
/// }
/// ```
#[derive(Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry holding every handler the bot ships with
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        for handler in create_all_handlers() {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler for its declared command names
    ///
    /// The handler is registered for all names returned by `command_names()`.
    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    /// Get handler for a command name
    ///
    /// Returns None if no handler is registered for the given name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a command is registered
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names
    ///
    /// Note: This counts command names, not unique handlers.
    /// A handler registered for multiple names will be counted multiple times.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Get all registered command names
    pub fn command_names(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::CommandContext;
    use anyhow::Result;
    use async_trait::async_trait;
    use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
    use serenity::prelude::Context;

    // Mock handler for testing
    struct MockHandler {
        names: &'static [&'static str],
    }

    #[async_trait]
    impl SlashCommandHandler for MockHandler {
        fn command_names(&self) -> &'static [&'static str] {
            self.names
        }

        async fn handle(
            &self,
            _ctx: Arc<CommandContext>,
            _serenity_ctx: &Context,
            _command: &ApplicationCommandInteraction,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_register_single() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler { names: &["emoji"] }));

        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("emoji"));
        assert!(!registry.contains("sticker"));
    }

    #[test]
    fn test_registry_register_multiple_names() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler {
            names: &["emoji", "emote"],
        }));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("emoji"));
        assert!(registry.contains("emote"));
    }

    #[test]
    fn test_registry_get_returns_handler() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler { names: &["emoji"] }));

        let handler = registry.get("emoji");
        assert!(handler.is_some());

        let missing = registry.get("sticker");
        assert!(missing.is_none());
    }

    #[test]
    fn test_registry_default() {
        let registry = CommandRegistry::default();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_default_handlers_cover_slash_commands() {
        let registry = CommandRegistry::with_default_handlers();
        for command in crate::commands::slash::create_slash_commands() {
            let name = command.0.get("name").unwrap().as_str().unwrap().to_string();
            assert!(registry.contains(&name), "No handler for /{name}");
        }
    }
}
