use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use emoji_lookup::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandRegistry,
};
use emoji_lookup::core::{Config, HttpImageFetcher};
use emoji_lookup::features::emoji::SerenityPlatform;
use emoji_lookup::features::EmojiService;
use emoji_lookup::message_components::MessageComponentHandler;

/// Upper bound on waiting for widget messages to be disabled at shutdown
const SHUTDOWN_EDIT_TIMEOUT: Duration = Duration::from_secs(5);

struct Handler {
    context: Arc<CommandContext>,
    registry: Arc<CommandRegistry>,
    component_handler: Arc<MessageComponentHandler>,
    guild_id: Option<GuildId>,
}

impl Handler {
    fn new(context: CommandContext, guild_id: Option<GuildId>) -> Self {
        let context = Arc::new(context);
        Handler {
            component_handler: Arc::new(MessageComponentHandler::new(context.clone())),
            registry: Arc::new(CommandRegistry::with_default_handlers()),
            context,
            guild_id,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        // Guild commands update instantly; global ones can take up to an hour
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                let Some(handler) = self.registry.get(&command.data.name) else {
                    warn!("No handler registered for /{}", command.data.name);
                    return;
                };

                if let Err(e) = handler.handle(self.context.clone(), &ctx, &command).await {
                    error!(
                        "Error handling slash command '{}': {}",
                        command.data.name, e
                    );

                    let error_message =
                        "❌ Sorry, I encountered an error processing your command. Please try again.";

                    // Deferred commands take a follow-up, fresh ones an initial response
                    if command
                        .create_followup_message(&ctx.http, |message| {
                            message.content(error_message).ephemeral(true)
                        })
                        .await
                        .is_err()
                    {
                        let _ = command
                            .create_interaction_response(&ctx.http, |response| {
                                response
                                    .kind(InteractionResponseType::ChannelMessageWithSource)
                                    .interaction_response_data(|message| {
                                        message.content(error_message).ephemeral(true)
                                    })
                            })
                            .await;
                    }
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(e) = self
                    .component_handler
                    .handle_component_interaction(&ctx, &component)
                    .await
                {
                    error!(
                        "Error handling component interaction '{}': {}",
                        component.data.custom_id, e
                    );

                    let error_message = "❌ Sorry, I encountered an error processing your interaction. Please try again.";
                    let _ = component
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(error_message).ephemeral(true)
                                })
                        })
                        .await;
                }
            }
            Interaction::Ping(_) => {
                info!("Ping interaction received - Discord health check");
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting emoji lookup bot...");

    let fetcher = HttpImageFetcher::new(config.download_timeout_secs, config.max_download_bytes)?;
    let emoji = EmojiService::new(config.emoji_settings(), Arc::new(fetcher));
    let context = CommandContext::new(emoji.clone());

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler::new(context, guild_id);

    // Owner lookups and emoji counts are served from the guild cache
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_EMOJIS_AND_STICKERS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    let shard_manager = client.shard_manager.clone();
    let platform = Arc::new(SerenityPlatform::new(
        client.cache_and_http.http.clone(),
        client.cache_and_http.cache.clone(),
    ));
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {e}");
            return;
        }
        info!("🛑 Shutdown requested, disabling live widgets...");

        let mut edits = emoji.shutdown(platform);
        let drained = tokio::time::timeout(SHUTDOWN_EDIT_TIMEOUT, async {
            while edits.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!("Widget message edits still pending after {SHUTDOWN_EDIT_TIMEOUT:?}, abandoning them");
            edits.abort_all();
        }

        shard_manager.lock().await.shutdown_all().await;
    });

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    info!("Bot stopped");
    Ok(())
}
