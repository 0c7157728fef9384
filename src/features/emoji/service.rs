//! Emoji lookup and add flow
//!
//! [`EmojiService::lookup`] answers `/emoji`, [`EmojiService::press`] answers the add button.
//! Both recover every failure at this boundary and report it to the requester privately.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Owner check before the emoji list read, private errors after a deferral
//! - 1.1.0: Bounded widget registry, explicit shutdown
//! - 1.0.0: Initial implementation

use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Duration;
use uuid::Uuid;

use super::card::{
    custom_emoji_card, error_card, notice_card, pictograph_card, success_card, Card,
};
use super::error::EmojiError;
use super::platform::{CommandResponder, ComponentResponder, EmojiPlatform, ImageFetcher};
use super::reference::{parse_token, CustomEmoji, EmojiReference};
use super::registry::{WidgetRegistry, DEFAULT_MAX_ACTIVE_WIDGETS};
use super::widget::{AddEmojiWidget, WidgetState, DEFAULT_WIDGET_TIMEOUT};

/// Tunables of the emoji feature
#[derive(Debug, Clone, Copy)]
pub struct EmojiSettings {
    pub widget_timeout: Duration,
    pub max_active_widgets: usize,
}

impl Default for EmojiSettings {
    fn default() -> Self {
        Self {
            widget_timeout: DEFAULT_WIDGET_TIMEOUT,
            max_active_widgets: DEFAULT_MAX_ACTIVE_WIDGETS,
        }
    }
}

/// Who ran the command, and where
#[derive(Debug, Clone, Copy)]
pub struct Invocation {
    pub user_id: u64,
    pub guild_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Custom emoji card sent, with the id of the attached widget if one was offered
    Custom { widget: Option<Uuid> },
    Pictograph,
    Rejected(EmojiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    /// No live widget behind the button
    Unknown,
    NotPermitted,
    /// Another press, the timer, or shutdown got there first
    AlreadyHandled,
    /// Mention of the created emoji
    Added(String),
    Failed(EmojiError),
}

#[derive(Clone)]
pub struct EmojiService {
    registry: WidgetRegistry,
    fetcher: Arc<dyn ImageFetcher>,
    settings: EmojiSettings,
}

impl EmojiService {
    pub fn new(settings: EmojiSettings, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            registry: WidgetRegistry::new(settings.max_active_widgets),
            fetcher,
            settings,
        }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn settings(&self) -> EmojiSettings {
        self.settings
    }

    /// Answer one `/emoji` invocation
    pub async fn lookup(
        &self,
        platform: Arc<dyn EmojiPlatform>,
        invocation: &Invocation,
        token: &str,
        responder: &dyn CommandResponder,
        request_id: Uuid,
    ) -> LookupOutcome {
        let reference = match parse_token(token) {
            Ok(reference) => reference,
            Err(err) => {
                info!("[{request_id}] Rejected emoji token {token:?}: {err}");
                if let Err(e) = responder.reply_private(&error_card(&err)).await {
                    error!("[{request_id}] Failed to send invalid-format notice: {e}");
                }
                return LookupOutcome::Rejected(err);
            }
        };

        let mut deferred = false;
        match self
            .render(platform, invocation, reference, responder, &mut deferred, request_id)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("[{request_id}] Emoji lookup failed: {err}");
                let card = error_card(&err);
                let sent = if deferred {
                    // The first follow-up would inherit the public deferral
                    if let Err(e) = responder.withdraw_deferral().await {
                        warn!("[{request_id}] Failed to withdraw deferred response: {e}");
                    }
                    responder.followup_private(&card).await
                } else {
                    responder.reply_private(&card).await
                };
                if let Err(e) = sent {
                    error!("[{request_id}] Failed to report lookup error: {e}");
                }
                LookupOutcome::Rejected(err)
            }
        }
    }

    async fn render(
        &self,
        platform: Arc<dyn EmojiPlatform>,
        invocation: &Invocation,
        reference: EmojiReference,
        responder: &dyn CommandResponder,
        deferred: &mut bool,
        request_id: Uuid,
    ) -> Result<LookupOutcome, EmojiError> {
        responder.defer().await?;
        *deferred = true;

        let emoji = match reference {
            EmojiReference::Unicode { sequence } => {
                debug!("[{request_id}] Pictograph {sequence:?}");
                responder.followup(&pictograph_card(&sequence), None).await?;
                return Ok(LookupOutcome::Pictograph);
            }
            EmojiReference::Custom(emoji) => emoji,
        };

        debug!(
            "[{request_id}] Custom emoji {} ({}, animated: {})",
            emoji.name, emoji.id, emoji.animated
        );
        let card = custom_emoji_card(&emoji);

        let widget = match invocation.guild_id {
            Some(guild_id) => {
                self.offer_widget(platform.as_ref(), guild_id, invocation.user_id, &emoji)
                    .await?
            }
            None => None,
        };

        let Some(widget) = widget else {
            responder.followup(&card, None).await?;
            return Ok(LookupOutcome::Custom { widget: None });
        };

        if !self.registry.register(Arc::clone(&widget)) {
            warn!(
                "[{request_id}] Widget registry full ({} live), sending card without a button",
                self.registry.len()
            );
            responder.followup(&card, None).await?;
            return Ok(LookupOutcome::Custom { widget: None });
        }

        match responder.followup(&card, Some(&widget.button())).await {
            Ok(message) => {
                widget.bind_message(message);
                if widget.state() != WidgetState::Armed {
                    // Shut down while the card was in flight
                    info!(
                        "[{request_id}] Widget {} disabled before its card was posted",
                        widget.id()
                    );
                    widget.refresh_message(platform.as_ref()).await;
                    return Ok(LookupOutcome::Custom { widget: None });
                }
                Arc::clone(&widget).start_expiry(platform, self.registry.clone());
                info!(
                    "[{request_id}] ➕ Offered add-emoji widget {} for {} in guild {}",
                    widget.id(),
                    emoji.name,
                    widget.guild_id()
                );
                Ok(LookupOutcome::Custom {
                    widget: Some(widget.id()),
                })
            }
            Err(e) => {
                self.registry.remove(&widget.id());
                Err(e.into())
            }
        }
    }

    /// A widget is offered only to the guild owner, and only for emoji the guild lacks
    async fn offer_widget(
        &self,
        platform: &dyn EmojiPlatform,
        guild_id: u64,
        user_id: u64,
        emoji: &CustomEmoji,
    ) -> Result<Option<Arc<AddEmojiWidget>>, EmojiError> {
        if platform.guild_owner(guild_id).await? != user_id {
            return Ok(None);
        }
        if platform.guild_emojis(guild_id).await?.has_emoji(emoji.id) {
            return Ok(None);
        }
        Ok(Some(Arc::new(AddEmojiWidget::new(
            guild_id,
            user_id,
            emoji.clone(),
            self.settings.widget_timeout,
        ))))
    }

    /// Answer a press on an add button
    pub async fn press(
        &self,
        platform: &dyn EmojiPlatform,
        widget_id: Uuid,
        user_id: u64,
        responder: &dyn ComponentResponder,
        request_id: Uuid,
    ) -> PressOutcome {
        let Some(widget) = self.registry.get(&widget_id) else {
            info!("[{request_id}] Press on inactive widget {widget_id}");
            send_private(responder, &notice_card("❌ | This button is no longer active."), request_id)
                .await;
            return PressOutcome::Unknown;
        };
        self.trigger(platform, &widget, user_id, responder, request_id)
            .await
    }

    /// Run the add flow for one press on `widget`
    pub async fn trigger(
        &self,
        platform: &dyn EmojiPlatform,
        widget: &AddEmojiWidget,
        user_id: u64,
        responder: &dyn ComponentResponder,
        request_id: Uuid,
    ) -> PressOutcome {
        if widget.state() != WidgetState::Armed {
            send_private(responder, &already_handled_card(), request_id).await;
            return PressOutcome::AlreadyHandled;
        }

        // Ownership may have changed since the widget was offered
        let owner = match platform.guild_owner(widget.guild_id()).await {
            Ok(owner) => owner,
            Err(e) => {
                let err = EmojiError::from(e);
                error!("[{request_id}] Owner lookup failed: {err}");
                send_private(responder, &error_card(&err), request_id).await;
                return PressOutcome::Failed(err);
            }
        };
        if owner != user_id {
            info!(
                "[{request_id}] User {user_id} is not the owner of guild {}",
                widget.guild_id()
            );
            send_private(responder, &error_card(&EmojiError::PermissionDenied), request_id).await;
            return PressOutcome::NotPermitted;
        }

        if !widget.try_claim() {
            send_private(responder, &already_handled_card(), request_id).await;
            return PressOutcome::AlreadyHandled;
        }
        info!("[{request_id}] Widget {} claimed by {user_id}", widget.id());

        // The button must be disabled before any I/O of the add itself
        if let Err(e) = responder.acknowledge_button(&widget.button()).await {
            error!("[{request_id}] Failed to acknowledge press: {e}");
            widget.finish(false);
            self.registry.remove(&widget.id());
            return PressOutcome::Failed(e.into());
        }

        let result = self.add_emoji(platform, widget, request_id).await;
        widget.finish(result.is_ok());
        self.registry.remove(&widget.id());

        match result {
            Ok(mention) => {
                info!("[{request_id}] ✅ Added {mention} to guild {}", widget.guild_id());
                if let Err(e) = responder.followup_private(&success_card(&mention)).await {
                    error!("[{request_id}] Failed to report added emoji: {e}");
                }
                PressOutcome::Added(mention)
            }
            Err(err) => {
                warn!("[{request_id}] Add emoji failed: {err}");
                if let Err(e) = responder.followup_private(&error_card(&err)).await {
                    error!("[{request_id}] Failed to report add failure: {e}");
                }
                PressOutcome::Failed(err)
            }
        }
    }

    async fn add_emoji(
        &self,
        platform: &dyn EmojiPlatform,
        widget: &AddEmojiWidget,
        request_id: Uuid,
    ) -> Result<String, EmojiError> {
        let candidate = widget.candidate();

        let usage = platform
            .guild_emojis(widget.guild_id())
            .await?
            .usage(candidate.animated);
        debug!(
            "[{request_id}] {} slots: {}/{}",
            usage.category, usage.used, usage.limit
        );
        if usage.is_full() {
            return Err(EmojiError::SlotLimitExceeded {
                category: usage.category,
                used: usage.used,
                limit: usage.limit,
            });
        }

        let url = candidate.source_url();
        let image = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|e| EmojiError::DownloadFailed(e.to_string()))?;
        if !image.is_success() {
            return Err(EmojiError::DownloadFailed(format!("HTTP {}", image.status)));
        }
        debug!("[{request_id}] Downloaded {} bytes from {url}", image.bytes.len());

        platform
            .create_emoji(widget.guild_id(), &candidate.name, &image)
            .await
            .map_err(EmojiError::PlatformRejected)
    }

    /// Force-disable every live widget. See [`WidgetRegistry::shutdown`].
    pub fn shutdown(&self, platform: Arc<dyn EmojiPlatform>) -> JoinSet<()> {
        self.registry.shutdown(platform)
    }
}

fn already_handled_card() -> Card {
    notice_card("❌ | This emoji is already being handled.")
}

async fn send_private(responder: &dyn ComponentResponder, card: &Card, request_id: Uuid) {
    if let Err(e) = responder.reply_private(card).await {
        error!("[{request_id}] Failed to send private notice: {e}");
    }
}
