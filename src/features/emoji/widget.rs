//! Add-emoji widget
//!
//! A single timed button bound to one custom emoji. The widget only tracks its lifecycle;
//! the press flow itself lives in [`super::service`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use log::{debug, info, warn};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use super::card::AddEmojiButton;
use super::platform::{EditOutcome, EmojiPlatform, MessageRef};
use super::reference::CustomEmoji;
use super::registry::WidgetRegistry;

/// Default inactivity window of a widget
pub const DEFAULT_WIDGET_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Button enabled, waiting for the owner
    Armed,
    /// Claimed by a press, add in flight
    Processing,
    Succeeded,
    Failed,
    /// Nobody pressed in time
    Expired,
    /// Force-disabled at shutdown
    Disabled,
}

impl WidgetState {
    fn as_u8(self) -> u8 {
        match self {
            WidgetState::Armed => 0,
            WidgetState::Processing => 1,
            WidgetState::Succeeded => 2,
            WidgetState::Failed => 3,
            WidgetState::Expired => 4,
            WidgetState::Disabled => 5,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => WidgetState::Armed,
            1 => WidgetState::Processing,
            2 => WidgetState::Succeeded,
            3 => WidgetState::Failed,
            4 => WidgetState::Expired,
            _ => WidgetState::Disabled,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, WidgetState::Armed | WidgetState::Processing)
    }
}

pub struct AddEmojiWidget {
    id: Uuid,
    guild_id: u64,
    owner_user_id: u64,
    candidate: CustomEmoji,
    expires_at: Instant,
    state: AtomicU8,
    message: OnceLock<MessageRef>,
    cancel_expiry: Notify,
}

impl AddEmojiWidget {
    pub fn new(guild_id: u64, owner_user_id: u64, candidate: CustomEmoji, timeout: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            guild_id,
            owner_user_id,
            candidate,
            expires_at: Instant::now() + timeout,
            state: AtomicU8::new(WidgetState::Armed.as_u8()),
            message: OnceLock::new(),
            cancel_expiry: Notify::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn guild_id(&self) -> u64 {
        self.guild_id
    }

    /// Owner at the time the widget was offered
    pub fn owner_user_id(&self) -> u64 {
        self.owner_user_id
    }

    pub fn candidate(&self) -> &CustomEmoji {
        &self.candidate
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn state(&self) -> WidgetState {
        WidgetState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn message(&self) -> Option<MessageRef> {
        self.message.get().copied()
    }

    /// Remember the message carrying the button. Only the first call has an effect.
    pub fn bind_message(&self, message: MessageRef) {
        if self.message.set(message).is_err() {
            warn!("Widget {} is already bound to a message", self.id);
        }
    }

    /// Current button; enabled only while armed
    pub fn button(&self) -> AddEmojiButton {
        AddEmojiButton::new(self.id, self.state() != WidgetState::Armed)
    }

    fn transition(&self, from: WidgetState, to: WidgetState) -> bool {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Take the one-shot. Returns false when another press, the timer, or shutdown won.
    pub fn try_claim(&self) -> bool {
        let claimed = self.transition(WidgetState::Armed, WidgetState::Processing);
        if claimed {
            self.cancel_expiry.notify_one();
        }
        claimed
    }

    /// Record the result of a claimed add
    pub fn finish(&self, succeeded: bool) {
        let to = if succeeded {
            WidgetState::Succeeded
        } else {
            WidgetState::Failed
        };
        if !self.transition(WidgetState::Processing, to) {
            warn!("Widget {} finished while {:?}", self.id, self.state());
        }
    }

    pub fn expire(&self) -> bool {
        self.transition(WidgetState::Armed, WidgetState::Expired)
    }

    pub fn disable(&self) -> bool {
        let disabled = self.transition(WidgetState::Armed, WidgetState::Disabled);
        if disabled {
            self.cancel_expiry.notify_one();
        }
        disabled
    }

    /// Push the current button state to the bound message, if any.
    ///
    /// A deleted message is not an error.
    pub async fn refresh_message(&self, platform: &dyn EmojiPlatform) {
        let Some(message) = self.message() else {
            debug!("Widget {} has no message to update", self.id);
            return;
        };
        match platform.edit_button(message, &self.button()).await {
            Ok(EditOutcome::Edited) => debug!("Widget {} message updated", self.id),
            Ok(EditOutcome::MessageMissing) => {
                debug!("Widget {} message is gone, nothing to update", self.id)
            }
            Err(e) => warn!("Failed to update message of widget {}: {e}", self.id),
        }
    }

    /// Spawn the expiry timer. It is cancelled by a successful claim or by shutdown.
    pub fn start_expiry(self: Arc<Self>, platform: Arc<dyn EmojiPlatform>, registry: WidgetRegistry) {
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(self.expires_at) => {
                    if self.expire() {
                        info!("⌛ Add-emoji widget {} expired", self.id);
                        registry.remove(&self.id);
                        self.refresh_message(platform.as_ref()).await;
                    }
                }
                _ = self.cancel_expiry.notified() => {
                    debug!("Expiry of widget {} cancelled", self.id);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> AddEmojiWidget {
        AddEmojiWidget::new(
            10,
            20,
            CustomEmoji {
                name: "blob".to_string(),
                id: 30,
                animated: false,
            },
            DEFAULT_WIDGET_TIMEOUT,
        )
    }

    #[test]
    fn test_new_widget_is_armed() {
        let w = widget();
        assert_eq!(w.state(), WidgetState::Armed);
        assert!(!w.button().disabled);
        assert!(w.message().is_none());
    }

    #[test]
    fn test_claim_is_one_shot() {
        let w = widget();
        assert!(w.try_claim());
        assert!(!w.try_claim());
        assert_eq!(w.state(), WidgetState::Processing);
        assert!(w.button().disabled);
    }

    #[test]
    fn test_claimed_widget_cannot_expire() {
        let w = widget();
        assert!(w.try_claim());
        assert!(!w.expire());
        w.finish(true);
        assert_eq!(w.state(), WidgetState::Succeeded);
        assert!(w.state().is_terminal());
    }

    #[test]
    fn test_expired_widget_cannot_be_claimed() {
        let w = widget();
        assert!(w.expire());
        assert!(!w.try_claim());
        assert!(!w.disable());
        assert_eq!(w.state(), WidgetState::Expired);
    }

    #[test]
    fn test_failed_finish() {
        let w = widget();
        assert!(w.try_claim());
        w.finish(false);
        assert_eq!(w.state(), WidgetState::Failed);
    }

    #[test]
    fn test_bind_message_once() {
        let w = widget();
        let first = MessageRef {
            channel_id: 1,
            message_id: 2,
        };
        w.bind_message(first);
        w.bind_message(MessageRef {
            channel_id: 3,
            message_id: 4,
        });
        assert_eq!(w.message(), Some(first));
    }

    #[test]
    fn test_state_roundtrip() {
        for state in [
            WidgetState::Armed,
            WidgetState::Processing,
            WidgetState::Succeeded,
            WidgetState::Failed,
            WidgetState::Expired,
            WidgetState::Disabled,
        ] {
            assert_eq!(WidgetState::from_u8(state.as_u8()), state);
        }
    }
}
