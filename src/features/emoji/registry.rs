//! Registry of live add-emoji widgets
//!
//! Bounded, cloneable handle shared by the command handler and every widget timer. Torn
//! down once at shutdown, after which nothing new can be registered.

use dashmap::DashMap;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

use super::platform::EmojiPlatform;
use super::widget::AddEmojiWidget;

/// Default number of widgets that may be live at once
pub const DEFAULT_MAX_ACTIVE_WIDGETS: usize = 100;

#[derive(Clone)]
pub struct WidgetRegistry {
    widgets: Arc<DashMap<Uuid, Arc<AddEmojiWidget>>>,
    /// Slots taken, reserved before insertion
    reserved: Arc<AtomicUsize>,
    capacity: usize,
    closed: Arc<AtomicBool>,
}

impl WidgetRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            widgets: Arc::new(DashMap::new()),
            reserved: Arc::new(AtomicUsize::new(0)),
            capacity,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Track a widget. Returns false when the registry is full or shut down.
    pub fn register(&self, widget: Arc<AddEmojiWidget>) -> bool {
        if self.closed.load(Ordering::Acquire) {
            warn!("Widget registry is shut down, not registering {}", widget.id());
            return false;
        }
        let reserved = self
            .reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |taken| {
                (taken < self.capacity).then_some(taken + 1)
            });
        if reserved.is_err() {
            warn!(
                "Widget registry is full ({} live widgets), not registering {}",
                self.capacity,
                widget.id()
            );
            return false;
        }
        if self.widgets.insert(widget.id(), widget).is_some() {
            self.reserved.fetch_sub(1, Ordering::AcqRel);
        }
        true
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<AddEmojiWidget>> {
        self.widgets.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, id: &Uuid) -> Option<Arc<AddEmojiWidget>> {
        let (_, widget) = self.widgets.remove(id)?;
        self.reserved.fetch_sub(1, Ordering::AcqRel);
        Some(widget)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Disable every armed widget and queue a best-effort edit of its message.
    ///
    /// The returned set holds the edit tasks; callers may wait on it or drop it.
    pub fn shutdown(&self, platform: Arc<dyn EmojiPlatform>) -> JoinSet<()> {
        self.closed.store(true, Ordering::Release);

        let ids: Vec<Uuid> = self.widgets.iter().map(|entry| *entry.key()).collect();
        let mut pending = JoinSet::new();
        for id in ids {
            let Some(widget) = self.remove(&id) else {
                continue;
            };
            if widget.disable() {
                let platform = Arc::clone(&platform);
                pending.spawn(async move {
                    widget.refresh_message(platform.as_ref()).await;
                });
            }
        }

        info!("🧹 Disabled {} live add-emoji widgets", pending.len());
        pending
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ACTIVE_WIDGETS)
    }
}
