//! Recording test doubles for the platform traits

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::time::Duration;

use super::card::{AddEmojiButton, Card};
use super::platform::{
    CommandResponder, ComponentResponder, EditOutcome, EmojiPlatform, FetchedImage, GuildEmoji,
    GuildEmojiSnapshot, ImageFetcher, MessageRef,
};

/// Ordered log of calls, shared between doubles
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    pub fn contains(&self, event: &str) -> bool {
        self.position(event).is_some()
    }
}

pub struct MockPlatform {
    pub log: EventLog,
    pub snapshot: Mutex<GuildEmojiSnapshot>,
    pub create_result: Mutex<std::result::Result<String, String>>,
    pub edit_outcome: Mutex<EditOutcome>,
    pub fail_guild_lookup: Mutex<bool>,
    pub create_calls: AtomicUsize,
    pub edits: Mutex<Vec<(MessageRef, AddEmojiButton)>>,
}

impl MockPlatform {
    pub fn new(owner_id: u64) -> Self {
        Self::with_log(owner_id, EventLog::default())
    }

    pub fn with_log(owner_id: u64, log: EventLog) -> Self {
        Self {
            log,
            snapshot: Mutex::new(GuildEmojiSnapshot {
                owner_id,
                emoji_limit: 50,
                emojis: Vec::new(),
            }),
            create_result: Mutex::new(Ok("<:blob:999>".to_string())),
            edit_outcome: Mutex::new(EditOutcome::Edited),
            fail_guild_lookup: Mutex::new(false),
            create_calls: AtomicUsize::new(0),
            edits: Mutex::new(Vec::new()),
        }
    }

    /// Fill a category with `count` emojis
    pub fn fill(&self, animated: bool, count: usize) {
        let mut snapshot = self.snapshot.lock().unwrap();
        let base = 10_000 + snapshot.emojis.len() as u64;
        for i in 0..count as u64 {
            snapshot.emojis.push(GuildEmoji {
                id: base + i,
                animated,
            });
        }
    }

    pub fn add_emoji(&self, id: u64, animated: bool) {
        self.snapshot
            .lock()
            .unwrap()
            .emojis
            .push(GuildEmoji { id, animated });
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn edits(&self) -> Vec<(MessageRef, AddEmojiButton)> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmojiPlatform for MockPlatform {
    async fn guild_owner(&self, _guild_id: u64) -> Result<u64> {
        self.log.push("owner");
        // Give concurrent presses a chance to interleave
        tokio::task::yield_now().await;
        Ok(self.snapshot.lock().unwrap().owner_id)
    }

    async fn guild_emojis(&self, _guild_id: u64) -> Result<GuildEmojiSnapshot> {
        self.log.push("emojis");
        if *self.fail_guild_lookup.lock().unwrap() {
            return Err(anyhow!("guild unavailable"));
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn create_emoji(
        &self,
        _guild_id: u64,
        name: &str,
        _image: &FetchedImage,
    ) -> std::result::Result<String, String> {
        self.log.push(format!("create:{name}"));
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_result.lock().unwrap().clone()
    }

    async fn edit_button(&self, message: MessageRef, button: &AddEmojiButton) -> Result<EditOutcome> {
        self.log.push(format!("edit:{}", button.disabled));
        self.edits.lock().unwrap().push((message, button.clone()));
        Ok(*self.edit_outcome.lock().unwrap())
    }
}

pub struct MockFetcher {
    pub log: EventLog,
    pub status: u16,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            status: 200,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedImage> {
        self.log.push("fetch");
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(FetchedImage {
            status: self.status,
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        })
    }
}

/// Responder for both commands and button presses
pub struct RecordingResponder {
    pub log: EventLog,
    pub message: MessageRef,
    pub cards: Mutex<Vec<(String, Card)>>,
    pub followup_button: Mutex<Option<AddEmojiButton>>,
    followup_gate: Option<Arc<Notify>>,
}

impl RecordingResponder {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            message: MessageRef {
                channel_id: 500,
                message_id: 600,
            },
            cards: Mutex::new(Vec::new()),
            followup_button: Mutex::new(None),
            followup_gate: None,
        }
    }

    /// Hold public follow-ups until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.followup_gate = Some(gate);
        self
    }

    fn record(&self, kind: &str, card: &Card) {
        self.log.push(kind);
        self.cards
            .lock()
            .unwrap()
            .push((kind.to_string(), card.clone()));
    }

    pub fn cards(&self) -> Vec<(String, Card)> {
        self.cards.lock().unwrap().clone()
    }

    /// Description of the last card sent
    pub fn last_description(&self) -> Option<String> {
        self.cards()
            .last()
            .and_then(|(_, card)| card.description.clone())
    }
}

#[async_trait]
impl CommandResponder for RecordingResponder {
    async fn defer(&self) -> Result<()> {
        self.log.push("defer");
        Ok(())
    }

    async fn reply_private(&self, card: &Card) -> Result<()> {
        self.record("reply_private", card);
        Ok(())
    }

    async fn followup(&self, card: &Card, button: Option<&AddEmojiButton>) -> Result<MessageRef> {
        if let Some(gate) = &self.followup_gate {
            gate.notified().await;
        }
        self.record("followup", card);
        *self.followup_button.lock().unwrap() = button.cloned();
        Ok(self.message)
    }

    async fn followup_private(&self, card: &Card) -> Result<()> {
        self.record("followup_private", card);
        Ok(())
    }

    async fn withdraw_deferral(&self) -> Result<()> {
        self.log.push("withdraw");
        Ok(())
    }
}

#[async_trait]
impl ComponentResponder for RecordingResponder {
    async fn reply_private(&self, card: &Card) -> Result<()> {
        self.record("reply_private", card);
        Ok(())
    }

    async fn acknowledge_button(&self, button: &AddEmojiButton) -> Result<()> {
        self.log.push(format!("ack:{}", button.disabled));
        Ok(())
    }

    async fn followup_private(&self, card: &Card) -> Result<()> {
        self.record("followup_private", card);
        Ok(())
    }
}
