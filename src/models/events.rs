use tokio::sync::broadcast;

use crate::models::{InviteStatus, Message, Profile};

/// Events the engine surfaces to the presentation layer
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A like triggered a match with this profile
    Matched { profile: Profile },
    /// XP crossed a level threshold
    LevelUp { new_level: u8 },
    /// The daily login bonus was granted
    DailyBonus { xp: u64 },
    /// A message was appended to a match's log
    MessageAppended { match_id: String, message: Message },
    /// The counterpart's typing indicator changed
    TypingChanged { match_id: String, typing: bool },
    /// An invite moved out of the pending state
    InviteStatusChanged {
        match_id: String,
        message_id: String,
        status: InviteStatus,
    },
}

/// Broadcast bus for [`EngineEvent`]s
///
/// Cloneable; every component holds a handle and publishes through it.
/// Publishing with no subscribers is a no-op, not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to engine events (UI side)
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Publish an event, dropping it silently when nobody listens
    pub fn publish(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
