use std::sync::Arc;

use rand::Rng;

use crate::config::Settings;
use crate::core::chat::{BotDelays, ChatSession, ChatTiming};
use crate::core::{MatchPolicy, MatchRegistry, ProgressionLedger, SwipeEngine};
use crate::models::{EngineEvent, EventBus, Gift, Profile};
use crate::services::Store;
use tokio::sync::broadcast;

/// Top-level handle wiring the engine's components together
///
/// Built once per subject from [`Settings`] and a persistence
/// collaborator; the presentation layer opens swipe sessions and chats
/// through it and subscribes to the event surface.
pub struct Engine {
    subject_id: String,
    store: Arc<dyn Store>,
    events: EventBus,
    ledger: Arc<ProgressionLedger>,
    policy: MatchPolicy,
    /// Fixed seed override; None seeds every session from entropy
    seed: Option<u64>,
    timing: ChatTiming,
    gifts: Vec<Gift>,
}

impl Engine {
    pub fn new(subject_id: impl Into<String>, settings: &Settings, store: Arc<dyn Store>) -> Self {
        let subject_id = subject_id.into();
        let events = EventBus::default();
        let ledger = Arc::new(ProgressionLedger::new(
            subject_id.clone(),
            Arc::clone(&store),
            events.clone(),
            settings.progression.daily_bonus_xp,
        ));

        let policy = match settings.matching.policy.as_str() {
            "every_nth" => MatchPolicy::EveryNth {
                n: settings.matching.every_nth,
            },
            _ => MatchPolicy::Probability {
                p: settings.matching.probability,
            },
        };
        let gifts = settings
            .gifts
            .iter()
            .map(|g| Gift {
                id: g.id.clone(),
                label: g.label.clone(),
                emoji: g.emoji.clone(),
                cost: g.cost,
            })
            .collect();

        let timing = ChatTiming {
            text: BotDelays {
                typing_ms: settings.chat.text_typing_ms,
                reply_ms: settings.chat.text_reply_ms,
            },
            invite: BotDelays {
                typing_ms: settings.chat.invite_typing_ms,
                reply_ms: settings.chat.invite_reply_ms,
            },
            gift: BotDelays {
                typing_ms: settings.chat.gift_typing_ms,
                reply_ms: settings.chat.gift_reply_ms,
            },
        };

        Self {
            subject_id,
            store,
            events,
            ledger,
            policy,
            seed: settings.matching.seed,
            timing,
            gifts,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Shared progression ledger for this subject
    pub fn ledger(&self) -> Arc<ProgressionLedger> {
        Arc::clone(&self.ledger)
    }

    /// Subscribe to the engine's event surface
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// The subject's match registry
    pub fn matches(&self) -> MatchRegistry {
        MatchRegistry::new(self.subject_id.clone(), Arc::clone(&self.store))
    }

    /// Open a swipe session over the given profile source
    ///
    /// Each session gets its own seed unless the config fixes one, so
    /// consecutive sessions shuffle independently while a fixed seed
    /// stays fully reproducible.
    pub fn swipe_session(&self, profiles: Vec<Profile>) -> SwipeEngine {
        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        SwipeEngine::new(
            self.subject_id.clone(),
            profiles,
            self.policy,
            seed,
            Arc::clone(&self.store),
            Arc::clone(&self.ledger),
            self.matches(),
            self.events.clone(),
        )
    }

    /// Open the chat for a match
    pub fn chat(&self, match_id: &str) -> ChatSession {
        ChatSession::open(
            match_id,
            Arc::clone(&self.store),
            Arc::clone(&self.ledger),
            self.events.clone(),
            self.timing,
            self.gifts.clone(),
        )
    }
}
