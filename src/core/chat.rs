use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::{EngineError, ProgressionLedger};
use crate::models::{
    EngineEvent, EventBus, Gift, InviteKind, InviteStatus, Message, MessageKind, Sender,
};
use crate::services::{MessagePatch, Store};

/// One step of a bot-response chain: wait, then act
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotDelays {
    /// Delay before the typing indicator turns on
    pub typing_ms: u64,
    /// Further delay before the counterpart reply lands
    pub reply_ms: u64,
}

/// Per-trigger bot-response timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTiming {
    pub text: BotDelays,
    pub invite: BotDelays,
    pub gift: BotDelays,
}

impl Default for ChatTiming {
    fn default() -> Self {
        // The app's historical reply cadence per trigger kind
        Self {
            text: BotDelays { typing_ms: 1000, reply_ms: 2500 },
            invite: BotDelays { typing_ms: 1000, reply_ms: 3000 },
            gift: BotDelays { typing_ms: 800, reply_ms: 2000 },
        }
    }
}

/// What kicked off a bot-response chain
enum ReplyTrigger {
    Text,
    /// Carries the id of the invite to flip Pending -> Accepted at fire time
    Invite { message_id: String },
    Gift { label: String },
}

/// Gift catalog the chat sells from
///
/// Matches the app's storefront: Rose 10, Teddy 50, Diamond 100.
pub fn default_gift_catalog() -> Vec<Gift> {
    vec![
        Gift {
            id: "rose".to_string(),
            label: "Rose".to_string(),
            emoji: "🌹".to_string(),
            cost: 10,
        },
        Gift {
            id: "bear".to_string(),
            label: "Teddy".to_string(),
            emoji: "🧸".to_string(),
            cost: 50,
        },
        Gift {
            id: "diamond".to_string(),
            label: "Diamond".to_string(),
            emoji: "💎".to_string(),
            cost: 100,
        },
    ]
}

/// Chat with one matched counterpart
///
/// Exclusively owns the message log for its match id. Public operations
/// are synchronous; the only deferred behavior is the bot-response
/// chain, which runs as a spawned task per triggering send. Chains
/// re-read the log through the store at fire time and are aborted on
/// teardown, so a closed session never sees a late write.
pub struct ChatSession {
    match_id: String,
    store: Arc<dyn Store>,
    ledger: Arc<ProgressionLedger>,
    events: EventBus,
    typing: Arc<AtomicBool>,
    timing: ChatTiming,
    gifts: Vec<Gift>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ChatSession {
    /// Open (or reopen) the chat for a match
    ///
    /// A brand-new chat gets a counterpart greeting seeded into its log.
    pub fn open(
        match_id: impl Into<String>,
        store: Arc<dyn Store>,
        ledger: Arc<ProgressionLedger>,
        events: EventBus,
        timing: ChatTiming,
        gifts: Vec<Gift>,
    ) -> Self {
        let match_id = match_id.into();
        if store.load_messages(&match_id).is_empty() {
            let greeting = Message {
                id: format!("msg-{}", Uuid::new_v4()),
                match_id: match_id.clone(),
                sender: Sender::Counterpart,
                sent_at: Utc::now(),
                kind: MessageKind::Text {
                    content: "Hey! Glad we matched. How is your day going? 😊".to_string(),
                },
            };
            store.append_message(&match_id, &greeting);
            events.publish(EngineEvent::MessageAppended {
                match_id: match_id.clone(),
                message: greeting,
            });
            tracing::debug!("Seeded greeting for new chat {}", match_id);
        }

        Self {
            match_id,
            store,
            ledger,
            events,
            typing: Arc::new(AtomicBool::new(false)),
            timing,
            gifts,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Current message log, oldest first
    pub fn messages(&self) -> Vec<Message> {
        self.store.load_messages(&self.match_id)
    }

    /// Whether the counterpart's typing indicator is on
    pub fn typing(&self) -> bool {
        self.typing.load(Ordering::SeqCst)
    }

    /// Gifts available to send from this chat
    pub fn gift_catalog(&self) -> &[Gift] {
        &self.gifts
    }

    /// Send a text message; awards +1 XP and schedules a bot reply
    pub fn send_text(&self, content: &str) -> Result<Message, EngineError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(EngineError::InvalidState(
                "cannot send an empty message".to_string(),
            ));
        }

        let message = self.append_own(MessageKind::Text {
            content: content.to_string(),
        });
        self.ledger.add_xp(1);
        self.schedule_reply(ReplyTrigger::Text, self.timing.text);
        Ok(message)
    }

    /// Send a date invite; the bot chain will accept it
    pub fn send_invite(&self, kind: InviteKind) -> Result<Message, EngineError> {
        let message = self.append_own(MessageKind::Invite {
            content: kind.phrase().to_string(),
            invite_kind: kind,
            status: InviteStatus::Pending,
        });
        self.schedule_reply(
            ReplyTrigger::Invite {
                message_id: message.id.clone(),
            },
            self.timing.invite,
        );
        Ok(message)
    }

    /// Resolve a pending invite to Accepted or Declined
    pub fn respond_invite(
        &self,
        message_id: &str,
        status: InviteStatus,
    ) -> Result<(), EngineError> {
        if status == InviteStatus::Pending {
            return Err(EngineError::InvalidTransition(
                "an invite cannot transition back to pending".to_string(),
            ));
        }

        let current = self
            .messages()
            .into_iter()
            .find(|m| m.id == message_id)
            .and_then(|m| m.invite_status())
            .ok_or_else(|| {
                EngineError::InvalidTransition(format!(
                    "no pending invite with id {}",
                    message_id
                ))
            })?;
        if current != InviteStatus::Pending {
            return Err(EngineError::InvalidTransition(format!(
                "invite {} is already {:?}",
                message_id, current
            )));
        }

        self.store.update_message(
            &self.match_id,
            message_id,
            MessagePatch {
                invite_status: Some(status),
            },
        );
        self.events.publish(EngineEvent::InviteStatusChanged {
            match_id: self.match_id.clone(),
            message_id: message_id.to_string(),
            status,
        });
        Ok(())
    }

    /// Buy and send a gift
    ///
    /// The spend happens first; when credits fall short nothing is
    /// appended and the balance is untouched.
    pub fn send_gift(&self, gift_id: &str) -> Result<Message, EngineError> {
        let gift = self
            .gifts
            .iter()
            .find(|g| g.id == gift_id)
            .cloned()
            .ok_or_else(|| {
                EngineError::InvalidState(format!("unknown gift: {}", gift_id))
            })?;

        if !self.ledger.spend_credits(gift.cost) {
            return Err(EngineError::InsufficientCredits {
                required: gift.cost,
                available: self.ledger.credits(),
            });
        }

        let message = self.append_own(MessageKind::Gift {
            gift_id: gift.id.clone(),
            label: gift.label.clone(),
            emoji: gift.emoji.clone(),
            cost: gift.cost,
        });
        self.schedule_reply(ReplyTrigger::Gift { label: gift.label }, self.timing.gift);
        Ok(message)
    }

    /// Tear the session down, cancelling every scheduled bot chain
    ///
    /// A cancelled chain writes nothing; cancellation is not an error.
    pub fn close(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.drain(..).collect()
        };
        for handle in &handles {
            handle.abort();
        }
        if self.typing.swap(false, Ordering::SeqCst) {
            self.events.publish(EngineEvent::TypingChanged {
                match_id: self.match_id.clone(),
                typing: false,
            });
        }
        tracing::debug!(
            "Chat {} closed, {} bot chains cancelled",
            self.match_id,
            handles.len()
        );
    }

    fn append_own(&self, kind: MessageKind) -> Message {
        let message = Message {
            id: format!("msg-{}", Uuid::new_v4()),
            match_id: self.match_id.clone(),
            sender: Sender::Me,
            sent_at: Utc::now(),
            kind,
        };
        self.store.append_message(&self.match_id, &message);
        self.events.publish(EngineEvent::MessageAppended {
            match_id: self.match_id.clone(),
            message: message.clone(),
        });
        message
    }

    /// Spawn one delayed typing-then-reply chain
    ///
    /// The task closes over handles, never over a log snapshot: the log
    /// is re-read through the store when the reply fires.
    fn schedule_reply(&self, trigger: ReplyTrigger, delays: BotDelays) {
        let match_id = self.match_id.clone();
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let typing = Arc::clone(&self.typing);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delays.typing_ms)).await;
            typing.store(true, Ordering::SeqCst);
            events.publish(EngineEvent::TypingChanged {
                match_id: match_id.clone(),
                typing: true,
            });

            tokio::time::sleep(Duration::from_millis(delays.reply_ms)).await;

            let content = match &trigger {
                ReplyTrigger::Text => {
                    "That sounds amazing! I was just thinking about that. 😉".to_string()
                }
                ReplyTrigger::Invite { message_id } => {
                    // Flip the originating invite in the same update as
                    // the reply; skip it if someone resolved it meanwhile
                    let still_pending = store
                        .load_messages(&match_id)
                        .iter()
                        .find(|m| &m.id == message_id)
                        .and_then(|m| m.invite_status())
                        == Some(InviteStatus::Pending);
                    if still_pending {
                        store.update_message(
                            &match_id,
                            message_id,
                            MessagePatch {
                                invite_status: Some(InviteStatus::Accepted),
                            },
                        );
                        events.publish(EngineEvent::InviteStatusChanged {
                            match_id: match_id.clone(),
                            message_id: message_id.clone(),
                            status: InviteStatus::Accepted,
                        });
                    }
                    "I'd love to! When are you free? 😊".to_string()
                }
                ReplyTrigger::Gift { label } => {
                    format!("Wow, a {}! Thank you so much! 😍", label)
                }
            };

            let reply = Message {
                id: format!("msg-{}", Uuid::new_v4()),
                match_id: match_id.clone(),
                sender: Sender::Counterpart,
                sent_at: Utc::now(),
                kind: MessageKind::Text { content },
            };
            store.append_message(&match_id, &reply);
            events.publish(EngineEvent::MessageAppended {
                match_id: match_id.clone(),
                message: reply,
            });

            typing.store(false, Ordering::SeqCst);
            events.publish(EngineEvent::TypingChanged {
                match_id,
                typing: false,
            });
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for handle in tasks.iter() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventBus;
    use crate::services::MemoryStore;

    fn session_with(store: Arc<dyn Store>) -> ChatSession {
        let events = EventBus::default();
        let ledger = Arc::new(ProgressionLedger::new(
            "alice",
            Arc::clone(&store),
            events.clone(),
            50,
        ));
        ChatSession::open(
            "match-1",
            store,
            ledger,
            events,
            ChatTiming::default(),
            default_gift_catalog(),
        )
    }

    fn session() -> ChatSession {
        session_with(Arc::new(MemoryStore::new()))
    }

    fn counterpart_count(session: &ChatSession) -> usize {
        session
            .messages()
            .iter()
            .filter(|m| m.sender == Sender::Counterpart)
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_chat_seeds_greeting() {
        let session = session();
        let log = session.messages();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sender, Sender::Counterpart);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_text_appends_then_bot_replies() {
        let session = session();
        session.send_text("hi").unwrap();

        // Immediate: greeting + own message, no reply yet
        assert_eq!(session.messages().len(), 2);
        assert_eq!(counterpart_count(&session), 1);
        assert!(!session.typing());
        assert_eq!(session.ledger.xp(), 1);

        // After D1 the typing indicator turns on
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(session.typing());

        // After D1 + D2 exactly one reply landed and typing cleared
        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert_eq!(counterpart_count(&session), 2);
        assert!(!session.typing());

        let log = session.messages();
        let reply = log.last().unwrap();
        assert_eq!(reply.sender, Sender::Counterpart);
        // The reply never precedes the message that triggered it
        assert!(reply.sent_at >= log[1].sent_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_rejected() {
        let session = session();
        assert!(matches!(
            session.send_text("   "),
            Err(EngineError::InvalidState(_))
        ));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.ledger.xp(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invite_accepted_by_bot() {
        let session = session();
        let invite = session.send_invite(InviteKind::Coffee).unwrap();
        assert_eq!(invite.invite_status(), Some(InviteStatus::Pending));

        tokio::time::sleep(Duration::from_millis(4200)).await;

        let log = session.messages();
        let stored = log.iter().find(|m| m.id == invite.id).unwrap();
        assert_eq!(stored.invite_status(), Some(InviteStatus::Accepted));
        assert_eq!(counterpart_count(&session), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invite_carries_its_phrasing() {
        let session = session();
        let invite = session.send_invite(InviteKind::Cinema).unwrap();

        match &invite.kind {
            MessageKind::Invite {
                content,
                invite_kind,
                ..
            } => {
                assert_eq!(content, InviteKind::Cinema.phrase());
                assert_eq!(*invite_kind, InviteKind::Cinema);
            }
            other => panic!("expected an invite, got {:?}", other),
        }
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_seed_publishes_message_event() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let ledger = Arc::new(ProgressionLedger::new(
            "alice",
            Arc::clone(&store),
            events.clone(),
            50,
        ));

        let session = ChatSession::open(
            "match-1",
            store,
            ledger,
            events,
            ChatTiming::default(),
            default_gift_catalog(),
        );

        // A subscriber attached before open() hears the seeded greeting
        match rx.recv().await.unwrap() {
            EngineEvent::MessageAppended { match_id, message } => {
                assert_eq!(match_id, "match-1");
                assert_eq!(message.sender, Sender::Counterpart);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_respond_invite_transitions_once() {
        let session = session();
        let invite = session.send_invite(InviteKind::Drinks).unwrap();

        session
            .respond_invite(&invite.id, InviteStatus::Declined)
            .unwrap();

        // Already resolved
        assert!(matches!(
            session.respond_invite(&invite.id, InviteStatus::Accepted),
            Err(EngineError::InvalidTransition(_))
        ));
        // Unknown message id
        assert!(matches!(
            session.respond_invite("missing", InviteStatus::Accepted),
            Err(EngineError::InvalidTransition(_))
        ));
        // Pending is not a valid target state
        assert!(matches!(
            session.respond_invite(&invite.id, InviteStatus::Pending),
            Err(EngineError::InvalidTransition(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gift_spends_credits_atomically() {
        let session = session();

        // Fresh balance 150: diamond (100) goes through
        session.send_gift("diamond").unwrap();
        assert_eq!(session.ledger.credits(), 50);

        // Second diamond exceeds the remaining 50: no spend, no message
        let log_len = session.messages().len();
        assert!(matches!(
            session.send_gift("diamond"),
            Err(EngineError::InsufficientCredits { required: 100, .. })
        ));
        assert_eq!(session.ledger.credits(), 50);
        assert_eq!(session.messages().len(), log_len);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        // Exactly one thank-you for the one gift that went through
        assert_eq!(counterpart_count(&session), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_pending_chains() {
        let session = session();
        session.send_text("hi").unwrap();

        // Let the chain reach the typing stage, then tear down
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(session.typing());
        session.close();
        assert!(!session.typing());

        tokio::time::sleep(Duration::from_millis(5000)).await;
        // The cancelled chain never wrote its reply
        assert_eq!(counterpart_count(&session), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopened_session_keeps_log() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        {
            let session = session_with(Arc::clone(&store));
            session.send_text("see you").unwrap();
            session.close();
        }

        let reopened = session_with(store);
        // Greeting + the sent message survive; no second greeting
        assert_eq!(reopened.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_messages_keep_send_order() {
        let session = session();
        session.send_text("one").unwrap();
        session.send_text("two").unwrap();
        session.send_text("three").unwrap();

        let own: Vec<String> = session
            .messages()
            .into_iter()
            .filter(|m| m.sender == Sender::Me)
            .map(|m| match m.kind {
                MessageKind::Text { content } => content,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(own, vec!["one", "two", "three"]);
    }
}
