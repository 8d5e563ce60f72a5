use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{Match, Message, MessageKind, ProgressionState, SwipeDecision};
use crate::services::store::{MessagePatch, Store};

/// In-memory [`Store`] implementation
///
/// Reference backend for tests and the demo binary. All maps live under
/// one mutex; every access is a short critical section.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    decisions: HashMap<String, Vec<SwipeDecision>>,
    matches: HashMap<String, Vec<Match>>,
    messages: HashMap<String, Vec<Message>>,
    progression: HashMap<String, ProgressionState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Recover the data on poisoning; the store holds plain maps
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn load_decisions(&self, subject_id: &str) -> Vec<SwipeDecision> {
        self.lock()
            .decisions
            .get(subject_id)
            .cloned()
            .unwrap_or_default()
    }

    fn append_decision(&self, decision: &SwipeDecision) {
        self.lock()
            .decisions
            .entry(decision.subject_id.clone())
            .or_default()
            .push(decision.clone());
        tracing::trace!(
            "Stored decision: {} -> {} ({:?})",
            decision.subject_id,
            decision.target_id,
            decision.action
        );
    }

    fn load_matches(&self, subject_id: &str) -> Vec<Match> {
        self.lock()
            .matches
            .get(subject_id)
            .cloned()
            .unwrap_or_default()
    }

    fn append_match(&self, subject_id: &str, m: &Match) {
        self.lock()
            .matches
            .entry(subject_id.to_string())
            .or_default()
            .push(m.clone());
        tracing::trace!("Stored match {} for subject {}", m.id, subject_id);
    }

    fn load_messages(&self, match_id: &str) -> Vec<Message> {
        self.lock()
            .messages
            .get(match_id)
            .cloned()
            .unwrap_or_default()
    }

    fn append_message(&self, match_id: &str, message: &Message) {
        self.lock()
            .messages
            .entry(match_id.to_string())
            .or_default()
            .push(message.clone());
    }

    fn update_message(&self, match_id: &str, message_id: &str, patch: MessagePatch) -> bool {
        let mut inner = self.lock();
        let Some(log) = inner.messages.get_mut(match_id) else {
            return false;
        };
        let Some(message) = log.iter_mut().find(|m| m.id == message_id) else {
            return false;
        };

        if let Some(new_status) = patch.invite_status {
            if let MessageKind::Invite { status, .. } = &mut message.kind {
                *status = new_status;
            } else {
                return false;
            }
        }
        true
    }

    fn load_progression(&self, subject_id: &str) -> Option<ProgressionState> {
        self.lock().progression.get(subject_id).cloned()
    }

    fn save_progression(&self, subject_id: &str, state: &ProgressionState) {
        self.lock()
            .progression
            .insert(subject_id.to_string(), state.clone());
    }
}
