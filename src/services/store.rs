use crate::models::{InviteStatus, Match, Message, ProgressionState, SwipeDecision};

/// Partial update applied to a stored message
///
/// Invite status is the only mutable message field.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePatch {
    pub invite_status: Option<InviteStatus>,
}

/// Persistence collaborator for the engine
///
/// The backing technology is not the engine's concern: an in-memory map,
/// browser storage behind FFI, or a remote service all satisfy this the
/// same way. Operations are synchronous and assumed durable; storage is
/// keyed by subject and match id strings.
pub trait Store: Send + Sync {
    fn load_decisions(&self, subject_id: &str) -> Vec<SwipeDecision>;
    fn append_decision(&self, decision: &SwipeDecision);

    fn load_matches(&self, subject_id: &str) -> Vec<Match>;
    fn append_match(&self, subject_id: &str, m: &Match);

    fn load_messages(&self, match_id: &str) -> Vec<Message>;
    fn append_message(&self, match_id: &str, message: &Message);

    /// Apply a patch to one message; returns false when the id is unknown
    fn update_message(&self, match_id: &str, message_id: &str, patch: MessagePatch) -> bool;

    /// Returns None when the subject has no saved progression yet
    fn load_progression(&self, subject_id: &str) -> Option<ProgressionState>;
    fn save_progression(&self, subject_id: &str, state: &ProgressionState);
}
