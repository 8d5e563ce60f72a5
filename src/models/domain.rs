use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Candidate profile shown in the swipe deck
///
/// Immutable once seeded; the engine never mutates a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub bio: String,
    /// Ordered image references, never empty for a seeded profile
    pub images: Vec<String>,
    pub interests: Vec<String>,
    /// Human-readable distance label, e.g. "2 km"
    pub distance: String,
    #[serde(default)]
    pub icebreaker: Option<Icebreaker>,
}

/// Optional profile prompt (question + answer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Icebreaker {
    pub question: String,
    pub answer: String,
}

/// Swipe action taken on a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Skip,
    Superlike,
}

impl SwipeAction {
    /// Likes and superlikes express interest and can trigger a match
    pub fn is_like(self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::Superlike)
    }
}

/// Append-only record of one swipe, one per (subject, target) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeDecision {
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
    pub action: SwipeAction,
    #[serde(rename = "decidedAt")]
    pub decided_at: DateTime<Utc>,
}

/// Durable record of a match with a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(rename = "profileId")]
    pub profile_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The subject (the app user)
    Me,
    /// The matched counterpart
    Counterpart,
}

/// Structured date proposal carried by an invite message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteKind {
    Coffee,
    Drinks,
    Cinema,
    Walk,
}

impl InviteKind {
    /// The phrasing the invite renders as in chat
    pub fn phrase(self) -> &'static str {
        match self {
            InviteKind::Coffee => "Let's grab a coffee?",
            InviteKind::Drinks => "How about some drinks?",
            InviteKind::Cinema => "Want to see a movie?",
            InviteKind::Walk => "Let's go for a night walk?",
        }
    }
}

/// Invite lifecycle; Pending transitions to Accepted or Declined exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

/// Message payload, discriminated by kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MessageKind {
    Text {
        content: String,
    },
    Invite {
        /// The rendered invite phrasing, see [`InviteKind::phrase`]
        content: String,
        #[serde(rename = "inviteKind")]
        invite_kind: InviteKind,
        status: InviteStatus,
    },
    Gift {
        #[serde(rename = "giftId")]
        gift_id: String,
        label: String,
        emoji: String,
        cost: u32,
    },
}

/// One entry in a match's append-only message log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "matchId")]
    pub match_id: String,
    pub sender: Sender,
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: MessageKind,
}

impl Message {
    /// Invite status, if this message is an invite
    pub fn invite_status(&self) -> Option<InviteStatus> {
        match &self.kind {
            MessageKind::Invite { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Purchasable gift definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gift {
    pub id: String,
    pub label: String,
    pub emoji: String,
    pub cost: u32,
}

/// XP thresholds for levels 1 through 4
pub const LEVEL_THRESHOLDS: [u64; 4] = [0, 500, 2000, 10_000];

/// Maximum reachable level
pub const MAX_LEVEL: u8 = 4;

/// Level as a pure function of xp: the highest threshold reached, clamped
pub fn level_for_xp(xp: u64) -> u8 {
    let mut level = 1u8;
    for (i, threshold) in LEVEL_THRESHOLDS.iter().enumerate() {
        if xp >= *threshold {
            level = (i + 1) as u8;
        }
    }
    level.min(MAX_LEVEL)
}

/// Subject-wide progression state (XP, level, credits, daily bonus)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionState {
    pub xp: u64,
    pub level: u8,
    pub credits: u32,
    #[serde(rename = "lastBonusDate")]
    pub last_bonus_date: Option<NaiveDate>,
    #[serde(rename = "bonusPendingNotification")]
    pub bonus_pending_notification: bool,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            credits: 150,
            last_bonus_date: None,
            bonus_pending_notification: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_curve() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(499), 1);
        assert_eq!(level_for_xp(500), 2);
        assert_eq!(level_for_xp(2000), 3);
        assert_eq!(level_for_xp(10_000), 4);
        assert_eq!(level_for_xp(999_999), 4);
    }

    #[test]
    fn test_level_monotonic() {
        let mut last = 0;
        for xp in (0..12_000).step_by(37) {
            let level = level_for_xp(xp);
            assert!(level >= last, "level regressed at xp {}", xp);
            assert!((1..=4).contains(&level));
            last = level;
        }
    }

    #[test]
    fn test_fresh_state() {
        let state = ProgressionState::default();
        assert_eq!(state.xp, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.credits, 150);
        assert!(!state.bonus_pending_notification);
    }

    #[test]
    fn test_message_serde_roundtrip() {
        let msg = Message {
            id: "m1".to_string(),
            match_id: "match-1".to_string(),
            sender: Sender::Me,
            sent_at: Utc::now(),
            kind: MessageKind::Invite {
                content: InviteKind::Coffee.phrase().to_string(),
                invite_kind: InviteKind::Coffee,
                status: InviteStatus::Pending,
            },
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"kind\":\"invite\""));
        assert!(json.contains("\"inviteKind\":\"coffee\""));
        assert!(json.contains("Let's grab a coffee?"));

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.invite_status(), Some(InviteStatus::Pending));
    }
}
