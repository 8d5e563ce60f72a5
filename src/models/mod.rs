pub mod domain;
pub mod events;

pub use domain::{
    level_for_xp, Gift, Icebreaker, InviteKind, InviteStatus, Match, Message, MessageKind,
    Profile, ProgressionState, Sender, SwipeAction, SwipeDecision, LEVEL_THRESHOLDS, MAX_LEVEL,
};
pub use events::{EngineEvent, EventBus};
