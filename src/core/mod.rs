pub mod chat;
pub mod deck;
pub mod progression;
pub mod registry;
pub mod swipe;

use thiserror::Error;

pub use chat::ChatSession;
pub use deck::CandidatePool;
pub use progression::ProgressionLedger;
pub use registry::MatchRegistry;
pub use swipe::{MatchOutcome, MatchPolicy, SwipeEngine};

/// Errors surfaced by the engine's core operations
///
/// Every variant maps to one user-visible failure in the presentation
/// layer; none of these should ever crash the process.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The swipe deck has no candidates left
    #[error("No more candidates in the deck")]
    Exhausted,

    /// An operation was called out of sequence
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An invite status change from a non-pending state
    #[error("Invalid invite transition: {0}")]
    InvalidTransition(String),

    /// A spend exceeded the current credit balance
    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: u32, available: u32 },

    /// The same (subject, target) pair was swiped twice
    #[error("Already decided on profile {target_id}")]
    DuplicateDecision { target_id: String },
}
