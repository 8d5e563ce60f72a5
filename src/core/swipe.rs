use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::{EngineError, CandidatePool, MatchRegistry, ProgressionLedger};
use crate::models::{EngineEvent, EventBus, Match, Profile, SwipeAction, SwipeDecision};
use crate::services::Store;

/// When a like turns into a match
///
/// Both policies are deterministic under a fixed session seed, which is
/// what makes the match sequence reproducible in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchPolicy {
    /// Fixed probability per like, drawn from the seeded session RNG
    Probability { p: f64 },
    /// Every nth cumulative like session-wide fires a match
    EveryNth { n: u32 },
}

impl Default for MatchPolicy {
    fn default() -> Self {
        // The app's historical behavior: 30% chance per like
        MatchPolicy::Probability { p: 0.3 }
    }
}

/// Result of one swipe decision
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// The like triggered a match; the cursor holds until `advance()`
    Matched { record: Match, profile: Profile },
    NoMatch,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }
}

/// Per-session swipe state machine
///
/// Owns the cursor into the candidate deck and the decision log.
/// `decide`/`advance` take `&mut self`, so calls on one session are
/// serialized by construction and the cursor cannot race.
pub struct SwipeEngine {
    subject_id: String,
    pool: CandidatePool,
    cursor: usize,
    /// Set while a match overlay waits to be acknowledged
    pending_match: Option<String>,
    decided: HashSet<String>,
    like_count: u32,
    policy: MatchPolicy,
    rng: ChaCha8Rng,
    store: Arc<dyn Store>,
    ledger: Arc<ProgressionLedger>,
    registry: MatchRegistry,
    events: EventBus,
}

impl SwipeEngine {
    /// Start a browsing session over the given profile source
    ///
    /// Previously persisted decisions are loaded up front and excluded
    /// from the deck. The seed fixes both the shuffle order and the
    /// probabilistic match trigger.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subject_id: impl Into<String>,
        profiles: Vec<Profile>,
        policy: MatchPolicy,
        seed: u64,
        store: Arc<dyn Store>,
        ledger: Arc<ProgressionLedger>,
        registry: MatchRegistry,
        events: EventBus,
    ) -> Self {
        let subject_id = subject_id.into();
        let decided: HashSet<String> = store
            .load_decisions(&subject_id)
            .into_iter()
            .map(|d| d.target_id)
            .collect();
        let pool = CandidatePool::new(profiles, &decided, seed);
        tracing::debug!(
            "Swipe session for {}: {} candidates, policy {:?}",
            subject_id,
            pool.len(),
            policy
        );

        Self {
            subject_id,
            pool,
            cursor: 0,
            pending_match: None,
            decided,
            like_count: 0,
            policy,
            rng: ChaCha8Rng::seed_from_u64(seed),
            store,
            ledger,
            registry,
            events,
        }
    }

    /// The candidate currently under the cursor, if any
    pub fn current(&self) -> Option<&Profile> {
        self.pool.get(self.cursor)
    }

    /// True once the cursor has consumed the whole deck
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.pool.len()
    }

    /// Cumulative likes this session (drives the EveryNth policy)
    pub fn like_count(&self) -> u32 {
        self.like_count
    }

    /// Candidates left in the deck, including the current one
    pub fn remaining(&self) -> usize {
        self.pool.len().saturating_sub(self.cursor)
    }

    /// Decide on the current candidate
    ///
    /// Likes and superlikes award +1 XP synchronously. On no match the
    /// cursor auto-advances; on a match it holds so the UI can show the
    /// overlay, and `advance()` must be called to move on.
    pub fn decide(&mut self, action: SwipeAction) -> Result<MatchOutcome, EngineError> {
        if self.pending_match.is_some() {
            return Err(EngineError::InvalidState(
                "previous match outcome not yet acknowledged".to_string(),
            ));
        }
        let profile = self.pool.get(self.cursor).ok_or(EngineError::Exhausted)?.clone();
        if self.decided.contains(&profile.id) {
            return Err(EngineError::DuplicateDecision {
                target_id: profile.id,
            });
        }

        let decision = SwipeDecision {
            subject_id: self.subject_id.clone(),
            target_id: profile.id.clone(),
            action,
            decided_at: Utc::now(),
        };
        self.store.append_decision(&decision);
        self.decided.insert(profile.id.clone());
        tracing::debug!("{} swiped {:?} on {}", self.subject_id, action, profile.id);

        if action.is_like() {
            self.ledger.add_xp(1);
            self.like_count += 1;

            if self.trigger_fires() {
                let record = self.registry.record(&profile.id);
                self.pending_match = Some(profile.id.clone());
                self.events.publish(EngineEvent::Matched {
                    profile: profile.clone(),
                });
                return Ok(MatchOutcome::Matched { record, profile });
            }
        }

        self.cursor += 1;
        Ok(MatchOutcome::NoMatch)
    }

    /// Acknowledge a pending match and move the cursor past it
    ///
    /// Fails with InvalidState when no match outcome is pending.
    pub fn advance(&mut self) -> Result<(), EngineError> {
        if self.pending_match.take().is_none() {
            return Err(EngineError::InvalidState(
                "advance() called with no pending match".to_string(),
            ));
        }
        self.cursor += 1;
        Ok(())
    }

    /// Rewind the session: cursor to 0, session counters cleared, deck
    /// reshuffled
    ///
    /// Persisted decisions survive and keep already-decided profiles out
    /// of the refilled deck.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.pending_match = None;
        self.like_count = 0;
        self.decided = self
            .store
            .load_decisions(&self.subject_id)
            .into_iter()
            .map(|d| d.target_id)
            .collect();
        self.pool.refill(&self.decided);
        tracing::debug!(
            "Swipe session for {} reset, {} candidates remain",
            self.subject_id,
            self.pool.len()
        );
    }

    fn trigger_fires(&mut self) -> bool {
        match self.policy {
            MatchPolicy::Probability { p } => self.rng.gen::<f64>() < p,
            MatchPolicy::EveryNth { n } => n > 0 && self.like_count % n == 0,
        }
    }
}
