use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::models::Profile;

/// Shuffled, filterable deck of candidate profiles
///
/// The shuffle RNG is seeded per session so index-based access stays
/// valid throughout one browsing session and test runs reproduce the
/// same order. An empty deck is a normal terminal condition, never an
/// error.
pub struct CandidatePool {
    source: Vec<Profile>,
    deck: Vec<Profile>,
    rng: ChaCha8Rng,
}

impl CandidatePool {
    /// Build a deck from the full profile source, excluding profiles the
    /// subject has already decided on
    pub fn new(source: Vec<Profile>, exclude: &HashSet<String>, seed: u64) -> Self {
        let mut pool = Self {
            source,
            deck: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        pool.refill(exclude);
        pool
    }

    /// Rebuild and reshuffle the deck ("reset deck")
    ///
    /// The session RNG keeps advancing, so consecutive refills produce
    /// different but still seed-reproducible orders.
    pub fn refill(&mut self, exclude: &HashSet<String>) {
        self.deck = self
            .source
            .iter()
            .filter(|p| !exclude.contains(&p.id))
            .cloned()
            .collect();
        self.deck.shuffle(&mut self.rng);
        tracing::debug!(
            "Deck refilled: {} of {} candidates remain",
            self.deck.len(),
            self.source.len()
        );
    }

    /// Candidate at the given cursor position, if any
    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.deck.get(index)
    }

    /// Find a candidate by id anywhere in the source set
    pub fn find(&self, profile_id: &str) -> Option<&Profile> {
        self.source.iter().find(|p| p.id == profile_id)
    }

    pub fn len(&self) -> usize {
        self.deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }
}
