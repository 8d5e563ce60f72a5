use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::Match;
use crate::services::Store;

/// Durable record of the subject's matches
///
/// `record` is idempotent per profile id; `list` returns matches in
/// insertion order (ascending by creation time, oldest first).
pub struct MatchRegistry {
    subject_id: String,
    store: Arc<dyn Store>,
}

impl MatchRegistry {
    pub fn new(subject_id: impl Into<String>, store: Arc<dyn Store>) -> Self {
        Self {
            subject_id: subject_id.into(),
            store,
        }
    }

    /// Record a match with the given profile, returning the existing
    /// record when one is already on file
    pub fn record(&self, profile_id: &str) -> Match {
        if let Some(existing) = self
            .store
            .load_matches(&self.subject_id)
            .into_iter()
            .find(|m| m.profile_id == profile_id)
        {
            tracing::debug!(
                "Match with profile {} already recorded as {}",
                profile_id,
                existing.id
            );
            return existing;
        }

        let m = Match {
            id: format!("match-{}", Uuid::new_v4()),
            profile_id: profile_id.to_string(),
            created_at: Utc::now(),
        };
        self.store.append_match(&self.subject_id, &m);
        tracing::info!("Recorded match {} with profile {}", m.id, profile_id);
        m
    }

    /// All matches for the subject, oldest first
    pub fn list(&self) -> Vec<Match> {
        self.store.load_matches(&self.subject_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    #[test]
    fn test_record_is_idempotent() {
        let registry = MatchRegistry::new("alice", Arc::new(MemoryStore::new()));

        let first = registry.record("p1");
        let second = registry.record("p1");

        assert_eq!(first.id, second.id);
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn test_list_is_oldest_first() {
        let registry = MatchRegistry::new("alice", Arc::new(MemoryStore::new()));

        let a = registry.record("p1");
        let b = registry.record("p2");

        let listed = registry.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[1].id, b.id);
        assert!(listed[0].created_at <= listed[1].created_at);
    }
}
