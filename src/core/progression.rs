use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate};

use crate::models::{level_for_xp, EngineEvent, EventBus, ProgressionState};
use crate::services::Store;

/// Process-wide XP / level / credits ledger for one subject
///
/// The only mutable state shared across components. SwipeEngine and
/// ChatSession hold an `Arc<ProgressionLedger>` and go through this API;
/// every mutation is one critical section and persists through the
/// store before the lock is released.
pub struct ProgressionLedger {
    subject_id: String,
    state: Mutex<ProgressionState>,
    store: Arc<dyn Store>,
    events: EventBus,
    daily_bonus_xp: u64,
}

impl ProgressionLedger {
    /// Load the subject's ledger from the store, or start fresh
    pub fn new(
        subject_id: impl Into<String>,
        store: Arc<dyn Store>,
        events: EventBus,
        daily_bonus_xp: u64,
    ) -> Self {
        let subject_id = subject_id.into();
        let state = store.load_progression(&subject_id).unwrap_or_default();
        Self {
            subject_id,
            state: Mutex::new(state),
            store,
            events,
            daily_bonus_xp,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, state: &ProgressionState) {
        self.store.save_progression(&self.subject_id, state);
    }

    /// Current snapshot of the ledger
    pub fn snapshot(&self) -> ProgressionState {
        self.lock().clone()
    }

    pub fn xp(&self) -> u64 {
        self.lock().xp
    }

    pub fn level(&self) -> u8 {
        self.lock().level
    }

    pub fn credits(&self) -> u32 {
        self.lock().credits
    }

    /// Award XP and recompute the level; emits LevelUp when a threshold
    /// is crossed
    pub fn add_xp(&self, amount: u64) {
        debug_assert!(amount > 0);
        let leveled_up_to = {
            let mut state = self.lock();
            state.xp += amount;
            let new_level = level_for_xp(state.xp);
            let leveled = new_level > state.level;
            state.level = new_level;
            self.persist(&state);
            leveled.then_some(new_level)
        };

        if let Some(new_level) = leveled_up_to {
            tracing::info!("Subject {} reached level {}", self.subject_id, new_level);
            self.events.publish(EngineEvent::LevelUp { new_level });
        }
    }

    pub fn add_credits(&self, amount: u32) {
        debug_assert!(amount > 0);
        let mut state = self.lock();
        state.credits += amount;
        self.persist(&state);
    }

    /// Atomic check-then-subtract; returns false (leaving the balance
    /// untouched) when credits fall short
    pub fn spend_credits(&self, amount: u32) -> bool {
        debug_assert!(amount > 0);
        let mut state = self.lock();
        if state.credits < amount {
            tracing::debug!(
                "Spend of {} rejected, balance {}",
                amount,
                state.credits
            );
            return false;
        }
        state.credits -= amount;
        self.persist(&state);
        true
    }

    /// Grant the daily login bonus at calendar-day granularity
    ///
    /// Idempotent within a day: repeated calls on the same local date do
    /// nothing. Sets the pending-notification flag once per day and
    /// emits DailyBonus (plus LevelUp if the bonus crosses a threshold).
    pub fn check_daily_login(&self) {
        self.check_daily_login_at(Local::now().date_naive());
    }

    /// Date-injected variant of [`check_daily_login`](Self::check_daily_login)
    pub fn check_daily_login_at(&self, today: NaiveDate) {
        let granted = {
            let mut state = self.lock();
            if state.last_bonus_date == Some(today) {
                return;
            }
            state.last_bonus_date = Some(today);
            state.bonus_pending_notification = true;
            state.xp += self.daily_bonus_xp;
            let new_level = level_for_xp(state.xp);
            let leveled = new_level > state.level;
            state.level = new_level;
            self.persist(&state);
            leveled.then_some(new_level)
        };

        tracing::info!(
            "Daily bonus of {} XP granted to {}",
            self.daily_bonus_xp,
            self.subject_id
        );
        self.events.publish(EngineEvent::DailyBonus {
            xp: self.daily_bonus_xp,
        });
        if let Some(new_level) = granted {
            self.events.publish(EngineEvent::LevelUp { new_level });
        }
    }

    /// Clear the daily-bonus notification flag; xp and level are untouched
    pub fn reset_bonus_notification(&self) {
        let mut state = self.lock();
        state.bonus_pending_notification = false;
        self.persist(&state);
    }

    pub fn bonus_pending_notification(&self) -> bool {
        self.lock().bonus_pending_notification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    fn ledger() -> ProgressionLedger {
        ProgressionLedger::new(
            "alice",
            Arc::new(MemoryStore::new()),
            EventBus::default(),
            50,
        )
    }

    #[test]
    fn test_add_xp_levels_up() {
        let ledger = ledger();
        ledger.add_xp(499);
        assert_eq!(ledger.level(), 1);
        ledger.add_xp(1);
        assert_eq!(ledger.level(), 2);
        assert_eq!(ledger.xp(), 500);
    }

    #[tokio::test]
    async fn test_level_up_event_emitted() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let ledger = ProgressionLedger::new("alice", store, bus, 50);

        ledger.add_xp(600);

        match rx.recv().await.unwrap() {
            EngineEvent::LevelUp { new_level } => assert_eq!(new_level, 2),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_spend_credits_never_goes_negative() {
        let ledger = ledger();
        // Fresh balance is 150; burn down to 40
        assert!(ledger.spend_credits(110));
        assert_eq!(ledger.credits(), 40);

        assert!(!ledger.spend_credits(50));
        assert_eq!(ledger.credits(), 40);
    }

    #[test]
    fn test_daily_bonus_once_per_day() {
        let ledger = ledger();
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();

        ledger.check_daily_login_at(today);
        assert_eq!(ledger.xp(), 50);
        assert!(ledger.bonus_pending_notification());

        // Same day again: no double grant
        ledger.check_daily_login_at(today);
        assert_eq!(ledger.xp(), 50);

        // Notification reset leaves xp alone
        ledger.reset_bonus_notification();
        assert!(!ledger.bonus_pending_notification());
        assert_eq!(ledger.xp(), 50);

        // Next day grants again
        ledger.check_daily_login_at(today.succ_opt().unwrap());
        assert_eq!(ledger.xp(), 100);
        assert!(ledger.bonus_pending_notification());
    }

    #[test]
    fn test_state_persists_through_store() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        {
            let ledger = ProgressionLedger::new(
                "alice",
                Arc::clone(&store),
                EventBus::default(),
                50,
            );
            ledger.add_xp(7);
            ledger.add_credits(10);
        }

        let reloaded =
            ProgressionLedger::new("alice", store, EventBus::default(), 50);
        assert_eq!(reloaded.xp(), 7);
        assert_eq!(reloaded.credits(), 160);
    }
}
