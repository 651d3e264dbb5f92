//! Watchdog reset budget and retained state.
//!
//! The reset counter, the permanent-safe latch and the last fatal record
//! live in a [`RetainedStore`], the hosted stand-in for the shared RAM
//! region that survives a watchdog reset but not a power cycle.

use std::sync::Arc;

use ecu_safety_codes::DiagErrorRecord;
use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State that survives a watchdog reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RetainedState {
    /// Watchdog resets consumed.
    pub reset_count: u8,
    /// Set once the budget is exhausted.
    pub permanent_safe: bool,
    /// The fatal record that last entered the safe state.
    pub last_fatal: Option<DiagErrorRecord>,
}

/// Storage for [`RetainedState`].
pub trait RetainedStore: Send + Sync {
    /// Read the retained state.
    fn load(&self) -> RetainedState;

    /// Persist the retained state.
    fn store(&self, state: &RetainedState);

    /// External clear, as done by a service tool.
    fn clear(&self) {
        self.store(&RetainedState::default());
    }
}

/// In-memory retained store. Clones share the same region.
#[derive(Debug, Clone, Default)]
pub struct SharedRamStore {
    region: Arc<Mutex<RetainedState>>,
}

impl SharedRamStore {
    /// Fresh region, as after a power cycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RetainedStore for SharedRamStore {
    fn load(&self) -> RetainedState {
        *self.region.lock()
    }

    fn store(&self, state: &RetainedState) {
        *self.region.lock() = *state;
    }
}

/// Decision taken for a fatal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    /// A watchdog reset is permitted; the counter now reads `reset_count`.
    Permitted {
        /// Resets consumed including this one.
        reset_count: u8,
    },
    /// The budget ran out with this event; the latch is now set.
    Exhausted {
        /// Resets consumed.
        reset_count: u8,
    },
    /// The latch was already set.
    Latched,
}

/// Counts watchdog resets against the configured ceiling.
#[derive(Debug)]
pub struct ResetBudgetManager<S> {
    store: S,
    ceiling: u8,
}

impl<S: RetainedStore> ResetBudgetManager<S> {
    /// Manager over `store` with a ceiling of zero.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store, ceiling: 0 }
    }

    /// Set the number of resets permitted.
    pub fn set_ceiling(&mut self, ceiling: u8) {
        self.ceiling = ceiling;
    }

    /// Number of resets permitted.
    #[must_use]
    pub fn ceiling(&self) -> u8 {
        self.ceiling
    }

    /// Current retained state.
    #[must_use]
    pub fn retained(&self) -> RetainedState {
        self.store.load()
    }

    /// Returns true if the permanent-safe latch is set.
    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.store.load().permanent_safe
    }

    /// Keep `record` as the last fatal record without touching the counter
    /// or the latch.
    pub fn note_fatal(&mut self, record: DiagErrorRecord) {
        let mut state = self.store.load();
        state.last_fatal = Some(record);
        self.store.store(&state);
    }

    /// Account for a fatal event that entered the safe state.
    ///
    /// The retained state is persisted before this returns.
    pub fn on_fatal(&mut self, record: DiagErrorRecord) -> ResetDecision {
        let mut state = self.store.load();
        state.last_fatal = Some(record);

        let decision = if state.permanent_safe {
            ResetDecision::Latched
        } else if state.reset_count < self.ceiling {
            state.reset_count = state.reset_count.saturating_add(1);
            ResetDecision::Permitted {
                reset_count: state.reset_count,
            }
        } else {
            state.permanent_safe = true;
            ResetDecision::Exhausted {
                reset_count: state.reset_count,
            }
        };

        self.store.store(&state);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecu_safety_codes::{DeviceId, ErrorCode, Timestamp};

    fn fatal() -> DiagErrorRecord {
        DiagErrorRecord::new(ErrorCode::CanBusOff, DeviceId::Can(0), 0, Timestamp::ZERO)
    }

    #[test]
    fn test_budget_of_three() {
        let store = SharedRamStore::new();
        let mut budget = ResetBudgetManager::new(store.clone());
        budget.set_ceiling(3);

        for expected in 1..=3 {
            assert_eq!(
                budget.on_fatal(fatal()),
                ResetDecision::Permitted {
                    reset_count: expected
                }
            );
        }
        assert_eq!(
            budget.on_fatal(fatal()),
            ResetDecision::Exhausted { reset_count: 3 }
        );
        assert_eq!(budget.on_fatal(fatal()), ResetDecision::Latched);

        let retained = store.load();
        assert!(retained.permanent_safe);
        assert_eq!(retained.reset_count, 3);
        assert_eq!(retained.last_fatal, Some(fatal()));
    }

    #[test]
    fn test_zero_ceiling_latches_first_fatal() {
        let mut budget = ResetBudgetManager::new(SharedRamStore::new());
        assert_eq!(
            budget.on_fatal(fatal()),
            ResetDecision::Exhausted { reset_count: 0 }
        );
        assert!(budget.is_latched());
    }

    #[test]
    fn test_external_clear() {
        let store = SharedRamStore::new();
        let mut budget = ResetBudgetManager::new(store.clone());
        assert_eq!(
            budget.on_fatal(fatal()),
            ResetDecision::Exhausted { reset_count: 0 }
        );
        store.clear();
        assert!(!budget.is_latched());
        assert_eq!(budget.retained(), RetainedState::default());
    }

    #[test]
    fn test_note_fatal_leaves_budget() {
        let store = SharedRamStore::new();
        let mut budget = ResetBudgetManager::new(store.clone());
        budget.note_fatal(fatal());
        assert_eq!(
            store.load(),
            RetainedState {
                reset_count: 0,
                permanent_safe: false,
                last_fatal: Some(fatal()),
            }
        );
    }

    #[test]
    fn test_state_survives_new_manager() {
        let store = SharedRamStore::new();
        let mut first = ResetBudgetManager::new(store.clone());
        first.set_ceiling(2);
        assert!(matches!(first.on_fatal(fatal()), ResetDecision::Permitted { .. }));

        let mut second = ResetBudgetManager::new(store);
        second.set_ceiling(2);
        assert_eq!(
            second.on_fatal(fatal()),
            ResetDecision::Permitted { reset_count: 2 }
        );
    }
}
