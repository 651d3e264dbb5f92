//! Companion state machine and metrics.
//!
//! The companion's operating state is held in an atomic cell so the main
//! CPU can read it without taking any lock.

use portable_atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CompanionError, CompanionResult};

/// Companion watchdog operating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum CompanionState {
    /// Powered but not yet given a trigger window.
    #[default]
    Standby = 0,
    /// Window configured, output stage held in reset.
    Reset = 1,
    /// Running its startup self-diagnostics; waits for the first trigger.
    Diagnostic = 2,
    /// Supervising the main CPU's trigger cadence.
    Active = 3,
    /// Outputs forced off.
    Safe = 4,
    /// State could not be determined. Only ever reported, never stored.
    Unknown = 5,
}

impl CompanionState {
    /// Convert from raw u32 value.
    #[must_use]
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Standby),
            1 => Some(Self::Reset),
            2 => Some(Self::Diagnostic),
            3 => Some(Self::Active),
            4 => Some(Self::Safe),
            5 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Convert to raw u32 value.
    #[must_use]
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// Returns true if the companion has forced the outputs off.
    #[must_use]
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Safe)
    }

    /// Returns true if the companion expects periodic triggers.
    #[must_use]
    pub fn expects_triggers(self) -> bool {
        matches!(self, Self::Diagnostic | Self::Active)
    }

    /// Get the state as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standby => "Standby",
            Self::Reset => "Reset",
            Self::Diagnostic => "Diagnostic",
            Self::Active => "Active",
            Self::Safe => "Safe",
            Self::Unknown => "Unknown",
        }
    }
}

impl core::fmt::Display for CompanionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic holder for the companion state.
///
/// # State Transition Diagram
///
/// ```text
/// Standby ──activate()──► Reset ──diagnose()──► Diagnostic ──go_active()──► Active
///                           ▲                        │                        │
///                           │                        └──────enter_safe()──────┤
///                           │                                                 ▼
///                           └──────────────────activate()──────────────────  Safe
/// ```
#[derive(Debug)]
pub struct CompanionStateCell {
    state: AtomicU32,
    safe_entries: AtomicU32,
}

impl CompanionStateCell {
    /// Create a cell in [`CompanionState::Standby`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU32::new(CompanionState::Standby.to_raw()),
            safe_entries: AtomicU32::new(0),
        }
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> CompanionState {
        let raw = self.state.load(Ordering::Acquire);
        CompanionState::from_raw(raw).unwrap_or(CompanionState::Unknown)
    }

    fn transition(&self, from: CompanionState, to: CompanionState) -> CompanionResult<()> {
        self.state
            .compare_exchange(from.to_raw(), to.to_raw(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|current| {
                let current = CompanionState::from_raw(current).unwrap_or(CompanionState::Unknown);
                CompanionError::invalid_transition(current.as_str(), to.as_str())
            })
    }

    /// Standby or Safe to Reset.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::InvalidTransition`] from any other state.
    pub fn activate(&self) -> CompanionResult<()> {
        self.transition(CompanionState::Standby, CompanionState::Reset)
            .or_else(|_| self.transition(CompanionState::Safe, CompanionState::Reset))
    }

    /// Reset to Diagnostic.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::InvalidTransition`] from any other state.
    pub fn diagnose(&self) -> CompanionResult<()> {
        self.transition(CompanionState::Reset, CompanionState::Diagnostic)
    }

    /// Diagnostic to Active.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::InvalidTransition`] from any other state.
    pub fn go_active(&self) -> CompanionResult<()> {
        self.transition(CompanionState::Diagnostic, CompanionState::Active)
    }

    /// Any state to Safe.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::SafeStateAlreadyTriggered`] if already Safe.
    pub fn enter_safe(&self) -> CompanionResult<()> {
        let previous = self.state.swap(CompanionState::Safe.to_raw(), Ordering::AcqRel);
        if previous == CompanionState::Safe.to_raw() {
            return Err(CompanionError::SafeStateAlreadyTriggered);
        }
        self.safe_entries.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Back to Standby, as after a power cycle.
    pub fn power_cycle(&self) {
        self.state
            .store(CompanionState::Standby.to_raw(), Ordering::Release);
    }

    /// Number of times Safe was entered.
    #[must_use]
    pub fn safe_entries(&self) -> u32 {
        self.safe_entries.load(Ordering::Acquire)
    }
}

impl Default for CompanionStateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Companion trigger statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompanionMetrics {
    /// Triggers accepted inside the window.
    pub accepted_triggers: u64,
    /// Triggers that arrived before the lower bound.
    pub early_triggers: u64,
    /// Triggers that arrived after the upper bound, or deadlines missed.
    pub late_triggers: u64,
    /// Times the companion entered Safe.
    pub safe_state_count: u64,
    /// Shortest accepted trigger interval in microseconds.
    pub min_interval_us: Option<u64>,
    /// Longest accepted trigger interval in microseconds.
    pub max_interval_us: u64,
}

impl CompanionMetrics {
    /// Create zeroed metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted trigger interval.
    pub fn record_accepted(&mut self, interval_us: u64) {
        self.accepted_triggers = self.accepted_triggers.saturating_add(1);
        self.max_interval_us = self.max_interval_us.max(interval_us);
        self.min_interval_us = Some(
            self.min_interval_us
                .map_or(interval_us, |min| min.min(interval_us)),
        );
    }

    /// Record a trigger before the window opened.
    pub fn record_early(&mut self) {
        self.early_triggers = self.early_triggers.saturating_add(1);
    }

    /// Record a trigger after the window closed.
    pub fn record_late(&mut self) {
        self.late_triggers = self.late_triggers.saturating_add(1);
    }

    /// Record a Safe entry.
    pub fn record_safe_state(&mut self) {
        self.safe_state_count = self.safe_state_count.saturating_add(1);
    }

    /// Total window violations.
    #[must_use]
    pub fn violations(&self) -> u64 {
        self.early_triggers.saturating_add(self.late_triggers)
    }
}
