//! Companion watchdog trait definition.

use ecu_safety_codes::Timestamp;

use crate::error::CompanionResult;
use crate::state::{CompanionMetrics, CompanionState};
use crate::window::TriggerWindow;

/// Outcome of a single trigger as judged by the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerVerdict {
    /// First trigger after diagnostics; opens the periodic window.
    Opened,
    /// Interval inside the window.
    Accepted {
        /// Microseconds since the previous trigger.
        elapsed_us: u64,
    },
    /// Interval shorter than the lower bound.
    TooEarly {
        /// Microseconds since the previous trigger.
        elapsed_us: u64,
    },
    /// Interval longer than the upper bound.
    TooLate {
        /// Microseconds since the previous trigger.
        elapsed_us: u64,
    },
}

impl TriggerVerdict {
    /// Returns true if the trigger broke the window.
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::TooEarly { .. } | Self::TooLate { .. })
    }

    /// Measured interval, if there was a previous trigger.
    #[must_use]
    pub fn elapsed_us(&self) -> Option<u64> {
        match self {
            Self::Opened => None,
            Self::Accepted { elapsed_us }
            | Self::TooEarly { elapsed_us }
            | Self::TooLate { elapsed_us } => Some(*elapsed_us),
        }
    }
}

/// The supervisory core that cross-checks the main CPU.
///
/// A window violation, a missed deadline, or an explicit request puts the
/// companion into [`CompanionState::Safe`], where it holds every output off.
/// Leaving Safe requires a fresh [`activate`](Self::activate).
///
/// # Real-Time Safety
///
/// [`trigger`](Self::trigger), [`check_deadline`](Self::check_deadline) and
/// [`state`](Self::state) are called from the main CPU's cyclic task and
/// must not allocate or block.
pub trait WatchdogCompanion: Send + Sync {
    /// Load a trigger window and move Standby or Safe to Reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the companion is Diagnostic or Active.
    fn activate(&mut self, window: TriggerWindow) -> CompanionResult<()>;

    /// Start the companion's self-diagnostics (Reset to Diagnostic).
    ///
    /// # Errors
    ///
    /// Returns an error if the companion is not in Reset.
    fn begin_diagnostic(&mut self) -> CompanionResult<()>;

    /// Deliver a trigger at `now`.
    ///
    /// The first trigger in Diagnostic opens the window and moves the
    /// companion to Active. Later triggers are judged against the window;
    /// a violation moves the companion to Safe and is still returned as a
    /// verdict.
    ///
    /// # Errors
    ///
    /// Returns an error if the companion is not expecting triggers.
    fn trigger(&mut self, now: Timestamp) -> CompanionResult<TriggerVerdict>;

    /// Check whether the next trigger is overdue at `now`.
    ///
    /// Returns the elapsed time since the last trigger if the upper bound
    /// has passed. The companion is then in Safe.
    fn check_deadline(&mut self, now: Timestamp) -> Option<u64>;

    /// Force the outputs off.
    ///
    /// # Errors
    ///
    /// Returns an error if the companion is already Safe.
    fn trigger_safe_state(&mut self) -> CompanionResult<()>;

    /// Ask the companion for its state over the inter-core link.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CompanionError::StatusUnavailable`] if the link fails.
    fn query_state(&self) -> CompanionResult<CompanionState>;

    /// Last known state without a link round trip.
    fn state(&self) -> CompanionState;

    /// The loaded trigger window.
    fn window(&self) -> Option<TriggerWindow>;

    /// Trigger statistics.
    fn metrics(&self) -> CompanionMetrics;

    /// Return to Standby with no window loaded, as after a power cycle.
    fn power_cycle(&mut self);

    /// Returns true if the companion currently lets outputs drive.
    fn outputs_enabled(&self) -> bool {
        matches!(
            self.state(),
            CompanionState::Diagnostic | CompanionState::Active
        )
    }
}
