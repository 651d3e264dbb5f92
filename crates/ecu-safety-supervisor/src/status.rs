//! Status snapshot and supervisor counters.

use ecu_safety_codes::DiagErrorRecord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::{DiagState, WatchdogState};

/// Snapshot returned by [`crate::Supervisor::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusReport {
    /// Main CPU diagnostic state.
    pub diag_state: DiagState,
    /// Companion state as last read, `Unknown` if the read failed.
    pub watchdog_state: WatchdogState,
    /// Most recent fault attributed to the main CPU side.
    pub diag_error: Option<DiagErrorRecord>,
    /// Most recent fault attributed to the companion.
    pub watchdog_error: Option<DiagErrorRecord>,
    /// Watchdog resets consumed since the last power cycle.
    pub reset_count: u8,
}

impl StatusReport {
    /// Returns true if the unit is in the safe state.
    #[must_use]
    pub fn is_safe_state(&self) -> bool {
        self.diag_state == DiagState::Safe
    }

    /// The fatal record that caused the safe state, if any.
    #[must_use]
    pub fn fatal_error(&self) -> Option<DiagErrorRecord> {
        [self.watchdog_error, self.diag_error]
            .into_iter()
            .flatten()
            .find(DiagErrorRecord::is_fatal)
    }
}

/// Supervisor counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SupervisorMetrics {
    /// Reports received from drivers, including clears.
    pub faults_reported: u64,
    /// Temporary faults promoted after the glitch time.
    pub faults_promoted: u64,
    /// Temporary faults cleared before promotion.
    pub faults_discarded: u64,
    /// Fatal faults handled, including those raised in the safe state.
    pub fatal_faults: u64,
    /// Error handler invocations.
    pub errors_dispatched: u64,
    /// Notify handler invocations.
    pub notifications_dispatched: u64,
    /// Handler calls dropped on a full queue.
    pub dispatches_dropped: u64,
    /// Triggers accepted inside the window.
    pub triggers_accepted: u64,
    /// Completed watchdog resets.
    pub restarts: u64,
}

impl SupervisorMetrics {
    pub(crate) fn record_report(&mut self) {
        self.faults_reported = self.faults_reported.saturating_add(1);
    }

    pub(crate) fn record_promoted(&mut self) {
        self.faults_promoted = self.faults_promoted.saturating_add(1);
    }

    pub(crate) fn record_discarded(&mut self) {
        self.faults_discarded = self.faults_discarded.saturating_add(1);
    }

    pub(crate) fn record_fatal(&mut self) {
        self.fatal_faults = self.fatal_faults.saturating_add(1);
    }

    pub(crate) fn record_error_dispatch(&mut self) {
        self.errors_dispatched = self.errors_dispatched.saturating_add(1);
    }

    pub(crate) fn record_notify_dispatch(&mut self) {
        self.notifications_dispatched = self.notifications_dispatched.saturating_add(1);
    }

    pub(crate) fn record_dropped(&mut self) {
        self.dispatches_dropped = self.dispatches_dropped.saturating_add(1);
    }

    pub(crate) fn record_trigger(&mut self) {
        self.triggers_accepted = self.triggers_accepted.saturating_add(1);
    }

    pub(crate) fn record_restart(&mut self) {
        self.restarts = self.restarts.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecu_safety_codes::{DeviceId, ErrorCode, Timestamp};

    #[test]
    fn test_fatal_error_prefers_watchdog_slot() {
        let diag = DiagErrorRecord::new(ErrorCode::CanBusOff, DeviceId::Can(0), 0, Timestamp::ZERO);
        let watchdog = DiagErrorRecord::new(
            ErrorCode::WatchdogTriggerFailure,
            DeviceId::Watchdog,
            12_000,
            Timestamp::ZERO,
        );
        let report = StatusReport {
            diag_state: DiagState::Safe,
            watchdog_state: WatchdogState::Safe,
            diag_error: Some(diag),
            watchdog_error: Some(watchdog),
            reset_count: 0,
        };
        assert!(report.is_safe_state());
        assert_eq!(report.fatal_error(), Some(watchdog));
    }

    #[test]
    fn test_non_fatal_is_not_reported_as_fatal() {
        let report = StatusReport {
            diag_state: DiagState::Main,
            watchdog_state: WatchdogState::Active,
            diag_error: Some(DiagErrorRecord::new(
                ErrorCode::AdcRangeCheck,
                DeviceId::Adc(0),
                0,
                Timestamp::ZERO,
            )),
            watchdog_error: None,
            reset_count: 0,
        };
        assert_eq!(report.fatal_error(), None);
    }
}
