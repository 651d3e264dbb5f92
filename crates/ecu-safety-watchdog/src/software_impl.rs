//! Software companion implementation.
//!
//! This module provides `SoftwareCompanion`, a hosted model of the companion
//! core for tests and hardware-free environments. Time is supplied by the
//! caller with every trigger, so the model is fully deterministic.

use ecu_safety_codes::Timestamp;
use portable_atomic::{AtomicBool, Ordering};

use crate::companion::{TriggerVerdict, WatchdogCompanion};
use crate::error::{CompanionError, CompanionResult};
use crate::state::{CompanionMetrics, CompanionState, CompanionStateCell};
use crate::window::TriggerWindow;

/// Software model of the companion watchdog core.
///
/// # WCET Bounds
///
/// - `trigger()`: < 100ns
/// - `check_deadline()`: < 100ns
/// - `state()`: < 50ns
///
/// # Example
///
/// ```rust
/// use ecu_safety_watchdog::prelude::*;
///
/// let window = TriggerWindow::new(10_000, WindowSize::Percent25).expect("valid window");
/// let mut companion = SoftwareCompanion::new();
/// companion.activate(window).expect("activate");
/// companion.begin_diagnostic().expect("diagnostic");
/// companion.trigger(Timestamp::from_micros(0)).expect("trigger");
///
/// // Too early: the companion drops to Safe.
/// let verdict = companion.trigger(Timestamp::from_micros(5_000)).expect("trigger");
/// assert!(verdict.is_violation());
/// assert_eq!(companion.state(), CompanionState::Safe);
/// ```
#[derive(Debug, Default)]
pub struct SoftwareCompanion {
    state: CompanionStateCell,
    window: Option<TriggerWindow>,
    last_trigger: Option<Timestamp>,
    metrics: CompanionMetrics,
    link_fault: AtomicBool,
}

impl SoftwareCompanion {
    /// Create a companion in Standby.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a broken inter-core link.
    ///
    /// While set, [`WatchdogCompanion::query_state`] fails.
    pub fn set_link_fault(&self, faulty: bool) {
        self.link_fault.store(faulty, Ordering::Release);
    }

    /// Time of the last delivered trigger.
    #[must_use]
    pub fn last_trigger(&self) -> Option<Timestamp> {
        self.last_trigger
    }

    fn enter_safe(&mut self) {
        if self.state.enter_safe().is_ok() {
            self.metrics.record_safe_state();
        }
        self.last_trigger = None;
    }
}

impl WatchdogCompanion for SoftwareCompanion {
    fn activate(&mut self, window: TriggerWindow) -> CompanionResult<()> {
        self.state.activate()?;
        self.window = Some(window);
        self.last_trigger = None;
        Ok(())
    }

    fn begin_diagnostic(&mut self) -> CompanionResult<()> {
        self.state.diagnose()
    }

    fn trigger(&mut self, now: Timestamp) -> CompanionResult<TriggerVerdict> {
        let window = self.window.ok_or(CompanionError::NotActivated)?;

        match self.state.get() {
            CompanionState::Diagnostic => {
                self.state.go_active()?;
                self.last_trigger = Some(now);
                Ok(TriggerVerdict::Opened)
            }
            CompanionState::Active => {
                let elapsed_us = self
                    .last_trigger
                    .map_or(0, |last| now.micros_since(last));
                let verdict = window.check(elapsed_us);
                match verdict {
                    TriggerVerdict::Accepted { elapsed_us } => {
                        self.metrics.record_accepted(elapsed_us);
                        self.last_trigger = Some(now);
                    }
                    TriggerVerdict::TooEarly { .. } => {
                        self.metrics.record_early();
                        self.enter_safe();
                    }
                    TriggerVerdict::TooLate { .. } => {
                        self.metrics.record_late();
                        self.enter_safe();
                    }
                    TriggerVerdict::Opened => {}
                }
                Ok(verdict)
            }
            CompanionState::Safe => Err(CompanionError::SafeStateAlreadyTriggered),
            CompanionState::Standby => Err(CompanionError::NotActivated),
            other => Err(CompanionError::invalid_transition(other.as_str(), "Active")),
        }
    }

    fn check_deadline(&mut self, now: Timestamp) -> Option<u64> {
        if self.state.get() != CompanionState::Active {
            return None;
        }
        let window = self.window?;
        let elapsed_us = now.micros_since(self.last_trigger?);
        if window.is_overdue(elapsed_us) {
            self.metrics.record_late();
            self.enter_safe();
            Some(elapsed_us)
        } else {
            None
        }
    }

    fn trigger_safe_state(&mut self) -> CompanionResult<()> {
        self.state.enter_safe()?;
        self.metrics.record_safe_state();
        self.last_trigger = None;
        Ok(())
    }

    fn query_state(&self) -> CompanionResult<CompanionState> {
        if self.link_fault.load(Ordering::Acquire) {
            return Err(CompanionError::StatusUnavailable);
        }
        Ok(self.state.get())
    }

    fn state(&self) -> CompanionState {
        self.state.get()
    }

    fn window(&self) -> Option<TriggerWindow> {
        self.window
    }

    fn metrics(&self) -> CompanionMetrics {
        self.metrics
    }

    fn power_cycle(&mut self) {
        self.state.power_cycle();
        self.window = None;
        self.last_trigger = None;
    }
}
