//! BDD tests for supervisor safety scenarios.
//!
//! Feature: dual_cpu_supervision.feature

#![cfg(test)]

use std::sync::Arc;

use ecu_safety_supervisor::prelude::*;
use parking_lot::Mutex;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("ecu_safety_supervisor=debug")
        .with_test_writer()
        .try_init()
        .ok();
}

struct Harness {
    clock: ManualClock,
    store: SharedRamStore,
    supervisor: Supervisor<ManualClock>,
    notified: Arc<Mutex<Vec<(DiagState, ErrorCode)>>>,
    errors: Arc<Mutex<Vec<ErrorCode>>>,
}

impl Harness {
    fn with_timing(timing: SafetyTiming) -> Result<Self, Box<dyn std::error::Error>> {
        init_tracing();
        let clock = ManualClock::new();
        let store = SharedRamStore::new();
        let notified = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));

        let notify_log = Arc::clone(&notified);
        let error_log = Arc::clone(&errors);
        let config = SafetyConfig::builder()
            .timing(timing)
            .error_handler(move |_: DiagState, _: WatchdogState, record: &DiagErrorRecord| {
                error_log.lock().push(record.code);
                Reaction::NO_ACTION
            })
            .notify_handler(move |diag: DiagState, _: WatchdogState, record: &DiagErrorRecord| {
                notify_log.lock().push((diag, record.code));
            })
            .build()?;

        let supervisor = Supervisor::new(clock.clone(), store.clone());
        supervisor.init(Some(config))?;
        Ok(Self {
            clock,
            store,
            supervisor,
            notified,
            errors,
        })
    }

    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_timing(SafetyTiming::default())
    }

    fn cycle(&self) -> Result<(), TaskError> {
        self.supervisor.task_begin()?;
        self.supervisor.task_end()?;
        self.clock.advance_ms(10);
        Ok(())
    }
}

mod dual_cpu_supervision_scenarios {
    use super::*;

    /// Scenario: A glitch shorter than the filter time leaves no trace
    #[test]
    fn scenario_short_glitch_is_ignored() -> TestResult {
        let h = Harness::new()?;

        // Given a battery undervoltage that clears after 6ms
        h.supervisor.task_begin()?;
        h.supervisor
            .report_fault(DeviceId::AdcUBat, ErrorCode::AdcUBat.raw(), 61_000);
        h.clock.advance_ms(6);
        h.supervisor
            .report_fault(DeviceId::AdcUBat, ErrorCode::NoError.raw(), 0);
        h.supervisor.task_end()?;

        // When the task keeps running
        h.clock.advance_ms(4);
        for _ in 0..5 {
            h.cycle()?;
        }

        // Then no state changed and no handler ran
        let status = h.supervisor.status();
        assert_eq!(status.diag_state, DiagState::Main);
        assert_eq!(status.diag_error, None);
        assert!(h.notified.lock().is_empty());
        assert!(h.errors.lock().is_empty());
        Ok(())
    }

    /// Scenario: A persisting battery fault forces the safe state
    #[test]
    fn scenario_persisting_battery_fault() -> TestResult {
        let h = Harness::new()?;
        h.cycle()?;

        // Given a battery undervoltage reported every millisecond
        for _ in 0..10 {
            h.supervisor
                .report_fault(DeviceId::AdcUBat, ErrorCode::AdcUBat.raw(), 61_000);
            h.clock.advance_ms(1);
        }
        h.supervisor
            .report_fault(DeviceId::AdcUBat, ErrorCode::AdcUBat.raw(), 61_000);

        // Then the unit is safe and the notify handler saw the safe state
        assert!(h.supervisor.is_safe_state());
        assert_eq!(
            h.notified.lock().as_slice(),
            &[(DiagState::Safe, ErrorCode::AdcUBat)]
        );
        assert!(!h.supervisor.is_output_enabled(DeviceId::Pwm(0)));
        Ok(())
    }

    /// Scenario: Three permitted resets, then the permanent safe state
    #[test]
    fn scenario_reset_budget_of_three() -> TestResult {
        let h = Harness::with_timing(SafetyTiming {
            reset_behavior: 3,
            ..SafetyTiming::default()
        })?;

        for round in 1..=4u8 {
            h.cycle()?;
            h.cycle()?;
            // When the task stalls past the trigger window
            h.clock.advance_ms(5);
            let status = h.supervisor.status();
            assert!(status.is_safe_state(), "round {round}");

            if round <= 3 {
                h.supervisor.restart()?;
                assert_eq!(h.supervisor.status().reset_count, round);
            }
        }

        // Then the fourth fatal event latches the safe state
        assert_eq!(
            h.supervisor.restart(),
            Err(InitError::PermanentSafeState { reset_count: 3 })
        );
        assert!(h.store.load().permanent_safe);
        assert_eq!(h.notified.lock().len(), 4);
        Ok(())
    }

    /// Scenario: Non-fatal faults reach the error handler only
    #[test]
    fn scenario_non_fatal_fault_reaches_error_handler() -> TestResult {
        let h = Harness::new()?;
        h.cycle()?;

        h.supervisor
            .report_fault(DeviceId::Eeprom, ErrorCode::EepromWrite.raw(), 0x1F0);
        h.cycle()?;

        assert_eq!(h.errors.lock().as_slice(), &[ErrorCode::EepromWrite]);
        assert!(h.notified.lock().is_empty());
        assert_eq!(h.supervisor.diag_state(), DiagState::Main);
        Ok(())
    }

    /// Scenario: A stalled companion link is fatal
    #[test]
    fn scenario_companion_link_lost() -> TestResult {
        let h = Harness::new()?;
        h.cycle()?;

        h.supervisor
            .inspect_companion(|companion| companion.set_link_fault(true));
        let result = h.supervisor.task_begin();

        assert_eq!(result, Err(TaskError::SafeState));
        assert_eq!(
            h.notified.lock().as_slice(),
            &[(DiagState::Safe, ErrorCode::WatchdogStatusUnavailable)]
        );
        Ok(())
    }
}
