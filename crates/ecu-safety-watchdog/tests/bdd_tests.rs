//! BDD tests for companion watchdog supervision scenarios.
//!
//! Feature: companion_supervision.feature

#![cfg(test)]

use ecu_safety_watchdog::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn us(micros: u64) -> Timestamp {
    Timestamp::from_micros(micros)
}

fn diagnostic_companion(period_us: u32) -> Result<SoftwareCompanion, CompanionError> {
    let mut companion = SoftwareCompanion::new();
    companion.activate(TriggerWindow::new(period_us, WindowSize::Percent25)?)?;
    companion.begin_diagnostic()?;
    Ok(companion)
}

mod companion_supervision_scenarios {
    use super::*;

    /// Scenario: A steady 10ms task keeps the companion Active
    #[test]
    fn scenario_steady_task_keeps_companion_active() -> TestResult {
        let mut companion = diagnostic_companion(10_000)?;
        for cycle in 0..100u64 {
            let verdict = companion.trigger(us(cycle * 10_000))?;
            assert!(!verdict.is_violation(), "cycle {cycle}: {verdict:?}");
        }
        assert_eq!(companion.state(), CompanionState::Active);
        assert_eq!(companion.metrics().accepted_triggers, 99);
        Ok(())
    }

    /// Scenario: Jitter inside the window is tolerated
    #[test]
    fn scenario_jitter_inside_window_is_tolerated() -> TestResult {
        let mut companion = diagnostic_companion(10_000)?;
        let mut now = 0;
        companion.trigger(us(now))?;
        for interval in [8_600, 11_400, 9_000, 11_000, 10_000] {
            now += interval;
            assert_eq!(
                companion.trigger(us(now))?,
                TriggerVerdict::Accepted { elapsed_us: interval }
            );
        }
        Ok(())
    }

    /// Scenario: A task overrun forces the companion Safe
    #[test]
    fn scenario_task_overrun_forces_safe() -> TestResult {
        let mut companion = diagnostic_companion(10_000)?;
        companion.trigger(us(0))?;
        companion.trigger(us(10_000))?;
        let verdict = companion.trigger(us(25_000))?;
        assert_eq!(verdict, TriggerVerdict::TooLate { elapsed_us: 15_000 });
        assert_eq!(companion.state(), CompanionState::Safe);
        assert!(!companion.outputs_enabled());
        Ok(())
    }

    /// Scenario: A double trigger forces the companion Safe
    #[test]
    fn scenario_double_trigger_forces_safe() -> TestResult {
        let mut companion = diagnostic_companion(10_000)?;
        companion.trigger(us(0))?;
        let verdict = companion.trigger(us(100))?;
        assert_eq!(verdict, TriggerVerdict::TooEarly { elapsed_us: 100 });
        assert_eq!(companion.state(), CompanionState::Safe);
        assert_eq!(companion.metrics().early_triggers, 1);
        Ok(())
    }

    /// Scenario: A stalled main CPU is detected without a trigger
    #[test]
    fn scenario_stalled_main_cpu_detected() -> TestResult {
        let mut companion = diagnostic_companion(10_000)?;
        companion.trigger(us(0))?;
        assert_eq!(companion.check_deadline(us(11_000)), None);
        assert_eq!(companion.check_deadline(us(50_000)), Some(50_000));
        assert_eq!(companion.state(), CompanionState::Safe);
        Ok(())
    }

    /// Scenario: A Safe companion is re-armed by activation
    #[test]
    fn scenario_safe_companion_rearmed_by_activation() -> TestResult {
        let mut companion = diagnostic_companion(10_000)?;
        companion.trigger_safe_state()?;
        companion.activate(TriggerWindow::new(20_000, WindowSize::Percent50)?)?;
        companion.begin_diagnostic()?;
        assert_eq!(companion.trigger(us(0))?, TriggerVerdict::Opened);
        assert_eq!(companion.state(), CompanionState::Active);
        assert_eq!(
            companion.window().map(|w| w.command_period_us()),
            Some(20_000)
        );
        Ok(())
    }

    /// Scenario: An active companion refuses reconfiguration
    #[test]
    fn scenario_active_companion_refuses_reconfiguration() -> TestResult {
        let mut companion = diagnostic_companion(10_000)?;
        companion.trigger(us(0))?;
        let result = companion.activate(TriggerWindow::new(5_000, WindowSize::Percent25)?);
        assert!(matches!(
            result,
            Err(CompanionError::InvalidTransition { from: "Active", .. })
        ));
        Ok(())
    }

    /// Scenario: A broken link hides the state but not the supervision
    #[test]
    fn scenario_broken_link_hides_state() -> TestResult {
        let mut companion = diagnostic_companion(10_000)?;
        companion.trigger(us(0))?;
        companion.set_link_fault(true);
        assert_eq!(companion.query_state(), Err(CompanionError::StatusUnavailable));
        assert!(!companion.trigger(us(10_000))?.is_violation());
        Ok(())
    }
}
