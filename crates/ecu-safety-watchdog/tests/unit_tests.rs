//! Unit tests for window derivation across every level.

#![cfg(test)]

use ecu_safety_watchdog::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_window_table_at_10ms() -> TestResult {
    let expected = [
        (WindowSize::Percent100, 0, 20_000, 20_000),
        (WindowSize::Percent50, 6_667, 13_333, 6_667),
        (WindowSize::Percent25, 8_571, 11_429, 2_857),
        (WindowSize::Percent12_5, 9_333, 10_667, 1_333),
    ];
    for (size, lower, upper, actual) in expected {
        let window = TriggerWindow::new(10_000, size)?;
        assert_eq!(window.lower_bound_us(), lower, "{size:?}");
        assert_eq!(window.upper_bound_us(), upper, "{size:?}");
        assert_eq!(window.actual_percent_hundredths(), actual, "{size:?}");
    }
    Ok(())
}

#[test]
fn test_narrow_levels_at_10ms() {
    // 6.25% yields a 646us margin, 3.125% yields 318us
    for size in [WindowSize::Percent6_25, WindowSize::Percent3_125] {
        assert!(matches!(
            TriggerWindow::new(10_000, size),
            Err(CompanionError::WindowPrecision { .. })
        ));
    }
}

#[test]
fn test_narrowest_level_needs_long_period() -> TestResult {
    assert!(TriggerWindow::new(22_000, WindowSize::Percent3_125).is_err());
    let window = TriggerWindow::new(23_000, WindowSize::Percent3_125)?;
    assert!(window.margin_us() >= TriggerWindow::MIN_MARGIN_US);
    Ok(())
}

#[test]
fn test_default_window_size() {
    assert_eq!(WindowSize::default(), WindowSize::Percent25);
}

#[test]
fn test_state_display() {
    assert_eq!(CompanionState::Diagnostic.to_string(), "Diagnostic");
    assert_eq!(CompanionState::default(), CompanionState::Standby);
    assert!(CompanionState::Active.expects_triggers());
    assert!(!CompanionState::Reset.expects_triggers());
}

#[test]
fn test_begin_diagnostic_requires_reset() {
    let mut companion = SoftwareCompanion::new();
    assert!(matches!(
        companion.begin_diagnostic(),
        Err(CompanionError::InvalidTransition { from: "Standby", to: "Diagnostic" })
    ));
}
