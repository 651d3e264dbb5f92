//! Tests for the watchdog reset budget across restarts.

use ecu_safety_supervisor::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn fatal(supervisor: &Supervisor<ManualClock>) {
    supervisor.report_fault(DeviceId::Can(0), ErrorCode::CanConfiguration.raw(), 0);
}

#[test]
fn test_three_resets_then_latch() -> TestResult {
    let clock = ManualClock::new();
    let store = SharedRamStore::new();
    let supervisor = Supervisor::new(clock.clone(), store.clone());
    supervisor.init(Some(SafetyConfig::builder().reset_behavior(3).build()?))?;

    for expected in 1..=3u8 {
        fatal(&supervisor);
        assert!(supervisor.is_safe_state());
        supervisor.restart()?;

        let status = supervisor.status();
        assert_eq!(status.diag_state, DiagState::Config);
        assert_eq!(status.watchdog_state, WatchdogState::Diagnostic);
        assert_eq!(status.reset_count, expected);
        assert_eq!(status.diag_error, None);
        clock.advance_ms(10);
    }

    fatal(&supervisor);
    assert_eq!(
        supervisor.restart(),
        Err(InitError::PermanentSafeState { reset_count: 3 })
    );

    let status = supervisor.status();
    assert!(status.is_safe_state());
    assert_eq!(
        status.watchdog_error.map(|r| (r.code, r.faulty_value)),
        Some((ErrorCode::WatchdogResetBudgetExhausted, 3))
    );
    assert!(store.load().permanent_safe);
    assert_eq!(supervisor.metrics().restarts, 3);
    Ok(())
}

#[test]
fn test_restart_requires_pending_reset() -> TestResult {
    let supervisor = Supervisor::new(ManualClock::new(), SharedRamStore::new());
    supervisor.init(Some(SafetyConfig::builder().reset_behavior(1).build()?))?;

    assert_eq!(
        supervisor.restart(),
        Err(InitError::ResetNotPermitted(DiagState::Config))
    );

    fatal(&supervisor);
    supervisor.restart()?;
    assert_eq!(
        supervisor.restart(),
        Err(InitError::ResetNotPermitted(DiagState::Config))
    );
    Ok(())
}

#[test]
fn test_non_safety_mode_latches_first_fatal() -> TestResult {
    let supervisor = Supervisor::new(ManualClock::new(), SharedRamStore::new());
    supervisor.init(None)?;
    fatal(&supervisor);

    assert_eq!(
        supervisor.restart(),
        Err(InitError::PermanentSafeState { reset_count: 0 })
    );
    assert!(supervisor.retained().permanent_safe);
    Ok(())
}

#[test]
fn test_counter_survives_watchdog_reset() -> TestResult {
    let store = SharedRamStore::new();
    let config = SafetyConfig::builder().reset_behavior(2).build()?;

    for expected in 1..=2u8 {
        let supervisor = Supervisor::new(ManualClock::new(), store.clone());
        supervisor.init(Some(config.clone()))?;
        assert_eq!(supervisor.status().reset_count, expected - 1);
        fatal(&supervisor);
        assert_eq!(store.load().reset_count, expected);
    }

    let supervisor = Supervisor::new(ManualClock::new(), store.clone());
    supervisor.init(Some(config))?;
    fatal(&supervisor);
    assert!(store.load().permanent_safe);
    Ok(())
}

#[test]
fn test_external_clear_lifts_latch() -> TestResult {
    let store = SharedRamStore::new();
    let first = Supervisor::new(ManualClock::new(), store.clone());
    first.init(None)?;
    fatal(&first);
    assert!(store.load().permanent_safe);

    store.clear();

    let second = Supervisor::new(ManualClock::new(), store);
    second.init(None)?;
    assert_eq!(second.diag_state(), DiagState::Config);
    assert_eq!(second.status().reset_count, 0);
    Ok(())
}

#[test]
fn test_restart_reruns_self_test() -> TestResult {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    let runs = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&runs);
    let supervisor = Supervisor::new(ManualClock::new(), SharedRamStore::new()).with_self_test(
        move || -> Result<(), SelfTestFailure> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    );
    supervisor.init(Some(SafetyConfig::builder().reset_behavior(1).build()?))?;
    fatal(&supervisor);
    supervisor.restart()?;

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_fatal_before_init_keeps_budget() -> TestResult {
    let store = SharedRamStore::new();
    let early = Supervisor::new(ManualClock::new(), store.clone());
    early.report_fault(DeviceId::Core, ErrorCode::CoreLockstep.raw(), 0);
    assert!(early.is_safe_state());

    let retained = store.load();
    assert!(!retained.permanent_safe);
    assert_eq!(retained.reset_count, 0);
    assert_eq!(
        retained.last_fatal.map(|r| r.code),
        Some(ErrorCode::CoreLockstep)
    );

    // After the watchdog reset the configured unit starts normally.
    let supervisor = Supervisor::new(ManualClock::new(), store);
    supervisor.init(Some(SafetyConfig::builder().reset_behavior(3).build()?))?;
    assert_eq!(supervisor.diag_state(), DiagState::Config);
    Ok(())
}
