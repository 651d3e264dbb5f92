//! Concurrency tests for the supervisor.

use std::sync::Arc;
use std::thread;

use ecu_safety_supervisor::prelude::*;
use parking_lot::Mutex;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_concurrent_reports_during_task_cycles() -> TestResult {
    let supervisor = Arc::new(Supervisor::new(ManualClock::new(), SharedRamStore::new()));
    supervisor.init(None)?;

    let mut handles = vec![];
    for channel in 0..4u8 {
        let supervisor = Arc::clone(&supervisor);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                supervisor.report_fault(DeviceId::Can(channel), ErrorCode::CanBusOff.raw(), 0);
            }
        }));
    }

    for _ in 0..100 {
        supervisor.task_begin()?;
        supervisor.task_end()?;
    }

    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    assert!(!supervisor.is_safe_state());
    assert_eq!(supervisor.metrics().faults_reported, 400);
    assert_eq!(supervisor.diag_state(), DiagState::Main);
    Ok(())
}

#[test]
fn test_concurrent_fatal_faults_notify_once() -> TestResult {
    let notified = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&notified);
    let config = SafetyConfig::builder()
        .reset_behavior(1)
        .notify_handler(move |diag: DiagState, _: WatchdogState, _: &DiagErrorRecord| {
            assert_eq!(diag, DiagState::Safe);
            *counter.lock() += 1;
        })
        .build()?;

    let supervisor = Arc::new(Supervisor::new(ManualClock::new(), SharedRamStore::new()));
    supervisor.init(Some(config))?;

    let handles: Vec<_> = (0..8u8)
        .map(|channel| {
            let supervisor = Arc::clone(&supervisor);
            thread::spawn(move || {
                supervisor.report_fault(
                    DeviceId::DigitalOut(channel),
                    ErrorCode::DoReadback.raw(),
                    u32::from(channel),
                );
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    assert!(supervisor.is_safe_state());
    assert_eq!(*notified.lock(), 1);
    assert_eq!(supervisor.metrics().fatal_faults, 8);
    assert_eq!(supervisor.status().reset_count, 1);
    Ok(())
}

#[test]
fn test_status_readers_alongside_task() -> TestResult {
    let supervisor = Arc::new(Supervisor::new(ManualClock::new(), SharedRamStore::new()));
    supervisor.init(None)?;

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let supervisor = Arc::clone(&supervisor);
            thread::spawn(move || {
                (0..200)
                    .map(|_| supervisor.status())
                    .all(|status| !status.is_safe_state())
            })
        })
        .collect();

    for _ in 0..200 {
        supervisor.task_begin()?;
        supervisor.task_end()?;
    }

    for reader in readers {
        assert!(matches!(reader.join(), Ok(true)));
    }
    Ok(())
}
