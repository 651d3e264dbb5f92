//! Tests for the static fault taxonomy.

#![cfg(test)]

use ecu_safety_codes::prelude::*;

#[test]
fn test_taxonomy_size() {
    // NoError, 75 fault codes, Unknown
    assert_eq!(ErrorCode::ALL.len(), 77);
}

#[test]
fn test_every_code_has_a_description() {
    for code in ErrorCode::ALL {
        assert!(!code.description().is_empty(), "{code:?}");
        assert_eq!(code.to_string(), code.description());
    }
}

#[test]
fn test_every_fault_code_has_a_reporting_device() {
    for code in ErrorCode::ALL {
        let reporters = DeviceId::all().filter(|d| code.accepts(d.class())).count();
        assert!(reporters > 0, "{code:?} cannot be reported by any device");
    }
}

#[test]
fn test_supervisor_codes_are_fatal_persistent() {
    for code in [
        ErrorCode::WatchdogTriggerFailure,
        ErrorCode::WatchdogSelfMonitoring,
        ErrorCode::WatchdogStatusUnavailable,
        ErrorCode::WatchdogResetBudgetExhausted,
        ErrorCode::ErrorCallbackRecursion,
        ErrorCode::InvalidDiagState,
        ErrorCode::InvalidWatchdogState,
        ErrorCode::ApplicationSafeState,
        ErrorCode::TaskCycleViolation,
    ] {
        assert_eq!(code.severity(), Severity::Fatal, "{code:?}");
        assert_eq!(code.persistence(), Persistence::Persistent, "{code:?}");
    }
}

#[test]
fn test_startup_self_tests_are_fatal_persistent() {
    for code in ErrorCode::ALL.iter().filter(|c| c.is_startup_self_test()) {
        assert!(code.severity().is_fatal(), "{code:?}");
        assert!(!code.persistence().is_temporary(), "{code:?}");
        assert_eq!(code.reported_by(), Some(DeviceClass::Core));
    }
}

#[test]
fn test_supply_monitors_are_fatal_temporary() {
    for (device, code) in [
        (DeviceId::AdcUBat, ErrorCode::AdcUBat),
        (DeviceId::Adc2V5Ref, ErrorCode::Adc2V5Ref),
        (DeviceId::Adc3V3Supply, ErrorCode::Adc3V3Supply),
        (DeviceId::AdcBoardTemp, ErrorCode::AdcBoardTemp),
    ] {
        let class = classify(device, code.raw(), 0, Timestamp::ZERO);
        assert_eq!(class.record.code, code);
        assert!(class.is_fatal());
        assert!(class.is_temporary());
    }
}

#[test]
fn test_record_display_mentions_code_and_device() {
    let class = classify(DeviceId::Pwm(4), ErrorCode::PwmOpenLoad.raw(), 0x10, Timestamp::from_micros(7));
    let text = class.record.to_string();
    assert!(text.contains("PWM open load"));
    assert!(text.contains("PWM 4"));
    assert!(text.contains("7us"));
}
