//! Property-based tests for the classifier.

#![cfg(test)]

use ecu_safety_codes::prelude::*;
use proptest::prelude::*;

fn any_device() -> impl Strategy<Value = DeviceId> {
    (0u8..=u8::MAX).prop_map(|raw| DeviceId::from_raw(raw).unwrap_or(DeviceId::Pwm(raw)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_classification_is_total_and_consistent(
        device in any_device(),
        raw in any::<u8>(),
        value in any::<u32>(),
        now in any::<u64>(),
    ) {
        let class = classify(device, raw, value, Timestamp::from_micros(now));
        let code = class.record.code;

        prop_assert_eq!(class.severity, code.severity());
        prop_assert_eq!(class.persistence, code.persistence());
        prop_assert_eq!(class.record.faulty_value, value);
        prop_assert!(class.record.device.is_valid());
        prop_assert!(code.accepts(class.record.device.class()));
    }

    #[test]
    fn prop_unknown_is_always_fatal_persistent(
        device in any_device(),
        raw in any::<u8>(),
    ) {
        let class = classify(device, raw, 0, Timestamp::ZERO);
        if class.record.code == ErrorCode::Unknown {
            prop_assert!(class.is_fatal());
            prop_assert!(!class.is_temporary());
        }
    }

    #[test]
    fn prop_accepted_codes_keep_their_identity(
        device_raw in 0u8..118,
        raw in any::<u8>(),
    ) {
        let class = classify_raw(device_raw, raw, 0, Timestamp::ZERO);
        if let Some(code) = ErrorCode::from_raw(raw) {
            let device = DeviceId::from_raw(device_raw);
            prop_assert_eq!(Some(class.record.device), device);
            if code.accepts(class.record.device.class()) {
                prop_assert_eq!(class.record.code, code);
            } else {
                prop_assert_eq!(class.record.code, ErrorCode::Unknown);
            }
        }
    }
}
