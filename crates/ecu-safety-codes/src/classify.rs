//! Fault classification.

use crate::{DeviceId, DiagErrorRecord, ErrorCode, Persistence, Severity, Timestamp};

/// Result of classifying a raw fault report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The record stamped with the canonical code.
    pub record: DiagErrorRecord,
    /// Static severity of the code.
    pub severity: Severity,
    /// Static persistence of the code.
    pub persistence: Persistence,
}

impl Classification {
    /// Returns true if the fault forces the safe state.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.severity.is_fatal()
    }

    /// Returns true if the fault is debounced by the glitch filter.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        self.persistence.is_temporary()
    }

    /// Returns true if the report says the device's condition has cleared.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.record.code == ErrorCode::NoError
    }

    const fn of(record: DiagErrorRecord) -> Self {
        Self {
            severity: record.code.severity(),
            persistence: record.code.persistence(),
            record,
        }
    }
}

/// Classify a fault report from `device`.
///
/// Pure and total. A raw code outside the taxonomy, a code the device's
/// family cannot report, or an out-of-range channel all classify as
/// [`ErrorCode::Unknown`], which is fatal and persistent. An out-of-range
/// channel is attributed to [`DeviceId::Application`] so that the record
/// always names an addressable device.
#[must_use]
pub fn classify(
    device: DeviceId,
    raw_code: u8,
    faulty_value: u32,
    now: Timestamp,
) -> Classification {
    if !device.is_valid() {
        return Classification::of(DiagErrorRecord::new(
            ErrorCode::Unknown,
            DeviceId::Application,
            faulty_value,
            now,
        ));
    }

    let code = match ErrorCode::from_raw(raw_code) {
        Some(code) if code.accepts(device.class()) => code,
        _ => ErrorCode::Unknown,
    };

    Classification::of(DiagErrorRecord::new(code, device, faulty_value, now))
}

/// Classify a report that names its device by raw number.
///
/// An unknown device number classifies as [`ErrorCode::Unknown`] on
/// [`DeviceId::Application`].
#[must_use]
pub fn classify_raw(
    device_raw: u8,
    raw_code: u8,
    faulty_value: u32,
    now: Timestamp,
) -> Classification {
    match DeviceId::from_raw(device_raw) {
        Some(device) => classify(device, raw_code, faulty_value, now),
        None => Classification::of(DiagErrorRecord::new(
            ErrorCode::Unknown,
            DeviceId::Application,
            faulty_value,
            now,
        )),
    }
}
