//! Fault records and supervisor timestamps.

use core::fmt;
use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DeviceId, ErrorCode};

/// Monotonic time in microseconds since the supervisor clock started.
///
/// The supervisor never relies on wall-clock time; every comparison is a
/// saturating difference between two timestamps from the same clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp(u64);

impl Timestamp {
    /// Clock origin.
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from microseconds.
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create a timestamp from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1000))
    }

    /// Microseconds since the clock origin.
    #[must_use]
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Microseconds elapsed since `earlier`, zero if `earlier` is in the future.
    #[must_use]
    pub const fn micros_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Advance the timestamp by `micros`.
    #[must_use]
    pub const fn saturating_add_micros(self, micros: u64) -> Self {
        Self(self.0.saturating_add(micros))
    }

    /// Convert to a [`Duration`] since the clock origin.
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_micros(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// A classified fault as stored by the supervisor.
///
/// Records are created when a fault is first observed. A pending record is
/// discarded when its condition clears before the glitch filter expires, and
/// replaced when the same device reports a different code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagErrorRecord {
    /// Canonical fault identifier.
    pub code: ErrorCode,
    /// Device that reported the fault.
    pub device: DeviceId,
    /// Driver-supplied measurement or diagnostic word.
    pub faulty_value: u32,
    /// Time of the first observation.
    pub first_seen: Timestamp,
}

impl DiagErrorRecord {
    /// Create a new record.
    #[must_use]
    pub const fn new(
        code: ErrorCode,
        device: DeviceId,
        faulty_value: u32,
        first_seen: Timestamp,
    ) -> Self {
        Self {
            code,
            device,
            faulty_value,
            first_seen,
        }
    }

    /// Returns true if this record describes a fatal fault.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.code.severity().is_fatal()
    }
}

impl fmt::Display for DiagErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} (value {:#x}, first seen at {})",
            self.code, self.device, self.faulty_value, self.first_seen
        )
    }
}
