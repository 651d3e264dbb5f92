//! Monotonic time sources.

use std::sync::Arc;
use std::time::Instant;

use ecu_safety_codes::Timestamp;
use portable_atomic::{AtomicU64, Ordering};

/// Source of supervisor timestamps.
///
/// Implementations must be monotonic: a later call never returns an
/// earlier timestamp.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> Timestamp;
}

/// Clock backed by [`Instant`], counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let micros = self.origin.elapsed().as_micros();
        Timestamp::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }
}

/// Manually advanced clock for deterministic tests and simulation.
///
/// Clones share the same time.
///
/// ```rust
/// use ecu_safety_supervisor::prelude::*;
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance_ms(10);
/// assert_eq!(clock.now(), Timestamp::from_millis(10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at [`Timestamp::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `micros` microseconds.
    pub fn advance_us(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::AcqRel);
    }

    /// Advance by `millis` milliseconds.
    pub fn advance_ms(&self, millis: u64) {
        self.advance_us(millis.saturating_mul(1_000));
    }

    /// Jump to `at`. Moving backwards is ignored.
    pub fn set(&self, at: Timestamp) {
        self.micros.fetch_max(at.as_micros(), Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance_us(250);
        handle.advance_ms(2);
        assert_eq!(clock.now(), Timestamp::from_micros(2_250));
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new();
        clock.set(Timestamp::from_millis(5));
        clock.set(Timestamp::from_millis(1));
        assert_eq!(clock.now(), Timestamp::from_millis(5));
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
