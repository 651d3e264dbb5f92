//! Debounce of temporary faults.
//!
//! One pending slot per device, indexed by [`DeviceId::index`]. A temporary
//! fault is promoted once it has been present for the glitch filter time;
//! a `NoError` report before then discards it silently.

use ecu_safety_codes::{Classification, DEVICE_COUNT, DeviceId, DiagErrorRecord, Timestamp};
use tracing::debug;

/// What the filter did with an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Persistent fault: handle immediately.
    Immediate(DiagErrorRecord),
    /// Temporary fault held pending.
    Pending,
    /// Temporary fault present for the full glitch time: handle it.
    Promoted(DiagErrorRecord),
    /// The condition cleared before promotion; the pending record is gone.
    Discarded(DiagErrorRecord),
    /// Clear report with nothing pending.
    Idle,
}

/// Per-device debounce table.
#[derive(Debug, Clone)]
pub struct GlitchFilter {
    pending: [Option<DiagErrorRecord>; DEVICE_COUNT],
    glitch_time_us: u64,
}

impl GlitchFilter {
    /// Create a filter with the given glitch time.
    #[must_use]
    pub fn new(glitch_time_us: u64) -> Self {
        Self {
            pending: [None; DEVICE_COUNT],
            glitch_time_us,
        }
    }

    /// Change the glitch time. Pending records keep their first observation.
    pub fn set_glitch_time_us(&mut self, glitch_time_us: u64) {
        self.glitch_time_us = glitch_time_us;
    }

    /// Configured glitch time in microseconds.
    #[must_use]
    pub fn glitch_time_us(&self) -> u64 {
        self.glitch_time_us
    }

    /// Feed one classified report observed at `now`.
    pub fn observe(&mut self, class: Classification, now: Timestamp) -> FilterOutcome {
        let record = class.record;
        let Some(slot) = record
            .device
            .index()
            .and_then(|index| self.pending.get_mut(index))
        else {
            return FilterOutcome::Immediate(record);
        };

        if class.is_clear() {
            return match slot.take() {
                Some(discarded) => {
                    debug!(
                        device = %discarded.device,
                        code = ?discarded.code,
                        "Pending fault cleared before glitch time"
                    );
                    FilterOutcome::Discarded(discarded)
                }
                None => FilterOutcome::Idle,
            };
        }

        if !class.is_temporary() {
            return FilterOutcome::Immediate(record);
        }

        if slot.is_some_and(|existing| existing.code == record.code) {
            if let Some(existing) = slot.as_mut() {
                existing.faulty_value = record.faulty_value;
            }
        } else {
            debug!(
                device = %record.device,
                code = ?record.code,
                faulty_value = record.faulty_value,
                "Temporary fault pending"
            );
            *slot = Some(record);
        }
        let Some(pending) = *slot else {
            return FilterOutcome::Pending;
        };

        if now.micros_since(pending.first_seen) >= self.glitch_time_us {
            *slot = None;
            FilterOutcome::Promoted(pending)
        } else {
            FilterOutcome::Pending
        }
    }

    /// Take the next pending record whose glitch time has elapsed at `now`.
    ///
    /// Call until it returns `None` to promote everything that is due.
    pub fn next_expired(&mut self, now: Timestamp) -> Option<DiagErrorRecord> {
        let glitch_time_us = self.glitch_time_us;
        self.pending
            .iter_mut()
            .find(|slot| {
                slot.is_some_and(|record| now.micros_since(record.first_seen) >= glitch_time_us)
            })
            .and_then(Option::take)
    }

    /// The pending record for `device`, if any.
    #[must_use]
    pub fn pending(&self, device: DeviceId) -> Option<&DiagErrorRecord> {
        device
            .index()
            .and_then(|index| self.pending.get(index))
            .and_then(Option::as_ref)
    }

    /// Number of pending records.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.iter().filter(|slot| slot.is_some()).count()
    }

    /// Drop every pending record.
    pub fn clear(&mut self) {
        self.pending = [None; DEVICE_COUNT];
    }
}
