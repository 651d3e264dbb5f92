//! Application handlers and the bounded dispatch queue.
//!
//! Handlers run outside the supervisor's critical section. Faults reported
//! while a handler runs are queued and dispatched after it returns, so a
//! handler may call back into the supervisor without deadlocking.

use std::thread::{self, ThreadId};

use bitflags::bitflags;
use ecu_safety_codes::{DEVICE_COUNT, DeviceId, DiagErrorRecord};
use heapless::Deque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::{DiagState, WatchdogState};

/// Capacity of the dispatch queue.
pub const DISPATCH_QUEUE_CAPACITY: usize = 16;

bitflags! {
    /// Application reaction to a non-fatal fault.
    ///
    /// The empty set means "no action". [`Reaction::SAFE_STATE`] is
    /// exclusive with every other flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Reaction: u32 {
        /// Force the unit into the safe state.
        const SAFE_STATE = 1 << 0;
        /// Disable the output that reported the fault.
        const DISABLE_OUTPUT = 1 << 1;
        /// Switch off shutoff group 0.
        const SHUTOFF_GROUP_0 = 1 << 2;
        /// Switch off shutoff group 1.
        const SHUTOFF_GROUP_1 = 1 << 3;
        /// Switch off shutoff group 2.
        const SHUTOFF_GROUP_2 = 1 << 4;
        /// Switch off shutoff group 3.
        const SHUTOFF_GROUP_3 = 1 << 5;
    }
}

impl Reaction {
    /// Ignore the fault.
    pub const NO_ACTION: Self = Self::empty();

    const SHUTOFF_GROUPS: Self = Self::SHUTOFF_GROUP_0
        .union(Self::SHUTOFF_GROUP_1)
        .union(Self::SHUTOFF_GROUP_2)
        .union(Self::SHUTOFF_GROUP_3);

    /// Returns true if the combination is well formed.
    ///
    /// Unknown bits, or [`Self::SAFE_STATE`] combined with anything else,
    /// are invalid.
    #[must_use]
    pub fn is_valid(self) -> bool {
        let known = Self::all().contains(self);
        let exclusive = !self.contains(Self::SAFE_STATE) || self == Self::SAFE_STATE;
        known && exclusive
    }

    /// The reaction to apply: invalid combinations become [`Self::SAFE_STATE`].
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.is_valid() {
            self
        } else {
            Self::SAFE_STATE
        }
    }

    /// Shutoff groups requested, as a bitmask of groups 0..=3.
    #[must_use]
    pub fn shutoff_groups(self) -> u8 {
        let groups = self.intersection(Self::SHUTOFF_GROUPS).bits() >> 2;
        u8::try_from(groups).unwrap_or(u8::MAX)
    }
}

impl Default for Reaction {
    fn default() -> Self {
        Self::NO_ACTION
    }
}

/// Handler for non-fatal faults.
///
/// Returns the reaction the supervisor applies once the handler returns.
pub trait ErrorHandler: Send + Sync {
    /// Decide how to react to `record`.
    fn on_error(
        &self,
        diag: DiagState,
        watchdog: WatchdogState,
        record: &DiagErrorRecord,
    ) -> Reaction;
}

impl<F> ErrorHandler for F
where
    F: Fn(DiagState, WatchdogState, &DiagErrorRecord) -> Reaction + Send + Sync,
{
    fn on_error(
        &self,
        diag: DiagState,
        watchdog: WatchdogState,
        record: &DiagErrorRecord,
    ) -> Reaction {
        self(diag, watchdog, record)
    }
}

/// Handler for fatal faults.
///
/// Runs after the unit has entered the safe state. Advisory only.
pub trait NotifyHandler: Send + Sync {
    /// Observe a fatal `record`.
    fn on_notify(&self, diag: DiagState, watchdog: WatchdogState, record: &DiagErrorRecord);
}

impl<F> NotifyHandler for F
where
    F: Fn(DiagState, WatchdogState, &DiagErrorRecord) + Send + Sync,
{
    fn on_notify(&self, diag: DiagState, watchdog: WatchdogState, record: &DiagErrorRecord) {
        self(diag, watchdog, record);
    }
}

/// A queued handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Non-fatal fault for the [`ErrorHandler`].
    Error(DiagErrorRecord),
    /// Fatal fault for the [`NotifyHandler`].
    Notify(DiagErrorRecord),
}

impl Dispatch {
    /// The record being dispatched.
    #[must_use]
    pub fn record(&self) -> &DiagErrorRecord {
        match self {
            Self::Error(record) | Self::Notify(record) => record,
        }
    }
}

/// Pending handler invocations plus the re-entrancy guard.
#[derive(Debug)]
pub struct DispatchQueue {
    queue: Deque<Dispatch, DISPATCH_QUEUE_CAPACITY>,
    handler_thread: Option<ThreadId>,
    recursion_reported: bool,
}

impl DispatchQueue {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            handler_thread: None,
            recursion_reported: false,
        }
    }

    /// Queue a dispatch. Hands the item back if the queue is full.
    ///
    /// # Errors
    ///
    /// Returns the rejected dispatch when the queue is full.
    pub fn push(&mut self, dispatch: Dispatch) -> Result<(), Dispatch> {
        self.queue.push_back(dispatch)
    }

    /// Take the next dispatch and mark a handler as running on the
    /// calling thread.
    ///
    /// Returns `None` if the queue is empty or a handler is already running.
    pub fn begin(&mut self) -> Option<Dispatch> {
        if self.handler_thread.is_some() {
            return None;
        }
        let next = self.queue.pop_front()?;
        self.handler_thread = Some(thread::current().id());
        self.recursion_reported = false;
        Some(next)
    }

    /// Mark the running handler as finished.
    pub fn finish(&mut self) {
        self.handler_thread = None;
    }

    /// Returns true while a handler runs on any thread.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handler_thread.is_some()
    }

    /// Returns true if the calling thread is the one running the handler.
    #[must_use]
    pub fn is_handler_thread(&self) -> bool {
        self.handler_thread == Some(thread::current().id())
    }

    /// Claim the single recursion report allowed per handler invocation.
    ///
    /// Returns true the first time it is called from the handler's own
    /// thread while the handler runs.
    pub fn claim_recursion(&mut self) -> bool {
        if self.is_handler_thread() && !self.recursion_reported {
            self.recursion_reported = true;
            true
        } else {
            false
        }
    }

    /// Number of queued dispatches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop everything queued.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.handler_thread = None;
        self.recursion_reported = false;
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Outputs and shutoff groups switched off by application reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputMask {
    disabled: u128,
    shutoff_groups: u8,
}

impl OutputMask {
    /// Apply a reaction reported for `device`.
    pub fn apply(&mut self, device: DeviceId, reaction: Reaction) {
        if reaction.contains(Reaction::DISABLE_OUTPUT)
            && let Some(index) = device.index()
        {
            self.disabled |= 1u128 << index;
        }
        self.shutoff_groups |= reaction.shutoff_groups();
    }

    /// Returns true if `device` was disabled by a reaction.
    #[must_use]
    pub fn is_disabled(&self, device: DeviceId) -> bool {
        device
            .index()
            .is_some_and(|index| self.disabled & (1u128 << index) != 0)
    }

    /// Shutoff groups switched off, as a bitmask of groups 0..=3.
    #[must_use]
    pub fn shutoff_groups(&self) -> u8 {
        self.shutoff_groups
    }

    /// Re-enable everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

const _: () = assert!(DEVICE_COUNT <= 128, "output mask holds one bit per device");
