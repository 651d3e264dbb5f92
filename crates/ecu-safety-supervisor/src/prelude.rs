//! Prelude for ecu-safety-supervisor.
//!
//! Re-exports the supervisor API together with the fault taxonomy and
//! companion types it is used with.
//!
//! # Example
//!
//! ```rust
//! use ecu_safety_supervisor::prelude::*;
//!
//! let supervisor = Supervisor::new(ManualClock::new(), SharedRamStore::new());
//! assert_eq!(supervisor.diag_state(), DiagState::Disabled);
//! ```

pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::config::{SafetyConfig, SafetyConfigBuilder, SafetyTiming};
pub use crate::dispatch::{ErrorHandler, NotifyHandler, Reaction};
pub use crate::error::{ConfigError, InitError, InitResult, StateError, TaskError, TaskResult};
pub use crate::reset_budget::{RetainedState, RetainedStore, SharedRamStore};
pub use crate::self_test::{SelfTest, SelfTestFailure};
pub use crate::state::{DiagState, WatchdogState};
pub use crate::status::{StatusReport, SupervisorMetrics};
pub use crate::supervisor::Supervisor;

pub use ecu_safety_codes::{DeviceId, DiagErrorRecord, ErrorCode, Timestamp};
pub use ecu_safety_watchdog::{
    SoftwareCompanion, TriggerWindow, WatchdogCompanion, WindowSize,
};
