//! # ecu-safety-supervisor
//!
//! Diagnostic supervisor for the main CPU of a dual-CPU ECU.
//!
//! The supervisor accepts fault reports from peripheral drivers, debounces
//! temporary faults, drives the diagnostic state machine, keeps the
//! companion watchdog CPU triggered inside its window and decides whether a
//! fatal fault may end in a watchdog reset or must latch the safe state.
//!
//! ## Architecture
//!
//! - [`state`] - Diagnostic state machine with lock-free reads
//! - [`glitch`] - Per-device debounce of temporary faults
//! - [`dispatch`] - Error and notify handlers, reactions and output masks
//! - [`reset_budget`] - Watchdog reset counter and the permanent-safe latch
//! - [`config`] - Safety configuration and its validation
//! - [`supervisor`] - The [`Supervisor`] context tying them together
//! - [`clock`] - Monotonic and manual time sources
//! - [`error`] - API error types
//!
//! ## Safety Guarantees
//!
//! - **Fail closed**: unknown codes, unknown devices and invalid reactions
//!   all end in the safe state
//! - **No lock across callbacks**: handlers and self-tests may call back
//!   into the supervisor
//! - **Bounded memory**: the debounce table and dispatch queue are
//!   fixed-size
//!
//! ## Example
//!
//! ```rust
//! use ecu_safety_supervisor::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let clock = ManualClock::new();
//! let supervisor = Supervisor::new(clock.clone(), SharedRamStore::new());
//! supervisor.init(Some(SafetyConfig::builder().reset_behavior(3).build()?))?;
//!
//! supervisor.task_begin()?;
//! supervisor.report_fault(DeviceId::Can(0), ErrorCode::CanConfiguration.raw(), 0);
//! assert!(supervisor.is_safe_state());
//!
//! // A watchdog reset is permitted; start over.
//! supervisor.restart()?;
//! assert_eq!(supervisor.status().reset_count, 1);
//! # Ok(())
//! # }
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod glitch;
pub mod reset_budget;
pub mod state;
pub mod status;
pub mod supervisor;

pub mod prelude;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{SafetyConfig, SafetyConfigBuilder, SafetyTiming};
pub use dispatch::{
    DISPATCH_QUEUE_CAPACITY, Dispatch, DispatchQueue, ErrorHandler, NotifyHandler, OutputMask,
    Reaction,
};
pub use error::{ConfigError, InitError, InitResult, StateError, TaskError, TaskResult};
pub use glitch::{FilterOutcome, GlitchFilter};
pub use reset_budget::{
    ResetBudgetManager, ResetDecision, RetainedState, RetainedStore, SharedRamStore,
};
pub use self_test::{SelfTest, SelfTestFailure};
pub use state::{DiagState, DiagStateMachine, WatchdogState};
pub use status::{StatusReport, SupervisorMetrics};
pub use supervisor::Supervisor;
