//! Prelude for ecu-safety-watchdog.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use ecu_safety_watchdog::prelude::*;
//!
//! let window = TriggerWindow::new(5_000, WindowSize::Percent50).expect("valid window");
//! let mut companion = SoftwareCompanion::new();
//! companion.activate(window).expect("activate");
//! assert_eq!(companion.state(), CompanionState::Reset);
//! ```

pub use crate::companion::{TriggerVerdict, WatchdogCompanion};
pub use crate::error::{CompanionError, CompanionResult};
pub use crate::software_impl::SoftwareCompanion;
pub use crate::state::{CompanionMetrics, CompanionState, CompanionStateCell};
pub use crate::window::{TriggerWindow, WindowSize};
pub use ecu_safety_codes::Timestamp;
