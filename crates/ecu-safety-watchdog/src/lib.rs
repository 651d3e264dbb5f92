//! # ecu-safety-watchdog
//!
//! Companion watchdog CPU for the ECU safety supervisor.
//!
//! This crate provides a `#![no_std]`-compatible model of the supervisory
//! core that cross-checks the main CPU:
//! - [`TriggerWindow`] derives the trigger acceptance window from the command
//!   period and a discrete [`WindowSize`] level, rejecting imprecise windows
//! - [`WatchdogCompanion`] is the seam to the physical companion core
//! - [`SoftwareCompanion`] implements it for hosted builds and tests
//! - [`CompanionStateCell`] holds the companion state for lock-free reads
//!
//! ## Real-Time Safety
//!
//! - **No heap allocations** in trigger or deadline checks
//! - **No blocking operations**
//! - **Atomic state transitions**
//!
//! ## State Machine
//!
//! ```text
//! Standby ──activate()──► Reset ──begin_diagnostic()──► Diagnostic
//!                           ▲                               │
//!                           │                   first trigger│
//!                  activate()│                               ▼
//!                           │                            Active
//!                           │                               │
//!                           │      window violation / missed │
//!                           └──────────── Safe ◄─────────────┘
//! ```
//!
//! `Unknown` is never stored: it is what the main CPU reports when
//! [`WatchdogCompanion::query_state`] fails.
//!
//! ## Example
//!
//! ```rust
//! use ecu_safety_watchdog::prelude::*;
//!
//! let window = TriggerWindow::new(10_000, WindowSize::Percent25).expect("valid window");
//! assert_eq!((window.lower_bound_us(), window.upper_bound_us()), (8_571, 11_429));
//!
//! let mut companion = SoftwareCompanion::new();
//! companion.activate(window).expect("activate");
//! companion.begin_diagnostic().expect("diagnostic");
//!
//! let opened = companion.trigger(Timestamp::from_micros(0)).expect("trigger");
//! assert!(!opened.is_violation());
//! let next = companion.trigger(Timestamp::from_micros(10_000)).expect("trigger");
//! assert!(!next.is_violation());
//! assert_eq!(companion.state(), CompanionState::Active);
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_debug_implementations
)]
#![warn(missing_docs, clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

pub mod companion;
pub mod error;
pub mod prelude;
pub mod software_impl;
pub mod state;
pub mod window;

pub use companion::{TriggerVerdict, WatchdogCompanion};
pub use error::{CompanionError, CompanionResult};
pub use software_impl::SoftwareCompanion;
pub use state::{CompanionMetrics, CompanionState, CompanionStateCell};
pub use window::{TriggerWindow, WindowSize};
