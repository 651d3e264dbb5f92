//! # ecu-safety-codes
//!
//! Diagnostic fault taxonomy for the ECU safety supervisor.
//!
//! Every fault a peripheral driver or the supervisor itself can raise is a
//! variant of the closed [`ErrorCode`] enumeration, and every fault source is
//! a variant of the closed [`DeviceId`] enumeration. The classifier maps a raw
//! `(device, code, value)` report to a [`Classification`] that carries the
//! static severity and persistence of the code.
//!
//! ## Guarantees
//!
//! - **Total classification**: every input produces a record. Unrecognised
//!   codes, and codes reported by a device that cannot produce them, fail
//!   closed as [`ErrorCode::Unknown`] (fatal, persistent).
//! - **No heap allocations**: all types are `Copy`.
//! - **Dense device indexing**: [`DeviceId::index`] maps every device into
//!   `0..DEVICE_COUNT`, so tables can be fixed-size arrays.
//!
//! ## Example
//!
//! ```rust
//! use ecu_safety_codes::prelude::*;
//!
//! let class = classify(DeviceId::AdcUBat, 6, 61_000, Timestamp::from_micros(0));
//! assert_eq!(class.record.code, ErrorCode::AdcUBat);
//! assert!(class.is_fatal());
//! assert!(class.is_temporary());
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

mod classify;
mod code;
mod device;
mod record;

pub mod prelude;

pub use classify::{Classification, classify, classify_raw};
pub use code::{ErrorCode, Persistence, Severity};
pub use device::{DEVICE_COUNT, DeviceClass, DeviceId};
pub use record::{DiagErrorRecord, Timestamp};
