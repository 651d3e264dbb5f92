//! Prelude for ecu-safety-codes.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use ecu_safety_codes::prelude::*;
//!
//! let class = classify(DeviceId::Adc(0), 1, 0, Timestamp::ZERO);
//! assert_eq!(class.record.code, ErrorCode::AdcRangeCheck);
//! ```

pub use crate::classify::{Classification, classify, classify_raw};
pub use crate::code::{ErrorCode, Persistence, Severity};
pub use crate::device::{DEVICE_COUNT, DeviceClass, DeviceId};
pub use crate::record::{DiagErrorRecord, Timestamp};
