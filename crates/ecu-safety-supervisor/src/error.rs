//! Error types for the safety supervisor.
//!
//! API errors are returned to the caller that triggered them. Faults raised
//! by drivers are never surfaced here; they are staged and reported through
//! [`crate::Supervisor::status`] and the dispatch handlers.

use ecu_safety_codes::ErrorCode;
use ecu_safety_watchdog::CompanionError;
use thiserror::Error;

use crate::state::DiagState;

/// Configuration rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Glitch filter time outside `1..=180` ms.
    #[error("Glitch filter time {0}ms outside 1..=180ms")]
    GlitchFilterTimeOutOfRange(u32),

    /// Reset behavior outside `0..=9`.
    #[error("Reset behavior {0} outside 0..=9")]
    ResetBehaviorOutOfRange(u8),

    /// Command period or window level rejected by the trigger window check.
    #[error("Trigger window rejected: {0}")]
    TriggerWindow(#[from] CompanionError),
}

/// Errors returned by [`crate::Supervisor::init`] and [`crate::Supervisor::restart`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// `init` was already called during this power cycle.
    #[error("Supervisor already initialized (state {0})")]
    AlreadyInitialized(DiagState),

    /// The safety configuration failed validation.
    #[error("Invalid safety configuration: {0}")]
    Config(#[from] ConfigError),

    /// The reset budget is exhausted; the unit stays in the safe state.
    #[error("Permanent safe state latched after {reset_count} resets")]
    PermanentSafeState {
        /// Resets consumed before the latch was set.
        reset_count: u8,
    },

    /// A startup self-test failed.
    #[error("Startup self-test failed: {0:?}")]
    SelfTestFailed(ErrorCode),

    /// The companion refused activation.
    #[error("Companion activation failed: {0}")]
    Companion(CompanionError),

    /// A fatal fault moved the state machine while starting up.
    #[error(transparent)]
    State(#[from] StateError),

    /// `restart` was called without a permitted reset pending.
    #[error("No watchdog reset pending (state {0})")]
    ResetNotPermitted(DiagState),
}

impl InitError {
    /// Returns true if the unit ended in the safe state.
    #[must_use]
    pub fn is_safe_state(&self) -> bool {
        matches!(
            self,
            Self::PermanentSafeState { .. }
                | Self::SelfTestFailed(_)
                | Self::Companion(_)
                | Self::State(_)
        )
    }
}

/// Errors returned by the task bracket [`crate::Supervisor::task_begin`] /
/// [`crate::Supervisor::task_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskError {
    /// `init` has not been called.
    #[error("Supervisor not initialized")]
    NotInitialized,

    /// The unit is in the safe state; outputs must stay off.
    #[error("Unit is in the safe state")]
    SafeState,

    /// Nested `task_begin` or unmatched `task_end`.
    #[error("Task cycle bracket violated")]
    CycleViolation,

    /// The companion rejected the trigger timing.
    #[error("Watchdog trigger outside window after {elapsed_us}us")]
    TriggerViolation {
        /// Measured interval since the previous trigger.
        elapsed_us: u64,
    },
}

/// Invalid diagnostic state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    /// The transition is not part of the state machine.
    #[error("Invalid diagnostic state transition: {from} -> {to}")]
    InvalidTransition {
        /// State before the attempted transition.
        from: DiagState,
        /// Requested state.
        to: DiagState,
    },
}

/// Result alias for initialization.
pub type InitResult<T> = std::result::Result<T, InitError>;

/// Result alias for task bracket operations.
pub type TaskResult<T> = std::result::Result<T, TaskError>;
