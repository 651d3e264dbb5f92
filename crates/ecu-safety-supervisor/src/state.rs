//! Main-CPU diagnostic state machine.
//!
//! The state lives in an atomic cell so drivers can gate their outputs on
//! [`DiagStateMachine::is_safe`] without entering the supervisor's critical
//! section. All writes still happen inside that section.

use portable_atomic::{AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Companion watchdog state as seen by the main CPU.
pub type WatchdogState = ecu_safety_watchdog::CompanionState;

/// Main-CPU diagnostic state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum DiagState {
    /// Not initialized.
    #[default]
    Disabled = 0,
    /// Running startup self-tests.
    Init = 1,
    /// Self-tests passed; the application is configuring its channels.
    Config = 2,
    /// Cyclic operation.
    Main = 3,
    /// Outputs forced off.
    Safe = 4,
}

impl DiagState {
    /// Convert from raw u8 value.
    #[must_use]
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Init),
            2 => Some(Self::Config),
            3 => Some(Self::Main),
            4 => Some(Self::Safe),
            _ => None,
        }
    }

    /// Convert to raw u8 value.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Get the state as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Init => "Init",
            Self::Config => "Config",
            Self::Main => "Main",
            Self::Safe => "Safe",
        }
    }

    /// Returns true if `self -> to` is an edge of the state machine.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Disabled | Self::Safe, Self::Init)
                | (Self::Init, Self::Config)
                | (Self::Config, Self::Main)
                | (
                    Self::Disabled | Self::Init | Self::Config | Self::Main,
                    Self::Safe
                )
        )
    }
}

impl core::fmt::Display for DiagState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic diagnostic state cell.
///
/// # State Transition Diagram
///
/// ```text
/// Disabled ──init()──► Init ──self-tests pass──► Config ──first task_begin()──► Main
///                       ▲                                                       │
///                       │ restart() (reset permitted)            any fatal fault │
///                       │                                                       ▼
///                       └──────────────────────────────────────────────────── Safe
/// ```
#[derive(Debug, Default)]
pub struct DiagStateMachine {
    state: AtomicU8,
}

impl DiagStateMachine {
    /// Create a machine in [`DiagState::Disabled`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> DiagState {
        DiagState::from_raw(self.state.load(Ordering::Acquire)).unwrap_or(DiagState::Safe)
    }

    /// Returns true if the outputs must stay off.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.get() == DiagState::Safe
    }

    /// Move to `to`, returning the previous state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidTransition`] if `to` is not reachable
    /// from the current state.
    pub fn transition(&self, to: DiagState) -> Result<DiagState, StateError> {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                let from = DiagState::from_raw(raw).unwrap_or(DiagState::Safe);
                from.can_transition_to(to).then_some(to.to_raw())
            })
            .map(|raw| DiagState::from_raw(raw).unwrap_or(DiagState::Safe))
            .map_err(|raw| StateError::InvalidTransition {
                from: DiagState::from_raw(raw).unwrap_or(DiagState::Safe),
                to,
            })
    }

    /// Enter [`DiagState::Safe`] from any state.
    ///
    /// Returns the previous state, or `None` if the machine was already Safe.
    pub fn force_safe(&self) -> Option<DiagState> {
        let previous = self.state.swap(DiagState::Safe.to_raw(), Ordering::AcqRel);
        let previous = DiagState::from_raw(previous).unwrap_or(DiagState::Safe);
        (previous != DiagState::Safe).then_some(previous)
    }
}
