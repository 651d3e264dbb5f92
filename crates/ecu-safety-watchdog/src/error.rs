//! Error types for companion watchdog operations.

/// Errors that can occur during companion watchdog operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionError {
    /// Command period outside `1000..=50000` µs.
    CommandPeriodOutOfRange(u32),
    /// Trigger window narrower than the companion can resolve.
    WindowPrecision {
        /// Resulting `upper - lower` margin in microseconds.
        margin_us: u32,
        /// Minimum accepted margin in microseconds.
        required_us: u32,
    },
    /// State transition not allowed.
    InvalidTransition {
        /// Current state.
        from: &'static str,
        /// Attempted target state.
        to: &'static str,
    },
    /// The companion has not been activated with a trigger window.
    NotActivated,
    /// Safe state was already triggered.
    SafeStateAlreadyTriggered,
    /// The companion's status could not be retrieved.
    StatusUnavailable,
}

impl CompanionError {
    /// Create an invalid transition error.
    #[must_use]
    pub fn invalid_transition(from: &'static str, to: &'static str) -> Self {
        Self::InvalidTransition { from, to }
    }

    /// Returns true if the error stems from configuration rather than runtime.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::CommandPeriodOutOfRange(_) | Self::WindowPrecision { .. }
        )
    }
}

impl core::fmt::Display for CompanionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CommandPeriodOutOfRange(us) => {
                write!(f, "Command period {us}us outside 1000..=50000us")
            }
            Self::WindowPrecision {
                margin_us,
                required_us,
            } => write!(
                f,
                "Trigger window margin {margin_us}us below required {required_us}us"
            ),
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid companion transition: {from} -> {to}")
            }
            Self::NotActivated => write!(f, "Companion watchdog is not activated"),
            Self::SafeStateAlreadyTriggered => write!(f, "Safe state already triggered"),
            Self::StatusUnavailable => write!(f, "Companion watchdog status unavailable"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CompanionError {}

/// A specialized `Result` type for companion watchdog operations.
pub type CompanionResult<T> = core::result::Result<T, CompanionError>;

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CompanionError::NotActivated.to_string(),
            "Companion watchdog is not activated"
        );
        assert_eq!(
            CompanionError::WindowPrecision {
                margin_us: 31,
                required_us: 700
            }
            .to_string(),
            "Trigger window margin 31us below required 700us"
        );
        assert_eq!(
            CompanionError::invalid_transition("Safe", "Active").to_string(),
            "Invalid companion transition: Safe -> Active"
        );
    }

    #[test]
    fn test_configuration_errors() {
        assert!(CompanionError::CommandPeriodOutOfRange(500).is_configuration_error());
        assert!(!CompanionError::StatusUnavailable.is_configuration_error());
    }
}
