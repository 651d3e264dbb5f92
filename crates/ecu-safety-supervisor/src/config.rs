//! Safety configuration.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use ecu_safety_watchdog::{TriggerWindow, WindowSize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dispatch::{ErrorHandler, NotifyHandler};
use crate::error::ConfigError;

/// Numeric safety parameters.
///
/// Grouped apart from the handlers so they can be loaded from project
/// files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SafetyTiming {
    /// Debounce time for temporary faults in milliseconds.
    pub glitch_filter_time_ms: u32,
    /// Watchdog trigger period in microseconds.
    pub command_period_us: u32,
    /// Trigger window level.
    pub window_size: WindowSize,
    /// Number of watchdog resets permitted before latching the safe state.
    pub reset_behavior: u8,
}

impl SafetyTiming {
    /// Accepted glitch filter times in milliseconds.
    pub const GLITCH_FILTER_TIME_RANGE_MS: RangeInclusive<u32> = 1..=180;

    /// Largest accepted reset budget.
    pub const MAX_RESET_BEHAVIOR: u8 = 9;

    /// Validate the parameters and derive the trigger window.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<TriggerWindow, ConfigError> {
        if !Self::GLITCH_FILTER_TIME_RANGE_MS.contains(&self.glitch_filter_time_ms) {
            return Err(ConfigError::GlitchFilterTimeOutOfRange(
                self.glitch_filter_time_ms,
            ));
        }
        if self.reset_behavior > Self::MAX_RESET_BEHAVIOR {
            return Err(ConfigError::ResetBehaviorOutOfRange(self.reset_behavior));
        }
        Ok(TriggerWindow::new(self.command_period_us, self.window_size)?)
    }

    /// Glitch filter time in microseconds.
    #[must_use]
    pub fn glitch_filter_time_us(&self) -> u64 {
        u64::from(self.glitch_filter_time_ms) * 1_000
    }
}

impl Default for SafetyTiming {
    fn default() -> Self {
        Self {
            glitch_filter_time_ms: 10,
            command_period_us: 10_000,
            window_size: WindowSize::Percent25,
            reset_behavior: 0,
        }
    }
}

/// Complete safety configuration passed to [`crate::Supervisor::init`].
///
/// Immutable once the supervisor is initialized.
#[derive(Clone, Default)]
pub struct SafetyConfig {
    timing: SafetyTiming,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    notify_handler: Option<Arc<dyn NotifyHandler>>,
}

impl SafetyConfig {
    /// Configuration with `timing` and no handlers.
    #[must_use]
    pub fn new(timing: SafetyTiming) -> Self {
        Self {
            timing,
            error_handler: None,
            notify_handler: None,
        }
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> SafetyConfigBuilder {
        SafetyConfigBuilder::default()
    }

    /// Numeric parameters.
    #[must_use]
    pub fn timing(&self) -> &SafetyTiming {
        &self.timing
    }

    /// Handler for non-fatal faults.
    #[must_use]
    pub fn error_handler(&self) -> Option<&Arc<dyn ErrorHandler>> {
        self.error_handler.as_ref()
    }

    /// Handler for fatal faults.
    #[must_use]
    pub fn notify_handler(&self) -> Option<&Arc<dyn NotifyHandler>> {
        self.notify_handler.as_ref()
    }

    /// Validate the configuration and derive the trigger window.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<TriggerWindow, ConfigError> {
        self.timing.validate()
    }
}

impl fmt::Debug for SafetyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafetyConfig")
            .field("timing", &self.timing)
            .field("error_handler", &self.error_handler.is_some())
            .field("notify_handler", &self.notify_handler.is_some())
            .finish()
    }
}

/// Builder for [`SafetyConfig`].
#[derive(Default)]
pub struct SafetyConfigBuilder {
    config: SafetyConfig,
}

impl SafetyConfigBuilder {
    /// Replace all numeric parameters.
    #[must_use]
    pub fn timing(mut self, timing: SafetyTiming) -> Self {
        self.config.timing = timing;
        self
    }

    /// Set the glitch filter time in milliseconds.
    #[must_use]
    pub fn glitch_filter_time_ms(mut self, ms: u32) -> Self {
        self.config.timing.glitch_filter_time_ms = ms;
        self
    }

    /// Set the watchdog trigger period in microseconds.
    #[must_use]
    pub fn command_period_us(mut self, us: u32) -> Self {
        self.config.timing.command_period_us = us;
        self
    }

    /// Set the trigger window level.
    #[must_use]
    pub fn window_size(mut self, size: WindowSize) -> Self {
        self.config.timing.window_size = size;
        self
    }

    /// Set the number of permitted watchdog resets.
    #[must_use]
    pub fn reset_behavior(mut self, resets: u8) -> Self {
        self.config.timing.reset_behavior = resets;
        self
    }

    /// Install the handler for non-fatal faults.
    #[must_use]
    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.config.error_handler = Some(Arc::new(handler));
        self
    }

    /// Install the handler for fatal faults.
    #[must_use]
    pub fn notify_handler(mut self, handler: impl NotifyHandler + 'static) -> Self {
        self.config.notify_handler = Some(Arc::new(handler));
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<SafetyConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl fmt::Debug for SafetyConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafetyConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}
