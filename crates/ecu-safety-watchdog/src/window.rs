//! Trigger window derivation.
//!
//! The companion accepts a trigger only if the interval since the previous
//! trigger lies inside `[lower_bound, upper_bound]`. For a chosen window
//! level `c` (percent of the command period `P`):
//!
//! ```text
//! actual = (400 / (200 - c) - 2) * 100
//! lower  = P * (1 - actual / 200)  =  P * (200 - 2c) / (200 - c)
//! upper  = P * (1 + actual / 200)  =  P * 200 / (200 - c)
//! ```
//!
//! The bounds are computed in integer milli-percent and rounded to the
//! nearest microsecond.

use core::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::companion::TriggerVerdict;
use crate::error::{CompanionError, CompanionResult};

/// 200% expressed in milli-percent.
const FULL_SCALE_MILLI: u64 = 200_000;

/// Discrete window size levels supported by the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowSize {
    /// 100%
    Percent100,
    /// 50%
    Percent50,
    /// 25%
    #[default]
    Percent25,
    /// 12.5%
    Percent12_5,
    /// 6.25%
    Percent6_25,
    /// 3.125%
    Percent3_125,
}

impl WindowSize {
    /// All levels, widest first.
    pub const ALL: [Self; 6] = [
        Self::Percent100,
        Self::Percent50,
        Self::Percent25,
        Self::Percent12_5,
        Self::Percent6_25,
        Self::Percent3_125,
    ];

    /// The chosen percentage in thousandths of a percent.
    #[must_use]
    pub const fn milli_percent(self) -> u32 {
        match self {
            Self::Percent100 => 100_000,
            Self::Percent50 => 50_000,
            Self::Percent25 => 25_000,
            Self::Percent12_5 => 12_500,
            Self::Percent6_25 => 6_250,
            Self::Percent3_125 => 3_125,
        }
    }
}

/// Trigger acceptance window derived from the command period.
///
/// # Real-Time Safety
///
/// Construction performs a handful of integer operations; [`Self::check`]
/// is two comparisons. Neither allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriggerWindow {
    command_period_us: u32,
    window_size: WindowSize,
    lower_bound_us: u32,
    upper_bound_us: u32,
}

impl TriggerWindow {
    /// Smallest `upper - lower` margin the companion can resolve.
    pub const MIN_MARGIN_US: u32 = 700;

    /// Accepted command periods in microseconds.
    pub const COMMAND_PERIOD_RANGE_US: RangeInclusive<u32> = 1_000..=50_000;

    /// Derive the window for `command_period_us` and `window_size`.
    ///
    /// # Errors
    ///
    /// - [`CompanionError::CommandPeriodOutOfRange`] if the period is outside
    ///   [`Self::COMMAND_PERIOD_RANGE_US`]
    /// - [`CompanionError::WindowPrecision`] if the margin is below
    ///   [`Self::MIN_MARGIN_US`]
    pub fn new(command_period_us: u32, window_size: WindowSize) -> CompanionResult<Self> {
        if !Self::COMMAND_PERIOD_RANGE_US.contains(&command_period_us) {
            return Err(CompanionError::CommandPeriodOutOfRange(command_period_us));
        }

        let period = u64::from(command_period_us);
        let chosen = u64::from(window_size.milli_percent());
        let denom = FULL_SCALE_MILLI - chosen;

        let lower = div_round(period * (FULL_SCALE_MILLI - 2 * chosen), denom);
        let upper = div_round(period * FULL_SCALE_MILLI, denom);

        // Both bounds are at most 2 * 50_000.
        let lower_bound_us = u32::try_from(lower).unwrap_or(u32::MAX);
        let upper_bound_us = u32::try_from(upper).unwrap_or(u32::MAX);

        let margin_us = upper_bound_us.saturating_sub(lower_bound_us);
        if margin_us < Self::MIN_MARGIN_US {
            return Err(CompanionError::WindowPrecision {
                margin_us,
                required_us: Self::MIN_MARGIN_US,
            });
        }

        Ok(Self {
            command_period_us,
            window_size,
            lower_bound_us,
            upper_bound_us,
        })
    }

    /// Nominal trigger period in microseconds.
    #[must_use]
    pub fn command_period_us(&self) -> u32 {
        self.command_period_us
    }

    /// Configured window level.
    #[must_use]
    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    /// Earliest accepted trigger interval in microseconds.
    #[must_use]
    pub fn lower_bound_us(&self) -> u32 {
        self.lower_bound_us
    }

    /// Latest accepted trigger interval in microseconds.
    #[must_use]
    pub fn upper_bound_us(&self) -> u32 {
        self.upper_bound_us
    }

    /// Width of the window in microseconds.
    #[must_use]
    pub fn margin_us(&self) -> u32 {
        self.upper_bound_us - self.lower_bound_us
    }

    /// The effective window in hundredths of a percent of the command period.
    ///
    /// For the 25% level this is 2857 (28.57%).
    #[must_use]
    pub fn actual_percent_hundredths(&self) -> u32 {
        let chosen = u64::from(self.window_size.milli_percent());
        let value = div_round(20_000 * chosen, FULL_SCALE_MILLI - chosen);
        u32::try_from(value).unwrap_or(u32::MAX)
    }

    /// Returns true if a trigger interval of `elapsed_us` is accepted.
    #[must_use]
    pub fn contains(&self, elapsed_us: u64) -> bool {
        elapsed_us >= u64::from(self.lower_bound_us) && elapsed_us <= u64::from(self.upper_bound_us)
    }

    /// Judge a trigger interval against the window.
    #[must_use]
    pub fn check(&self, elapsed_us: u64) -> TriggerVerdict {
        if elapsed_us < u64::from(self.lower_bound_us) {
            TriggerVerdict::TooEarly { elapsed_us }
        } else if elapsed_us > u64::from(self.upper_bound_us) {
            TriggerVerdict::TooLate { elapsed_us }
        } else {
            TriggerVerdict::Accepted { elapsed_us }
        }
    }

    /// Returns true if `elapsed_us` without a trigger is already too late.
    #[must_use]
    pub fn is_overdue(&self, elapsed_us: u64) -> bool {
        elapsed_us > u64::from(self.upper_bound_us)
    }
}

fn div_round(num: u64, denom: u64) -> u64 {
    (num + denom / 2) / denom
}
