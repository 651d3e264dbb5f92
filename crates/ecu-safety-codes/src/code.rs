//! The canonical fault taxonomy.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::DeviceClass;

/// Whether a fault forces the safe state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    /// Forces the safe state regardless of the application's preference.
    Fatal,
    /// The application chooses the reaction.
    NonFatal,
}

impl Severity {
    /// Returns true for [`Severity::Fatal`].
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Whether a fault is debounced before it takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Persistence {
    /// Handled on first observation.
    Persistent,
    /// Held by the glitch filter until it has been present long enough.
    Temporary,
}

impl Persistence {
    /// Returns true for [`Persistence::Temporary`].
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Temporary)
    }
}

/// Canonical fault identifiers.
///
/// The discriminant is the raw code used on the driver interface. Severity,
/// persistence and the reporting device family are fixed per code; see
/// [`ErrorCode::severity`], [`ErrorCode::persistence`] and
/// [`ErrorCode::reported_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ErrorCode {
    /// No fault; reported by a driver when a condition has cleared.
    NoError = 0,

    // Analog inputs and supervision channels
    /// Input voltage or current outside the configured range.
    AdcRangeCheck = 1,
    /// Sensor supply output out of tolerance.
    AdcSensorSupply = 2,
    /// Board temperature outside the operating range.
    AdcBoardTemp = 3,
    /// 2.5V reference out of tolerance.
    Adc2V5Ref = 4,
    /// 3.3V supply out of tolerance.
    Adc3V3Supply = 5,
    /// Battery voltage out of tolerance.
    AdcUBat = 6,
    /// Resistive divider measurement implausible.
    AdcResistiveDivider = 7,
    /// Current loop input overcurrent.
    AdcCurrentLoopOvercurrent = 8,
    /// Conversion did not complete in time.
    AdcConversionTimeout = 9,
    /// Calibration data invalid.
    AdcCalibration = 10,

    // PWM outputs
    /// Output feedback voltage does not match the command.
    PwmFeedback = 11,
    /// Current feedback out of range.
    PwmCurrentFeedback = 12,
    /// Open load detected.
    PwmOpenLoad = 13,
    /// Short circuit detected.
    PwmShortCircuit = 14,
    /// Output overcurrent.
    PwmOvercurrent = 15,
    /// Shut-off group safety switch does not follow its command.
    PwmSafetySwitch = 16,
    /// Duty cycle register readback mismatch.
    PwmDutyReadback = 17,
    /// Period register readback mismatch.
    PwmPeriodReadback = 18,

    // Pulse inputs
    /// Measured frequency or pulse width out of range.
    PwdRange = 19,
    /// Input voltage threshold violated.
    PwdThreshold = 20,
    /// Current sensor threshold violated.
    PwdCurrentThreshold = 21,
    /// Capture timer overflow.
    PwdTimerOverflow = 22,
    /// Redundant capture channels disagree.
    PwdCaptureMismatch = 23,

    // Digital outputs and inputs
    /// Output feedback does not match the command.
    DoFeedback = 24,
    /// Open load detected.
    DoOpenLoad = 25,
    /// Short circuit detected.
    DoShortCircuit = 26,
    /// Output register readback mismatch.
    DoReadback = 27,
    /// Input voltage out of range.
    DiRange = 28,
    /// Input level between thresholds.
    DiThreshold = 29,

    // Communication
    /// CAN controller entered bus-off.
    CanBusOff = 30,
    /// CAN controller entered error-passive.
    CanErrorPassive = 31,
    /// CAN receive overrun.
    CanOverrun = 32,
    /// CAN transmission timed out.
    CanTxTimeout = 33,
    /// CAN controller configuration readback mismatch.
    CanConfiguration = 34,
    /// LIN checksum error.
    LinChecksum = 35,
    /// LIN slave response timeout.
    LinTimeout = 36,
    /// UART receive overrun.
    UartOverrun = 37,
    /// UART framing error.
    UartFraming = 38,

    // Non-volatile memory and clock
    /// EEPROM write failed.
    EepromWrite = 39,
    /// EEPROM read failed.
    EepromRead = 40,
    /// EEPROM content CRC mismatch.
    EepromCrc = 41,
    /// Flash write failed.
    FlashWrite = 42,
    /// Flash erase failed.
    FlashErase = 43,
    /// Uncorrectable flash ECC error.
    FlashEcc = 44,
    /// RTC oscillator stopped.
    RtcClockLoss = 45,

    // Startup self-tests
    /// RAM self-test failed.
    InitCoreRam = 46,
    /// Cache self-test failed.
    InitCoreCache = 47,
    /// Flash ECC self-test failed.
    InitCoreFlashEcc = 48,
    /// CPU self-test failed.
    InitCoreCpuSelfTest = 49,
    /// ADC self-test failed.
    InitCoreAdcSelfTest = 50,
    /// Interrupt controller self-test failed.
    InitCoreVim = 51,
    /// MPU self-test failed.
    InitCoreMpu = 52,
    /// DMA self-test failed.
    InitCoreDma = 53,
    /// IO multiplexer readback failed.
    InitCoreIoMux = 54,
    /// PLL lock check failed.
    InitCorePll = 55,
    /// Clock monitor self-test failed.
    InitCoreClockMonitor = 56,

    // Main CPU runtime
    /// Configuration register readback mismatch.
    CoreReadback = 57,
    /// Lockstep core comparison failed.
    CoreLockstep = 58,
    /// Data abort exception.
    CoreDataAbort = 59,
    /// Prefetch abort exception.
    CorePrefetchAbort = 60,
    /// Undefined instruction exception.
    CoreUndefinedInstruction = 61,
    /// High-level error signalling module interrupt.
    CoreEsmHighLevel = 62,
    /// Stack overflow detected.
    CoreStackOverflow = 63,
    /// Uncorrectable RAM ECC error.
    CoreRamEcc = 64,

    // Companion watchdog CPU
    /// Companion failed to initialise.
    ///
    /// Reported by the companion driver; the supervisor never raises it.
    WatchdogInit = 65,
    /// Companion did not activate.
    WatchdogActivation = 66,
    /// Trigger outside the window, or missing.
    WatchdogTriggerFailure = 67,
    /// Main CPU self-monitoring violation reported by the companion.
    ///
    /// Reported by the companion driver. Bracketing violations the
    /// supervisor detects itself are raised as [`Self::TaskCycleViolation`].
    WatchdogSelfMonitoring = 68,
    /// Companion status could not be retrieved.
    WatchdogStatusUnavailable = 69,
    /// Reset budget exhausted; permanent safe state latched.
    WatchdogResetBudgetExhausted = 70,

    // Supervisor and application
    /// Fatal fault raised from inside an error or notification handler.
    ErrorCallbackRecursion = 71,
    /// Diagnostic state inconsistent with the companion.
    InvalidDiagState = 72,
    /// Companion state inconsistent with the diagnostic state.
    InvalidWatchdogState = 73,
    /// Application requested the safe state from its error handler.
    ApplicationSafeState = 74,
    /// Task bracketing violated (nested begin or unmatched end).
    TaskCycleViolation = 75,

    /// Unrecognised report; treated as fatal and persistent.
    Unknown = 255,
}

impl ErrorCode {
    /// Every code in raw order.
    pub const ALL: [Self; 77] = [
        Self::NoError,
        Self::AdcRangeCheck,
        Self::AdcSensorSupply,
        Self::AdcBoardTemp,
        Self::Adc2V5Ref,
        Self::Adc3V3Supply,
        Self::AdcUBat,
        Self::AdcResistiveDivider,
        Self::AdcCurrentLoopOvercurrent,
        Self::AdcConversionTimeout,
        Self::AdcCalibration,
        Self::PwmFeedback,
        Self::PwmCurrentFeedback,
        Self::PwmOpenLoad,
        Self::PwmShortCircuit,
        Self::PwmOvercurrent,
        Self::PwmSafetySwitch,
        Self::PwmDutyReadback,
        Self::PwmPeriodReadback,
        Self::PwdRange,
        Self::PwdThreshold,
        Self::PwdCurrentThreshold,
        Self::PwdTimerOverflow,
        Self::PwdCaptureMismatch,
        Self::DoFeedback,
        Self::DoOpenLoad,
        Self::DoShortCircuit,
        Self::DoReadback,
        Self::DiRange,
        Self::DiThreshold,
        Self::CanBusOff,
        Self::CanErrorPassive,
        Self::CanOverrun,
        Self::CanTxTimeout,
        Self::CanConfiguration,
        Self::LinChecksum,
        Self::LinTimeout,
        Self::UartOverrun,
        Self::UartFraming,
        Self::EepromWrite,
        Self::EepromRead,
        Self::EepromCrc,
        Self::FlashWrite,
        Self::FlashErase,
        Self::FlashEcc,
        Self::RtcClockLoss,
        Self::InitCoreRam,
        Self::InitCoreCache,
        Self::InitCoreFlashEcc,
        Self::InitCoreCpuSelfTest,
        Self::InitCoreAdcSelfTest,
        Self::InitCoreVim,
        Self::InitCoreMpu,
        Self::InitCoreDma,
        Self::InitCoreIoMux,
        Self::InitCorePll,
        Self::InitCoreClockMonitor,
        Self::CoreReadback,
        Self::CoreLockstep,
        Self::CoreDataAbort,
        Self::CorePrefetchAbort,
        Self::CoreUndefinedInstruction,
        Self::CoreEsmHighLevel,
        Self::CoreStackOverflow,
        Self::CoreRamEcc,
        Self::WatchdogInit,
        Self::WatchdogActivation,
        Self::WatchdogTriggerFailure,
        Self::WatchdogSelfMonitoring,
        Self::WatchdogStatusUnavailable,
        Self::WatchdogResetBudgetExhausted,
        Self::ErrorCallbackRecursion,
        Self::InvalidDiagState,
        Self::InvalidWatchdogState,
        Self::ApplicationSafeState,
        Self::TaskCycleViolation,
        Self::Unknown,
    ];

    /// The raw code used on the driver interface.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Look up a raw code.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i] as u8 == raw {
                return Some(Self::ALL[i]);
            }
            i += 1;
        }
        None
    }

    /// Static severity of the code.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::NoError
            | Self::AdcRangeCheck
            | Self::AdcSensorSupply
            | Self::AdcResistiveDivider
            | Self::AdcCurrentLoopOvercurrent
            | Self::PwmFeedback
            | Self::PwmCurrentFeedback
            | Self::PwmOpenLoad
            | Self::PwmShortCircuit
            | Self::PwmOvercurrent
            | Self::PwdRange
            | Self::PwdThreshold
            | Self::PwdCurrentThreshold
            | Self::PwdTimerOverflow
            | Self::DoFeedback
            | Self::DoOpenLoad
            | Self::DoShortCircuit
            | Self::DiRange
            | Self::DiThreshold
            | Self::CanBusOff
            | Self::CanErrorPassive
            | Self::CanOverrun
            | Self::CanTxTimeout
            | Self::LinChecksum
            | Self::LinTimeout
            | Self::UartOverrun
            | Self::UartFraming
            | Self::EepromWrite
            | Self::EepromRead
            | Self::FlashWrite
            | Self::FlashErase
            | Self::RtcClockLoss => Severity::NonFatal,

            Self::AdcBoardTemp
            | Self::Adc2V5Ref
            | Self::Adc3V3Supply
            | Self::AdcUBat
            | Self::AdcConversionTimeout
            | Self::AdcCalibration
            | Self::PwmSafetySwitch
            | Self::PwmDutyReadback
            | Self::PwmPeriodReadback
            | Self::PwdCaptureMismatch
            | Self::DoReadback
            | Self::CanConfiguration
            | Self::EepromCrc
            | Self::FlashEcc
            | Self::InitCoreRam
            | Self::InitCoreCache
            | Self::InitCoreFlashEcc
            | Self::InitCoreCpuSelfTest
            | Self::InitCoreAdcSelfTest
            | Self::InitCoreVim
            | Self::InitCoreMpu
            | Self::InitCoreDma
            | Self::InitCoreIoMux
            | Self::InitCorePll
            | Self::InitCoreClockMonitor
            | Self::CoreReadback
            | Self::CoreLockstep
            | Self::CoreDataAbort
            | Self::CorePrefetchAbort
            | Self::CoreUndefinedInstruction
            | Self::CoreEsmHighLevel
            | Self::CoreStackOverflow
            | Self::CoreRamEcc
            | Self::WatchdogInit
            | Self::WatchdogActivation
            | Self::WatchdogTriggerFailure
            | Self::WatchdogSelfMonitoring
            | Self::WatchdogStatusUnavailable
            | Self::WatchdogResetBudgetExhausted
            | Self::ErrorCallbackRecursion
            | Self::InvalidDiagState
            | Self::InvalidWatchdogState
            | Self::ApplicationSafeState
            | Self::TaskCycleViolation
            | Self::Unknown => Severity::Fatal,
        }
    }

    /// Static persistence of the code.
    #[must_use]
    pub const fn persistence(self) -> Persistence {
        match self {
            Self::AdcRangeCheck
            | Self::AdcSensorSupply
            | Self::AdcBoardTemp
            | Self::Adc2V5Ref
            | Self::Adc3V3Supply
            | Self::AdcUBat
            | Self::AdcResistiveDivider
            | Self::AdcCurrentLoopOvercurrent
            | Self::PwmFeedback
            | Self::PwmCurrentFeedback
            | Self::PwmOpenLoad
            | Self::PwmShortCircuit
            | Self::PwmOvercurrent
            | Self::PwdRange
            | Self::PwdThreshold
            | Self::PwdCurrentThreshold
            | Self::PwdTimerOverflow
            | Self::DoFeedback
            | Self::DoOpenLoad
            | Self::DoShortCircuit
            | Self::DiRange
            | Self::DiThreshold
            | Self::CanErrorPassive
            | Self::CanTxTimeout
            | Self::LinTimeout => Persistence::Temporary,

            Self::NoError
            | Self::AdcConversionTimeout
            | Self::AdcCalibration
            | Self::PwmSafetySwitch
            | Self::PwmDutyReadback
            | Self::PwmPeriodReadback
            | Self::PwdCaptureMismatch
            | Self::DoReadback
            | Self::CanBusOff
            | Self::CanOverrun
            | Self::CanConfiguration
            | Self::LinChecksum
            | Self::UartOverrun
            | Self::UartFraming
            | Self::EepromWrite
            | Self::EepromRead
            | Self::EepromCrc
            | Self::FlashWrite
            | Self::FlashErase
            | Self::FlashEcc
            | Self::RtcClockLoss
            | Self::InitCoreRam
            | Self::InitCoreCache
            | Self::InitCoreFlashEcc
            | Self::InitCoreCpuSelfTest
            | Self::InitCoreAdcSelfTest
            | Self::InitCoreVim
            | Self::InitCoreMpu
            | Self::InitCoreDma
            | Self::InitCoreIoMux
            | Self::InitCorePll
            | Self::InitCoreClockMonitor
            | Self::CoreReadback
            | Self::CoreLockstep
            | Self::CoreDataAbort
            | Self::CorePrefetchAbort
            | Self::CoreUndefinedInstruction
            | Self::CoreEsmHighLevel
            | Self::CoreStackOverflow
            | Self::CoreRamEcc
            | Self::WatchdogInit
            | Self::WatchdogActivation
            | Self::WatchdogTriggerFailure
            | Self::WatchdogSelfMonitoring
            | Self::WatchdogStatusUnavailable
            | Self::WatchdogResetBudgetExhausted
            | Self::ErrorCallbackRecursion
            | Self::InvalidDiagState
            | Self::InvalidWatchdogState
            | Self::ApplicationSafeState
            | Self::TaskCycleViolation
            | Self::Unknown => Persistence::Persistent,
        }
    }

    /// The device family allowed to report this code.
    ///
    /// `None` means any device may report it (`NoError`, `Unknown`).
    #[must_use]
    pub const fn reported_by(self) -> Option<DeviceClass> {
        let class = match self {
            Self::NoError | Self::Unknown => return None,
            Self::AdcRangeCheck
            | Self::AdcResistiveDivider
            | Self::AdcCurrentLoopOvercurrent
            | Self::AdcConversionTimeout
            | Self::AdcCalibration => DeviceClass::Adc,
            Self::AdcSensorSupply
            | Self::AdcBoardTemp
            | Self::Adc2V5Ref
            | Self::Adc3V3Supply
            | Self::AdcUBat => DeviceClass::AdcMonitor,
            Self::PwmFeedback
            | Self::PwmCurrentFeedback
            | Self::PwmOpenLoad
            | Self::PwmShortCircuit
            | Self::PwmOvercurrent
            | Self::PwmSafetySwitch
            | Self::PwmDutyReadback
            | Self::PwmPeriodReadback => DeviceClass::Pwm,
            Self::PwdRange
            | Self::PwdThreshold
            | Self::PwdCurrentThreshold
            | Self::PwdTimerOverflow
            | Self::PwdCaptureMismatch => DeviceClass::Pwd,
            Self::DoFeedback | Self::DoOpenLoad | Self::DoShortCircuit | Self::DoReadback => {
                DeviceClass::DigitalOut
            }
            Self::DiRange | Self::DiThreshold => DeviceClass::DigitalIn,
            Self::CanBusOff
            | Self::CanErrorPassive
            | Self::CanOverrun
            | Self::CanTxTimeout
            | Self::CanConfiguration => DeviceClass::Can,
            Self::LinChecksum | Self::LinTimeout => DeviceClass::Lin,
            Self::UartOverrun | Self::UartFraming => DeviceClass::Uart,
            Self::EepromWrite | Self::EepromRead | Self::EepromCrc => DeviceClass::Eeprom,
            Self::FlashWrite | Self::FlashErase | Self::FlashEcc => DeviceClass::Flash,
            Self::RtcClockLoss => DeviceClass::Rtc,
            Self::InitCoreRam
            | Self::InitCoreCache
            | Self::InitCoreFlashEcc
            | Self::InitCoreCpuSelfTest
            | Self::InitCoreAdcSelfTest
            | Self::InitCoreVim
            | Self::InitCoreMpu
            | Self::InitCoreDma
            | Self::InitCoreIoMux
            | Self::InitCorePll
            | Self::InitCoreClockMonitor
            | Self::CoreReadback
            | Self::CoreLockstep
            | Self::CoreDataAbort
            | Self::CorePrefetchAbort
            | Self::CoreUndefinedInstruction
            | Self::CoreEsmHighLevel
            | Self::CoreStackOverflow
            | Self::CoreRamEcc => DeviceClass::Core,
            Self::WatchdogInit
            | Self::WatchdogActivation
            | Self::WatchdogTriggerFailure
            | Self::WatchdogSelfMonitoring
            | Self::WatchdogStatusUnavailable
            | Self::WatchdogResetBudgetExhausted => DeviceClass::Watchdog,
            Self::ErrorCallbackRecursion
            | Self::InvalidDiagState
            | Self::InvalidWatchdogState
            | Self::ApplicationSafeState
            | Self::TaskCycleViolation => DeviceClass::Application,
        };
        Some(class)
    }

    /// Returns true if `class` may report this code.
    #[must_use]
    pub const fn accepts(self, class: DeviceClass) -> bool {
        match self.reported_by() {
            None => true,
            Some(expected) => expected as u8 == class as u8,
        }
    }

    /// Returns true for the startup self-test family.
    #[must_use]
    pub const fn is_startup_self_test(self) -> bool {
        let raw = self.raw();
        raw >= Self::InitCoreRam.raw() && raw <= Self::InitCoreClockMonitor.raw()
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoError => "no error",
            Self::AdcRangeCheck => "analog input out of range",
            Self::AdcSensorSupply => "sensor supply out of tolerance",
            Self::AdcBoardTemp => "board temperature out of range",
            Self::Adc2V5Ref => "2.5V reference out of tolerance",
            Self::Adc3V3Supply => "3.3V supply out of tolerance",
            Self::AdcUBat => "battery voltage out of tolerance",
            Self::AdcResistiveDivider => "resistive divider implausible",
            Self::AdcCurrentLoopOvercurrent => "current loop overcurrent",
            Self::AdcConversionTimeout => "ADC conversion timeout",
            Self::AdcCalibration => "ADC calibration invalid",
            Self::PwmFeedback => "PWM feedback mismatch",
            Self::PwmCurrentFeedback => "PWM current feedback out of range",
            Self::PwmOpenLoad => "PWM open load",
            Self::PwmShortCircuit => "PWM short circuit",
            Self::PwmOvercurrent => "PWM overcurrent",
            Self::PwmSafetySwitch => "shut-off group safety switch fault",
            Self::PwmDutyReadback => "PWM duty readback mismatch",
            Self::PwmPeriodReadback => "PWM period readback mismatch",
            Self::PwdRange => "pulse input out of range",
            Self::PwdThreshold => "pulse input threshold violated",
            Self::PwdCurrentThreshold => "pulse input current threshold violated",
            Self::PwdTimerOverflow => "pulse capture timer overflow",
            Self::PwdCaptureMismatch => "redundant capture mismatch",
            Self::DoFeedback => "digital output feedback mismatch",
            Self::DoOpenLoad => "digital output open load",
            Self::DoShortCircuit => "digital output short circuit",
            Self::DoReadback => "digital output readback mismatch",
            Self::DiRange => "digital input out of range",
            Self::DiThreshold => "digital input between thresholds",
            Self::CanBusOff => "CAN bus-off",
            Self::CanErrorPassive => "CAN error-passive",
            Self::CanOverrun => "CAN receive overrun",
            Self::CanTxTimeout => "CAN transmit timeout",
            Self::CanConfiguration => "CAN configuration readback mismatch",
            Self::LinChecksum => "LIN checksum error",
            Self::LinTimeout => "LIN response timeout",
            Self::UartOverrun => "UART overrun",
            Self::UartFraming => "UART framing error",
            Self::EepromWrite => "EEPROM write failed",
            Self::EepromRead => "EEPROM read failed",
            Self::EepromCrc => "EEPROM CRC mismatch",
            Self::FlashWrite => "flash write failed",
            Self::FlashErase => "flash erase failed",
            Self::FlashEcc => "flash ECC error",
            Self::RtcClockLoss => "RTC oscillator stopped",
            Self::InitCoreRam => "RAM self-test failed",
            Self::InitCoreCache => "cache self-test failed",
            Self::InitCoreFlashEcc => "flash ECC self-test failed",
            Self::InitCoreCpuSelfTest => "CPU self-test failed",
            Self::InitCoreAdcSelfTest => "ADC self-test failed",
            Self::InitCoreVim => "interrupt controller self-test failed",
            Self::InitCoreMpu => "MPU self-test failed",
            Self::InitCoreDma => "DMA self-test failed",
            Self::InitCoreIoMux => "IO multiplexer readback failed",
            Self::InitCorePll => "PLL lock failed",
            Self::InitCoreClockMonitor => "clock monitor self-test failed",
            Self::CoreReadback => "core register readback mismatch",
            Self::CoreLockstep => "lockstep comparison failed",
            Self::CoreDataAbort => "data abort",
            Self::CorePrefetchAbort => "prefetch abort",
            Self::CoreUndefinedInstruction => "undefined instruction",
            Self::CoreEsmHighLevel => "high-level ESM interrupt",
            Self::CoreStackOverflow => "stack overflow",
            Self::CoreRamEcc => "RAM ECC error",
            Self::WatchdogInit => "watchdog CPU initialisation failed",
            Self::WatchdogActivation => "watchdog CPU activation failed",
            Self::WatchdogTriggerFailure => "watchdog trigger outside window",
            Self::WatchdogSelfMonitoring => "main CPU self-monitoring violation",
            Self::WatchdogStatusUnavailable => "watchdog CPU status unavailable",
            Self::WatchdogResetBudgetExhausted => "watchdog reset budget exhausted",
            Self::ErrorCallbackRecursion => "fatal fault raised inside a callback",
            Self::InvalidDiagState => "invalid diagnostic state",
            Self::InvalidWatchdogState => "invalid watchdog state",
            Self::ApplicationSafeState => "application requested safe state",
            Self::TaskCycleViolation => "task begin/end bracketing violated",
            Self::Unknown => "unrecognised fault",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_in_raw_order() {
        let mut prev: Option<u8> = None;
        for code in ErrorCode::ALL {
            if let Some(p) = prev {
                assert!(code.raw() > p, "{code:?} out of order");
            }
            prev = Some(code.raw());
        }
    }

    #[test]
    fn test_from_raw_inverts_raw() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_raw(code.raw()), Some(code));
        }
        assert_eq!(ErrorCode::from_raw(76), None);
        assert_eq!(ErrorCode::from_raw(200), None);
    }

    #[test]
    fn test_reference_entries() {
        assert_eq!(ErrorCode::AdcRangeCheck.severity(), Severity::NonFatal);
        assert_eq!(
            ErrorCode::AdcRangeCheck.persistence(),
            Persistence::Temporary
        );

        assert_eq!(ErrorCode::AdcUBat.raw(), 6);
        assert_eq!(ErrorCode::AdcUBat.severity(), Severity::Fatal);
        assert_eq!(ErrorCode::AdcUBat.persistence(), Persistence::Temporary);

        for code in [
            ErrorCode::InitCoreCpuSelfTest,
            ErrorCode::WatchdogTriggerFailure,
            ErrorCode::ErrorCallbackRecursion,
            ErrorCode::Unknown,
        ] {
            assert!(code.severity().is_fatal());
            assert!(!code.persistence().is_temporary());
        }
    }

    #[test]
    fn test_startup_self_test_family() {
        let family: usize = ErrorCode::ALL
            .iter()
            .filter(|c| c.is_startup_self_test())
            .count();
        assert_eq!(family, 11);
        assert!(ErrorCode::InitCoreCpuSelfTest.is_startup_self_test());
        assert!(!ErrorCode::CoreLockstep.is_startup_self_test());
    }

    #[test]
    fn test_reporting_class() {
        assert!(ErrorCode::AdcUBat.accepts(DeviceClass::AdcMonitor));
        assert!(!ErrorCode::AdcUBat.accepts(DeviceClass::Pwm));
        assert!(ErrorCode::NoError.accepts(DeviceClass::Can));
    }
}
