//! Fault sources.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const ADC_CHANNELS: u8 = 24;
const PWM_CHANNELS: u8 = 36;
const PWD_CHANNELS: u8 = 12;
const DOUT_CHANNELS: u8 = 16;
const DIN_CHANNELS: u8 = 8;
const CAN_CHANNELS: u8 = 7;
const SENSOR_SUPPLIES: u8 = 3;

const ADC_BASE: u8 = 0;
const PWM_BASE: u8 = ADC_BASE + ADC_CHANNELS;
const PWD_BASE: u8 = PWM_BASE + PWM_CHANNELS;
const DOUT_BASE: u8 = PWD_BASE + PWD_CHANNELS;
const DIN_BASE: u8 = DOUT_BASE + DOUT_CHANNELS;
const CAN_BASE: u8 = DIN_BASE + DIN_CHANNELS;
const LIN_INDEX: u8 = CAN_BASE + CAN_CHANNELS;
const UART_INDEX: u8 = LIN_INDEX + 1;
const EEPROM_INDEX: u8 = UART_INDEX + 1;
const FLASH_INDEX: u8 = EEPROM_INDEX + 1;
const RTC_INDEX: u8 = FLASH_INDEX + 1;
const UBAT_INDEX: u8 = RTC_INDEX + 1;
const REF_2V5_INDEX: u8 = UBAT_INDEX + 1;
const SUPPLY_3V3_INDEX: u8 = REF_2V5_INDEX + 1;
const BOARD_TEMP_INDEX: u8 = SUPPLY_3V3_INDEX + 1;
const SENSOR_SUPPLY_BASE: u8 = BOARD_TEMP_INDEX + 1;
const CORE_INDEX: u8 = SENSOR_SUPPLY_BASE + SENSOR_SUPPLIES;
const WATCHDOG_INDEX: u8 = CORE_INDEX + 1;
const APPLICATION_INDEX: u8 = WATCHDOG_INDEX + 1;

/// Number of distinct devices; size of every per-device table.
pub const DEVICE_COUNT: usize = APPLICATION_INDEX as usize + 1;

/// Every source that can report a fault to the supervisor.
///
/// Channel-indexed variants carry the channel number. A channel outside the
/// range of its group is not a valid device: [`DeviceId::index`] returns
/// `None` and the classifier fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceId {
    /// Analog input channel (0..24).
    Adc(u8),
    /// PWM high-side output channel (0..36).
    Pwm(u8),
    /// Pulse/frequency input channel (0..12).
    Pwd(u8),
    /// Digital low-side output channel (0..16).
    DigitalOut(u8),
    /// Digital input channel (0..8).
    DigitalIn(u8),
    /// CAN controller (0..7).
    Can(u8),
    /// LIN master.
    Lin,
    /// Debug/service UART.
    Uart,
    /// External EEPROM.
    Eeprom,
    /// External flash.
    Flash,
    /// Real-time clock.
    Rtc,
    /// Battery voltage monitor.
    AdcUBat,
    /// 2.5V reference monitor.
    Adc2V5Ref,
    /// 3.3V supply monitor.
    Adc3V3Supply,
    /// Board temperature sensor.
    AdcBoardTemp,
    /// Sensor supply output monitor (0..3).
    AdcSensorSupply(u8),
    /// Main CPU core (self-tests, exceptions).
    Core,
    /// Companion watchdog CPU.
    Watchdog,
    /// Application and supervisor bookkeeping.
    Application,
}

/// Device families, used to check which codes a device may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceClass {
    /// Analog inputs.
    Adc,
    /// Internal analog supervision channels.
    AdcMonitor,
    /// PWM outputs.
    Pwm,
    /// Pulse inputs.
    Pwd,
    /// Digital outputs.
    DigitalOut,
    /// Digital inputs.
    DigitalIn,
    /// CAN controllers.
    Can,
    /// LIN master.
    Lin,
    /// UART.
    Uart,
    /// EEPROM.
    Eeprom,
    /// Flash.
    Flash,
    /// Real-time clock.
    Rtc,
    /// Main CPU core.
    Core,
    /// Companion watchdog CPU.
    Watchdog,
    /// Application and supervisor.
    Application,
}

impl DeviceId {
    /// Dense index in `0..DEVICE_COUNT`, or `None` for an out-of-range channel.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        let raw = match self {
            Self::Adc(ch) => channel(ADC_BASE, ch, ADC_CHANNELS),
            Self::Pwm(ch) => channel(PWM_BASE, ch, PWM_CHANNELS),
            Self::Pwd(ch) => channel(PWD_BASE, ch, PWD_CHANNELS),
            Self::DigitalOut(ch) => channel(DOUT_BASE, ch, DOUT_CHANNELS),
            Self::DigitalIn(ch) => channel(DIN_BASE, ch, DIN_CHANNELS),
            Self::Can(ch) => channel(CAN_BASE, ch, CAN_CHANNELS),
            Self::Lin => Some(LIN_INDEX),
            Self::Uart => Some(UART_INDEX),
            Self::Eeprom => Some(EEPROM_INDEX),
            Self::Flash => Some(FLASH_INDEX),
            Self::Rtc => Some(RTC_INDEX),
            Self::AdcUBat => Some(UBAT_INDEX),
            Self::Adc2V5Ref => Some(REF_2V5_INDEX),
            Self::Adc3V3Supply => Some(SUPPLY_3V3_INDEX),
            Self::AdcBoardTemp => Some(BOARD_TEMP_INDEX),
            Self::AdcSensorSupply(ch) => channel(SENSOR_SUPPLY_BASE, ch, SENSOR_SUPPLIES),
            Self::Core => Some(CORE_INDEX),
            Self::Watchdog => Some(WATCHDOG_INDEX),
            Self::Application => Some(APPLICATION_INDEX),
        };
        match raw {
            Some(i) => Some(i as usize),
            None => None,
        }
    }

    /// Returns true if the channel number is inside its group.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.index().is_some()
    }

    /// Resolve a raw device number as used on the driver interface.
    ///
    /// Raw numbers are the dense indices, so `from_raw` and [`Self::index`]
    /// are inverse over `0..DEVICE_COUNT`.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        let dev = match raw {
            r if r < PWM_BASE => Self::Adc(r - ADC_BASE),
            r if r < PWD_BASE => Self::Pwm(r - PWM_BASE),
            r if r < DOUT_BASE => Self::Pwd(r - PWD_BASE),
            r if r < DIN_BASE => Self::DigitalOut(r - DOUT_BASE),
            r if r < CAN_BASE => Self::DigitalIn(r - DIN_BASE),
            r if r < LIN_INDEX => Self::Can(r - CAN_BASE),
            LIN_INDEX => Self::Lin,
            UART_INDEX => Self::Uart,
            EEPROM_INDEX => Self::Eeprom,
            FLASH_INDEX => Self::Flash,
            RTC_INDEX => Self::Rtc,
            UBAT_INDEX => Self::AdcUBat,
            REF_2V5_INDEX => Self::Adc2V5Ref,
            SUPPLY_3V3_INDEX => Self::Adc3V3Supply,
            BOARD_TEMP_INDEX => Self::AdcBoardTemp,
            r if r < CORE_INDEX => Self::AdcSensorSupply(r - SENSOR_SUPPLY_BASE),
            CORE_INDEX => Self::Core,
            WATCHDOG_INDEX => Self::Watchdog,
            APPLICATION_INDEX => Self::Application,
            _ => return None,
        };
        Some(dev)
    }

    /// The family this device belongs to.
    #[must_use]
    pub const fn class(self) -> DeviceClass {
        match self {
            Self::Adc(_) => DeviceClass::Adc,
            Self::Pwm(_) => DeviceClass::Pwm,
            Self::Pwd(_) => DeviceClass::Pwd,
            Self::DigitalOut(_) => DeviceClass::DigitalOut,
            Self::DigitalIn(_) => DeviceClass::DigitalIn,
            Self::Can(_) => DeviceClass::Can,
            Self::Lin => DeviceClass::Lin,
            Self::Uart => DeviceClass::Uart,
            Self::Eeprom => DeviceClass::Eeprom,
            Self::Flash => DeviceClass::Flash,
            Self::Rtc => DeviceClass::Rtc,
            Self::AdcUBat
            | Self::Adc2V5Ref
            | Self::Adc3V3Supply
            | Self::AdcBoardTemp
            | Self::AdcSensorSupply(_) => DeviceClass::AdcMonitor,
            Self::Core => DeviceClass::Core,
            Self::Watchdog => DeviceClass::Watchdog,
            Self::Application => DeviceClass::Application,
        }
    }

    /// Returns true for devices that drive a controlled output.
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Pwm(_) | Self::DigitalOut(_))
    }

    /// Iterate over every valid device in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..DEVICE_COUNT).filter_map(|i| u8::try_from(i).ok().and_then(Self::from_raw))
    }
}

const fn channel(base: u8, ch: u8, count: u8) -> Option<u8> {
    if ch < count { Some(base + ch) } else { None }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adc(ch) => write!(f, "ADC {ch}"),
            Self::Pwm(ch) => write!(f, "PWM {ch}"),
            Self::Pwd(ch) => write!(f, "PWD {ch}"),
            Self::DigitalOut(ch) => write!(f, "DO {ch}"),
            Self::DigitalIn(ch) => write!(f, "DI {ch}"),
            Self::Can(ch) => write!(f, "CAN {ch}"),
            Self::Lin => write!(f, "LIN"),
            Self::Uart => write!(f, "UART"),
            Self::Eeprom => write!(f, "EEPROM"),
            Self::Flash => write!(f, "Flash"),
            Self::Rtc => write!(f, "RTC"),
            Self::AdcUBat => write!(f, "UBat monitor"),
            Self::Adc2V5Ref => write!(f, "2V5 reference monitor"),
            Self::Adc3V3Supply => write!(f, "3V3 supply monitor"),
            Self::AdcBoardTemp => write!(f, "board temperature"),
            Self::AdcSensorSupply(ch) => write!(f, "sensor supply {ch}"),
            Self::Core => write!(f, "main CPU"),
            Self::Watchdog => write!(f, "watchdog CPU"),
            Self::Application => write!(f, "application"),
        }
    }
}
