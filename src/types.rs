//! This module contains the enumerations and bitfields found in the controller registers.

use modular_bitfield::prelude::*;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Battery chemistry as configured in the settings block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum BatteryType {
    #[strum(to_string = "User Defined")]
    UserDefined,
    Sealed,
    Gel,
    Flooded,
    /// Any code we don't recognise. Carries the raw register value.
    #[strum(to_string = "Unknown")]
    Unknown(u16),
}

impl From<u16> for BatteryType {
    fn from(value: u16) -> Self {
        match value {
            0x00 => BatteryType::UserDefined,
            0x01 => BatteryType::Sealed,
            0x02 => BatteryType::Gel,
            0x03 => BatteryType::Flooded,
            other => BatteryType::Unknown(other),
        }
    }
}

/// Human readable name of a battery type register value. Never fails.
pub fn battery_type_name(code: u16) -> &'static str {
    BatteryType::from(code).into()
}

/// Charging mode reported in the rated data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChargingMode {
    #[strum(to_string = "Connect/Disconnect")]
    ConnectDisconnect,
    #[strum(to_string = "PWM")]
    Pwm,
    #[strum(to_string = "MPPT")]
    Mppt,
    #[strum(to_string = "Unknown")]
    Unknown(u16),
}

impl ChargingMode {
    /// The register value this mode was decoded from.
    pub const fn code(&self) -> u16 {
        match *self {
            ChargingMode::ConnectDisconnect => 0x00,
            ChargingMode::Pwm => 0x01,
            ChargingMode::Mppt => 0x02,
            ChargingMode::Unknown(code) => code,
        }
    }
}

impl From<u16> for ChargingMode {
    fn from(value: u16) -> Self {
        match value {
            0x00 => ChargingMode::ConnectDisconnect,
            0x01 => ChargingMode::Pwm,
            0x02 => ChargingMode::Mppt,
            other => ChargingMode::Unknown(other),
        }
    }
}

/// Battery voltage condition, bits D3-D0 of [`BatteryStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BatteryVoltageStatus {
    Normal,
    #[strum(to_string = "Over voltage")]
    OverVoltage,
    #[strum(to_string = "Under voltage")]
    UnderVoltage,
    #[strum(to_string = "Low voltage disconnect")]
    LowVoltageDisconnect,
    Fault,
    Unknown(u8),
}

impl From<u8> for BatteryVoltageStatus {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Normal,
            0x01 => Self::OverVoltage,
            0x02 => Self::UnderVoltage,
            0x03 => Self::LowVoltageDisconnect,
            0x04 => Self::Fault,
            other => Self::Unknown(other),
        }
    }
}

/// Battery temperature condition, bits D7-D4 of [`BatteryStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BatteryTemperatureStatus {
    Normal,
    /// Higher than the warning setting.
    #[strum(to_string = "Over temperature")]
    OverTemperature,
    /// Lower than the warning setting.
    #[strum(to_string = "Low temperature")]
    LowTemperature,
    Unknown(u8),
}

impl From<u8> for BatteryTemperatureStatus {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Normal,
            0x01 => Self::OverTemperature,
            0x02 => Self::LowTemperature,
            other => Self::Unknown(other),
        }
    }
}

/// Charging phase, bits D3-D2 of [`ChargingStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum ChargingPhase {
    #[strum(to_string = "No charging")]
    NotCharging,
    Float,
    Boost,
    Equalization,
}

impl From<u8> for ChargingPhase {
    fn from(value: u8) -> Self {
        // Only two bits wide.
        match value & 0b11 {
            0x00 => Self::NotCharging,
            0x01 => Self::Float,
            0x02 => Self::Boost,
            _ => Self::Equalization,
        }
    }
}

/// PV input voltage condition, bits D15-D14 of [`ChargingStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum InputVoltageStatus {
    Normal,
    #[strum(to_string = "No power connected")]
    NoPowerConnected,
    #[strum(to_string = "Higher voltage input")]
    HigherVoltageInput,
    #[strum(to_string = "Input voltage error")]
    InputVoltageError,
}

impl From<u8> for InputVoltageStatus {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0x00 => Self::Normal,
            0x01 => Self::NoPowerConnected,
            0x02 => Self::HigherVoltageInput,
            _ => Self::InputVoltageError,
        }
    }
}

/// "Battery status" register, `0x3200`.
///
/// The raw word is the ground truth. Use `u16::from` to get it back unchanged.
#[bitfield(bits = 16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    /// D3-D0, see [`BatteryVoltageStatus`].
    pub voltage_code: B4,
    /// D7-D4, see [`BatteryTemperatureStatus`].
    pub temperature_code: B4,
    /// D8: battery internal resistance abnormal.
    pub internal_resistance_abnormal: bool,
    #[skip]
    reserved: B6,
    /// D15: wrong identification for rated voltage.
    pub rated_voltage_mismatch: bool,
}

impl BatteryStatus {
    pub fn voltage(&self) -> BatteryVoltageStatus {
        self.voltage_code().into()
    }

    pub fn temperature(&self) -> BatteryTemperatureStatus {
        self.temperature_code().into()
    }
}

impl From<u16> for BatteryStatus {
    fn from(raw: u16) -> Self {
        Self::from_bytes(raw.to_le_bytes())
    }
}

impl From<BatteryStatus> for u16 {
    fn from(status: BatteryStatus) -> Self {
        u16::from_le_bytes(status.into_bytes())
    }
}

/// "Charging equipment status" register, `0x3201`.
///
/// The raw word is the ground truth. Use `u16::from` to get it back unchanged.
#[bitfield(bits = 16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargingStatus {
    #[skip]
    reserved_low: B1,
    /// D1: 0 normal, 1 fault.
    pub fault: bool,
    /// D3-D2, see [`ChargingPhase`].
    pub phase_code: B2,
    /// D4: PV input is short.
    pub pv_input_short: bool,
    #[skip]
    reserved_mid: B2,
    /// D7: load MOSFET is short.
    pub load_mosfet_short: bool,
    /// D8: the load is short.
    pub load_short: bool,
    /// D9: the load is over current.
    pub load_over_current: bool,
    /// D10: input is over current.
    pub input_over_current: bool,
    /// D11: anti-reverse MOSFET is short.
    pub anti_reverse_mosfet_short: bool,
    /// D12: charging or anti-reverse MOSFET is short.
    pub charging_or_anti_reverse_mosfet_short: bool,
    /// D13: charging MOSFET is short.
    pub charging_mosfet_short: bool,
    /// D15-D14, see [`InputVoltageStatus`].
    pub input_voltage_code: B2,
}

impl ChargingStatus {
    pub fn phase(&self) -> ChargingPhase {
        self.phase_code().into()
    }

    pub fn input_voltage(&self) -> InputVoltageStatus {
        self.input_voltage_code().into()
    }
}

impl From<u16> for ChargingStatus {
    fn from(raw: u16) -> Self {
        Self::from_bytes(raw.to_le_bytes())
    }
}

impl From<ChargingStatus> for u16 {
    fn from(status: ChargingStatus) -> Self {
        u16::from_le_bytes(status.into_bytes())
    }
}
