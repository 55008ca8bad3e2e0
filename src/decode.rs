//! Decoding of raw register blocks into typed records.
//!
//! Decoding is pure: every record is built from a slice of register words as returned by a single
//! block read, and nothing else. The length of the slice is checked before any field is read, so a
//! short read never produces a partially filled record.

use thiserror::Error;

use crate::{
    register::{
        RegisterBlock, real_time_data, real_time_status, rated_data, settings,
        statistical_parameters,
    },
    types::{BatteryStatus, BatteryType, ChargingMode, ChargingStatus},
};

/// Decoding failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{block} needs {expected} registers but only {actual} were supplied")]
    ShortBuffer {
        block: RegisterBlock,
        expected: usize,
        actual: usize,
    },
}

/// A record decoded from one fixed register block.
pub trait BlockRecord: Sized {
    /// The block this record is decoded from.
    const BLOCK: RegisterBlock;

    /// Decode the record from the words of [`Self::BLOCK`], starting at its first register.
    fn from_words(words: &[u16]) -> Result<Self, DecodeError>;
}

fn check_len(block: RegisterBlock, words: &[u16]) -> Result<(), DecodeError> {
    let expected = block.word_count() as usize;
    if words.len() < expected {
        return Err(DecodeError::ShortBuffer {
            block,
            expected,
            actual: words.len(),
        });
    }
    Ok(())
}

/// Nameplate ratings of the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatedData {
    /// V
    pub pv_voltage: f64,
    /// A
    pub pv_current: f64,
    /// W
    pub pv_power: f64,
    /// V
    pub battery_voltage: f64,
    /// A
    pub battery_current: f64,
    /// W
    pub battery_power: f64,
    pub charging_mode: ChargingMode,
}

impl BlockRecord for RatedData {
    const BLOCK: RegisterBlock = RegisterBlock::RatedData;

    fn from_words(words: &[u16]) -> Result<Self, DecodeError> {
        use rated_data::*;
        check_len(Self::BLOCK, words)?;

        Ok(Self {
            pv_voltage: PV_VOLTAGE.value(words),
            pv_current: PV_CURRENT.value(words),
            pv_power: PV_POWER.value(words),
            battery_voltage: BATTERY_VOLTAGE.value(words),
            battery_current: BATTERY_CURRENT.value(words),
            battery_power: BATTERY_POWER.value(words),
            charging_mode: CHARGING_MODE.word(words).into(),
        })
    }
}

/// Live measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealTimeData {
    pub pv_voltage: f64,
    pub pv_current: f64,
    pub pv_power: f64,
    pub battery_voltage: f64,
    pub battery_current: f64,
    pub battery_power: f64,
    pub load_voltage: f64,
    pub load_current: f64,
    pub load_power: f64,
    /// °C
    pub battery_temperature: f64,
    /// °C
    pub case_temperature: f64,
    /// °C
    pub components_temperature: f64,
}

impl BlockRecord for RealTimeData {
    const BLOCK: RegisterBlock = RegisterBlock::RealTimeData;

    fn from_words(words: &[u16]) -> Result<Self, DecodeError> {
        use real_time_data::*;
        check_len(Self::BLOCK, words)?;

        Ok(Self {
            pv_voltage: PV_VOLTAGE.value(words),
            pv_current: PV_CURRENT.value(words),
            pv_power: PV_POWER.value(words),
            battery_voltage: BATTERY_VOLTAGE.value(words),
            battery_current: BATTERY_CURRENT.value(words),
            battery_power: BATTERY_POWER.value(words),
            load_voltage: LOAD_VOLTAGE.value(words),
            load_current: LOAD_CURRENT.value(words),
            load_power: LOAD_POWER.value(words),
            battery_temperature: BATTERY_TEMPERATURE.value(words),
            case_temperature: CASE_TEMPERATURE.value(words),
            components_temperature: COMPONENTS_TEMPERATURE.value(words),
        })
    }
}

/// The two status words. Neither is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealTimeStatus {
    pub battery_status: BatteryStatus,
    pub charging_status: ChargingStatus,
}

impl BlockRecord for RealTimeStatus {
    const BLOCK: RegisterBlock = RegisterBlock::RealTimeStatus;

    fn from_words(words: &[u16]) -> Result<Self, DecodeError> {
        use real_time_status::*;
        check_len(Self::BLOCK, words)?;

        Ok(Self {
            battery_status: BATTERY_STATUS.word(words).into(),
            charging_status: CHARGING_STATUS.word(words).into(),
        })
    }
}

/// Battery configuration and charging setpoints. All voltages in V.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub battery_type: BatteryType,
    /// Ah
    pub battery_capacity: u16,
    pub temperature_compensation_coefficient: f64,
    pub high_voltage_disconnect: f64,
    pub charging_limit_voltage: f64,
    pub over_voltage_reconnect: f64,
    pub equalization_voltage: f64,
    pub boost_voltage: f64,
    pub float_voltage: f64,
    pub boost_reconnect_voltage: f64,
}

impl BlockRecord for Settings {
    const BLOCK: RegisterBlock = RegisterBlock::Settings;

    fn from_words(words: &[u16]) -> Result<Self, DecodeError> {
        use settings::*;
        check_len(Self::BLOCK, words)?;

        Ok(Self {
            battery_type: BATTERY_TYPE.word(words).into(),
            battery_capacity: BATTERY_CAPACITY.word(words),
            temperature_compensation_coefficient: TEMPERATURE_COMPENSATION_COEFFICIENT
                .value(words),
            high_voltage_disconnect: HIGH_VOLTAGE_DISCONNECT.value(words),
            charging_limit_voltage: CHARGING_LIMIT_VOLTAGE.value(words),
            over_voltage_reconnect: OVER_VOLTAGE_RECONNECT.value(words),
            equalization_voltage: EQUALIZATION_VOLTAGE.value(words),
            boost_voltage: BOOST_VOLTAGE.value(words),
            float_voltage: FLOAT_VOLTAGE.value(words),
            boost_reconnect_voltage: BOOST_RECONNECT_VOLTAGE.value(words),
        })
    }
}

/// Daily extremes and energy counters. Energy in kWh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalParameters {
    pub max_pv_voltage_today: f64,
    pub min_pv_voltage_today: f64,
    pub max_battery_voltage_today: f64,
    pub min_battery_voltage_today: f64,
    pub consumed_energy_today: f64,
    pub consumed_energy_month: f64,
    pub consumed_energy_year: f64,
    pub consumed_energy_total: f64,
    pub generated_energy_today: f64,
    pub generated_energy_month: f64,
    pub generated_energy_year: f64,
    pub generated_energy_total: f64,
    /// Tons.
    pub co2_reduction: f64,
    /// Net battery current in A, negative while discharging.
    pub battery_current: f64,
    pub battery_temperature: f64,
    /// Only present when more than the 30 block words were supplied.
    pub ambient_temperature: Option<f64>,
}

impl BlockRecord for StatisticalParameters {
    const BLOCK: RegisterBlock = RegisterBlock::StatisticalParameters;

    fn from_words(words: &[u16]) -> Result<Self, DecodeError> {
        use statistical_parameters::*;
        check_len(Self::BLOCK, words)?;

        Ok(Self {
            max_pv_voltage_today: MAX_PV_VOLTAGE_TODAY.value(words),
            min_pv_voltage_today: MIN_PV_VOLTAGE_TODAY.value(words),
            max_battery_voltage_today: MAX_BATTERY_VOLTAGE_TODAY.value(words),
            min_battery_voltage_today: MIN_BATTERY_VOLTAGE_TODAY.value(words),
            consumed_energy_today: CONSUMED_ENERGY_TODAY.value(words),
            consumed_energy_month: CONSUMED_ENERGY_MONTH.value(words),
            consumed_energy_year: CONSUMED_ENERGY_YEAR.value(words),
            consumed_energy_total: CONSUMED_ENERGY_TOTAL.value(words),
            generated_energy_today: GENERATED_ENERGY_TODAY.value(words),
            generated_energy_month: GENERATED_ENERGY_MONTH.value(words),
            generated_energy_year: GENERATED_ENERGY_YEAR.value(words),
            generated_energy_total: GENERATED_ENERGY_TOTAL.value(words),
            co2_reduction: CO2_REDUCTION.value(words),
            battery_current: BATTERY_CURRENT.value(words),
            battery_temperature: BATTERY_TEMPERATURE.value(words),
            ambient_temperature: AMBIENT_TEMPERATURE.get(words),
        })
    }
}

/// Any decoded block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    RatedData(RatedData),
    RealTimeData(RealTimeData),
    RealTimeStatus(RealTimeStatus),
    Settings(Settings),
    StatisticalParameters(StatisticalParameters),
}

impl Reading {
    /// Decode the words of `block` into the matching record.
    pub fn decode(block: RegisterBlock, words: &[u16]) -> Result<Self, DecodeError> {
        Ok(match block {
            RegisterBlock::RatedData => Reading::RatedData(RatedData::from_words(words)?),
            RegisterBlock::RealTimeData => Reading::RealTimeData(RealTimeData::from_words(words)?),
            RegisterBlock::RealTimeStatus => {
                Reading::RealTimeStatus(RealTimeStatus::from_words(words)?)
            }
            RegisterBlock::Settings => Reading::Settings(Settings::from_words(words)?),
            RegisterBlock::StatisticalParameters => {
                Reading::StatisticalParameters(StatisticalParameters::from_words(words)?)
            }
        })
    }

    /// The block this reading came from.
    pub fn block(&self) -> RegisterBlock {
        match self {
            Reading::RatedData(_) => RatedData::BLOCK,
            Reading::RealTimeData(_) => RealTimeData::BLOCK,
            Reading::RealTimeStatus(_) => RealTimeStatus::BLOCK,
            Reading::Settings(_) => Settings::BLOCK,
            Reading::StatisticalParameters(_) => StatisticalParameters::BLOCK,
        }
    }
}
