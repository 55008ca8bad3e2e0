//! The register map of the LS series controllers.
//!
//! The controller exposes five fixed blocks of registers that we read. Each block is read in one
//! transaction, and the word offsets of each quantity within a block are listed in the sub-modules
//! below as [`Field`] constants.

use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString};

use crate::scaling::{decode16, decode32, decode32_signed};

/// The two register address spaces of the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum RegisterBank {
    /// Read only measurements. Function code `0x04`.
    #[strum(to_string = "input")]
    Input,
    /// Configuration. Function code `0x03`. We only ever read these.
    #[strum(to_string = "holding")]
    Holding,
}

/// One of the fixed register blocks we know how to decode.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, EnumCountMacro, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum RegisterBlock {
    /// __R__ - Rated data. `0x3000`, 9 words.
    #[strum(to_string = "Rated Data", serialize = "rated", serialize = "rated-data")]
    RatedData,
    /// __R__ - Real time data. `0x3100`, 19 words.
    ///
    /// The LS1024B answers `0x14` words and up with an illegal data address exception.
    #[strum(
        to_string = "Real Time Data",
        serialize = "realtime",
        serialize = "real-time-data"
    )]
    RealTimeData,
    /// __R__ - Real time status. `0x3200`, 2 words.
    #[strum(
        to_string = "Real Time Status",
        serialize = "status",
        serialize = "real-time-status"
    )]
    RealTimeStatus,
    /// __R/W__ - Settings. `0x9000`, 10 words. Holding registers.
    #[strum(to_string = "Settings", serialize = "settings")]
    Settings,
    /// __R__ - Statistical parameters. `0x3300`, 30 words.
    #[strum(
        to_string = "Statistical Parameters",
        serialize = "stats",
        serialize = "statistical-parameters"
    )]
    StatisticalParameters,
}

impl RegisterBlock {
    /// Which register bank the block lives in.
    pub const fn bank(&self) -> RegisterBank {
        match self {
            RegisterBlock::Settings => RegisterBank::Holding,
            _ => RegisterBank::Input,
        }
    }

    /// Address of the first register of the block.
    pub const fn start_address(&self) -> u16 {
        match self {
            RegisterBlock::RatedData => 0x3000,
            RegisterBlock::RealTimeData => 0x3100,
            RegisterBlock::RealTimeStatus => 0x3200,
            RegisterBlock::Settings => 0x9000,
            RegisterBlock::StatisticalParameters => 0x3300,
        }
    }

    /// Number of registers read for the block. Decoding needs at least this many words.
    pub const fn word_count(&self) -> u16 {
        match self {
            RegisterBlock::RatedData => 0x09,
            RegisterBlock::RealTimeData => 0x13,
            RegisterBlock::RealTimeStatus => 0x02,
            RegisterBlock::Settings => 0x0A,
            RegisterBlock::StatisticalParameters => 0x1E,
        }
    }
}

/// How many registers a [`Field`] spans and how they are interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Width {
    /// One register.
    Single,
    /// Low/high register pair, unsigned.
    Double,
    /// Low/high register pair, two's complement.
    DoubleSigned,
}

/// Location of one quantity within a register block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Field {
    /// Word offset from the start of the block.
    pub offset: usize,
    pub width: Width,
}

impl Field {
    pub const fn single(offset: usize) -> Self {
        Self {
            offset,
            width: Width::Single,
        }
    }

    pub const fn double(offset: usize) -> Self {
        Self {
            offset,
            width: Width::Double,
        }
    }

    pub const fn double_signed(offset: usize) -> Self {
        Self {
            offset,
            width: Width::DoubleSigned,
        }
    }

    /// One past the last word offset this field reads.
    pub const fn end(&self) -> usize {
        match self.width {
            Width::Single => self.offset + 1,
            Width::Double | Width::DoubleSigned => self.offset + 2,
        }
    }

    /// The unscaled register word at this field's offset.
    ///
    /// The caller must have checked `words.len() >= self.end()`.
    pub fn word(&self, words: &[u16]) -> u16 {
        words[self.offset]
    }

    /// The scaled value of this field.
    ///
    /// The caller must have checked `words.len() >= self.end()`.
    pub fn value(&self, words: &[u16]) -> f64 {
        let i = self.offset;
        match self.width {
            Width::Single => decode16(words[i]),
            Width::Double => decode32(words[i], words[i + 1]),
            Width::DoubleSigned => decode32_signed(words[i], words[i + 1]),
        }
    }

    /// The scaled value, or `None` if `words` stops before this field.
    pub fn get(&self, words: &[u16]) -> Option<f64> {
        (words.len() >= self.end()).then(|| self.value(words))
    }
}

/// Offsets within [`RegisterBlock::RatedData`].
pub mod rated_data {
    use super::Field;

    /// PV array rated voltage.
    pub const PV_VOLTAGE: Field = Field::single(0x00);
    /// PV array rated current.
    pub const PV_CURRENT: Field = Field::single(0x01);
    /// PV array rated power.
    pub const PV_POWER: Field = Field::double(0x02);
    /// Rated voltage to battery.
    pub const BATTERY_VOLTAGE: Field = Field::single(0x04);
    /// Rated current to battery.
    pub const BATTERY_CURRENT: Field = Field::single(0x05);
    /// Rated power to battery.
    pub const BATTERY_POWER: Field = Field::double(0x06);
    /// Charging mode code. Unscaled.
    pub const CHARGING_MODE: Field = Field::single(0x08);
}

/// Offsets within [`RegisterBlock::RealTimeData`].
pub mod real_time_data {
    use super::Field;

    pub const PV_VOLTAGE: Field = Field::single(0x00);
    pub const PV_CURRENT: Field = Field::single(0x01);
    pub const PV_POWER: Field = Field::double(0x02);
    pub const BATTERY_VOLTAGE: Field = Field::single(0x04);
    pub const BATTERY_CURRENT: Field = Field::single(0x05);
    pub const BATTERY_POWER: Field = Field::double(0x06);
    pub const LOAD_VOLTAGE: Field = Field::single(0x0C);
    pub const LOAD_CURRENT: Field = Field::single(0x0D);
    pub const LOAD_POWER: Field = Field::double(0x0E);
    pub const BATTERY_TEMPERATURE: Field = Field::single(0x10);
    /// Temperature inside the case.
    pub const CASE_TEMPERATURE: Field = Field::single(0x11);
    /// Heat sink / power components temperature.
    pub const COMPONENTS_TEMPERATURE: Field = Field::single(0x12);
}

/// Offsets within [`RegisterBlock::RealTimeStatus`].
pub mod real_time_status {
    use super::Field;

    /// See [`BatteryStatus`](crate::types::BatteryStatus).
    pub const BATTERY_STATUS: Field = Field::single(0x00);
    /// See [`ChargingStatus`](crate::types::ChargingStatus).
    pub const CHARGING_STATUS: Field = Field::single(0x01);
}

/// Offsets within [`RegisterBlock::Settings`].
pub mod settings {
    use super::Field;

    /// See [`BatteryType`](crate::types::BatteryType). Unscaled.
    pub const BATTERY_TYPE: Field = Field::single(0x00);
    /// Rated capacity in Ah. Unscaled.
    pub const BATTERY_CAPACITY: Field = Field::single(0x01);
    pub const TEMPERATURE_COMPENSATION_COEFFICIENT: Field = Field::single(0x02);
    pub const HIGH_VOLTAGE_DISCONNECT: Field = Field::single(0x03);
    pub const CHARGING_LIMIT_VOLTAGE: Field = Field::single(0x04);
    pub const OVER_VOLTAGE_RECONNECT: Field = Field::single(0x05);
    pub const EQUALIZATION_VOLTAGE: Field = Field::single(0x06);
    pub const BOOST_VOLTAGE: Field = Field::single(0x07);
    pub const FLOAT_VOLTAGE: Field = Field::single(0x08);
    pub const BOOST_RECONNECT_VOLTAGE: Field = Field::single(0x09);
}

/// Offsets within [`RegisterBlock::StatisticalParameters`].
///
/// Words `0x16` to `0x1A` are read but their meaning is undocumented.
pub mod statistical_parameters {
    use super::Field;

    pub const MAX_PV_VOLTAGE_TODAY: Field = Field::single(0x00);
    pub const MIN_PV_VOLTAGE_TODAY: Field = Field::single(0x01);
    pub const MAX_BATTERY_VOLTAGE_TODAY: Field = Field::single(0x02);
    pub const MIN_BATTERY_VOLTAGE_TODAY: Field = Field::single(0x03);
    pub const CONSUMED_ENERGY_TODAY: Field = Field::double(0x04);
    pub const CONSUMED_ENERGY_MONTH: Field = Field::double(0x06);
    pub const CONSUMED_ENERGY_YEAR: Field = Field::double(0x08);
    pub const CONSUMED_ENERGY_TOTAL: Field = Field::double(0x0A);
    pub const GENERATED_ENERGY_TODAY: Field = Field::double(0x0C);
    pub const GENERATED_ENERGY_MONTH: Field = Field::double(0x0E);
    pub const GENERATED_ENERGY_YEAR: Field = Field::double(0x10);
    pub const GENERATED_ENERGY_TOTAL: Field = Field::double(0x12);
    /// Carbon dioxide reduction in tons.
    pub const CO2_REDUCTION: Field = Field::double(0x14);
    /// Net battery current. Negative while discharging.
    pub const BATTERY_CURRENT: Field = Field::double_signed(0x1B);
    pub const BATTERY_TEMPERATURE: Field = Field::single(0x1D);
    /// Sits one word past the 30 word block read.
    pub const AMBIENT_TEMPERATURE: Field = Field::single(0x1E);
}
