//! Plain text rendering of decoded records.
//!
//! Voltages, currents and powers are printed with two decimals, temperatures and energy counters
//! with one. Status words are printed as uppercase hex exactly as read, followed by their decoded
//! flags.

use core::fmt::{self, Display, Formatter};

use crate::{
    decode::{RatedData, Reading, RealTimeData, RealTimeStatus, Settings, StatisticalParameters},
    types::{BatteryStatus, ChargingStatus},
};

fn header(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "-- {title} from Controller --")
}

impl Display for RatedData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        header(f, "Rated Data")?;
        writeln!(f, "PV Rated Voltage: {:.2} V", self.pv_voltage)?;
        writeln!(f, "PV Rated Current: {:.2} A", self.pv_current)?;
        writeln!(f, "PV Rated Power: {:.2} W", self.pv_power)?;
        writeln!(f, "Battery Rated Voltage: {:.2} V", self.battery_voltage)?;
        writeln!(f, "Battery Rated Current: {:.2} A", self.battery_current)?;
        writeln!(f, "Battery Rated Power: {:.2} W", self.battery_power)?;
        write!(
            f,
            "Charging Mode: {:X} ({})",
            self.charging_mode.code(),
            self.charging_mode
        )
    }
}

impl Display for RealTimeData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        header(f, "Real Time Data")?;
        writeln!(f, "PV Array Voltage: {:.2} V", self.pv_voltage)?;
        writeln!(f, "PV Array Current: {:.2} A", self.pv_current)?;
        writeln!(f, "PV Array Power  : {:.2} W", self.pv_power)?;
        writeln!(f, "Battery Voltage: {:.2} V", self.battery_voltage)?;
        writeln!(f, "Battery Current: {:.2} A", self.battery_current)?;
        writeln!(f, "Battery Power  : {:.2} W", self.battery_power)?;
        writeln!(f, "Load Voltage: {:.2} V", self.load_voltage)?;
        writeln!(f, "Load Current: {:.2} A", self.load_current)?;
        writeln!(f, "Load Power  : {:.2} W", self.load_power)?;
        writeln!(f, "Battery Temperature   : {:.1} *C", self.battery_temperature)?;
        writeln!(f, "Case Temperature      : {:.1} *C", self.case_temperature)?;
        write!(f, "Components Temperature: {:.1} *C", self.components_temperature)
    }
}

impl fmt::UpperHex for BatteryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&u16::from(*self), f)
    }
}

impl fmt::UpperHex for ChargingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&u16::from(*self), f)
    }
}

impl Display for BatteryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "voltage {}, temperature {}", self.voltage(), self.temperature())?;
        if self.internal_resistance_abnormal() {
            write!(f, ", internal resistance abnormal")?;
        }
        if self.rated_voltage_mismatch() {
            write!(f, ", wrong rated voltage identification")?;
        }
        Ok(())
    }
}

impl Display for ChargingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}, input {}", self.phase(), self.input_voltage())?;
        let flags = [
            (self.fault(), "fault"),
            (self.pv_input_short(), "PV input short"),
            (self.load_mosfet_short(), "load MOSFET short"),
            (self.load_short(), "load short"),
            (self.load_over_current(), "load over current"),
            (self.input_over_current(), "input over current"),
            (self.anti_reverse_mosfet_short(), "anti-reverse MOSFET short"),
            (
                self.charging_or_anti_reverse_mosfet_short(),
                "charging or anti-reverse MOSFET short",
            ),
            (self.charging_mosfet_short(), "charging MOSFET short"),
        ];
        for (_, name) in flags.iter().filter(|(set, _)| *set) {
            write!(f, ", {name}")?;
        }
        Ok(())
    }
}

impl Display for RealTimeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        header(f, "Real Time Status")?;
        writeln!(f, "Battery Status : {:X} ({})", self.battery_status, self.battery_status)?;
        write!(f, "Charging Status: {:X} ({})", self.charging_status, self.charging_status)
    }
}

impl Display for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        header(f, "Settings")?;
        writeln!(f, "Battery Type: {}", self.battery_type)?;
        writeln!(f, "Battery Rated Capacity: {} AH", self.battery_capacity)?;
        writeln!(
            f,
            "Temperature Compensation Coefficient: {:.2}",
            self.temperature_compensation_coefficient
        )?;
        writeln!(f, "High Voltage Disconnect: {:.2} V", self.high_voltage_disconnect)?;
        writeln!(f, "Charging Limit Voltage: {:.2} V", self.charging_limit_voltage)?;
        writeln!(f, "Over Voltage Reconnect: {:.2} V", self.over_voltage_reconnect)?;
        writeln!(f, "Equalization Voltage: {:.2} V", self.equalization_voltage)?;
        writeln!(f, "Boost Voltage: {:.2} V", self.boost_voltage)?;
        writeln!(f, "Float Voltage: {:.2} V", self.float_voltage)?;
        write!(f, "Boost Reconnect Voltage: {:.2} V", self.boost_reconnect_voltage)
    }
}

impl Display for StatisticalParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        header(f, "Statistical Parameters")?;
        writeln!(f, "Max PV Input Voltage Today: {:.2} V", self.max_pv_voltage_today)?;
        writeln!(f, "Min PV Input Voltage Today: {:.2} V", self.min_pv_voltage_today)?;
        writeln!(f, "Max Battery Voltage Today: {:.2} V", self.max_battery_voltage_today)?;
        writeln!(f, "Min Battery Voltage Today: {:.2} V", self.min_battery_voltage_today)?;
        writeln!(f, "Consumed Energy Today: {:.1} KWH", self.consumed_energy_today)?;
        writeln!(f, "Consumed Energy Month: {:.1} KWH", self.consumed_energy_month)?;
        writeln!(f, "Consumed Energy Year: {:.1} KWH", self.consumed_energy_year)?;
        writeln!(f, "Total Consumed Energy: {:.1} KWH", self.consumed_energy_total)?;
        writeln!(f, "Generated Energy Today: {:.1} KWH", self.generated_energy_today)?;
        writeln!(f, "Generated Energy Month: {:.1} KWH", self.generated_energy_month)?;
        writeln!(f, "Generated Energy Year: {:.1} KWH", self.generated_energy_year)?;
        writeln!(f, "Total Generated Energy: {:.1} KWH", self.generated_energy_total)?;
        writeln!(f, "Carbon Dioxide Reduction: {:.1} Ton", self.co2_reduction)?;
        writeln!(f, "Battery Current: {:.2} A", self.battery_current)?;
        write!(f, "Battery Temp: {:.1} *C", self.battery_temperature)?;
        if let Some(ambient) = self.ambient_temperature {
            write!(f, "\nAmbient Temp: {ambient:.1} *C")?;
        }
        Ok(())
    }
}

impl Display for Reading {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Reading::RatedData(r) => Display::fmt(r, f),
            Reading::RealTimeData(r) => Display::fmt(r, f),
            Reading::RealTimeStatus(r) => Display::fmt(r, f),
            Reading::Settings(r) => Display::fmt(r, f),
            Reading::StatisticalParameters(r) => Display::fmt(r, f),
        }
    }
}
