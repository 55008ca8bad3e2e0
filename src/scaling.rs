//! Scaling of raw register words into physical units.
//!
//! Every quantity the LS series exposes (volts, amps, watts, kWh, °C and tons of CO2) is stored as an
//! integer in hundredths of its unit. Quantities that can exceed 16 bits span two adjacent registers,
//! with the low word at the lower address.

/// Divisor turning a raw register value into its physical unit.
pub const SCALE_FACTOR: f64 = 100.0;

/// Assemble a 32 bit value from two registers.
///
/// `lo` is the register at the lower address. Swapping the arguments corrupts every power and
/// energy reading.
#[inline]
pub const fn combine_words(lo: u16, hi: u16) -> u32 {
    ((hi as u32) << 16) | lo as u32
}

/// Scale a single register value.
#[inline]
pub fn decode16(raw: u16) -> f64 {
    f64::from(raw) / SCALE_FACTOR
}

/// Scale an unsigned 32 bit value held in a low/high register pair.
#[inline]
pub fn decode32(lo: u16, hi: u16) -> f64 {
    f64::from(combine_words(lo, hi)) / SCALE_FACTOR
}

/// Scale a two's complement 32 bit value held in a low/high register pair.
///
/// Used for net battery current, which goes negative while discharging.
#[inline]
pub fn decode32_signed(lo: u16, hi: u16) -> f64 {
    f64::from(combine_words(lo, hi) as i32) / SCALE_FACTOR
}
