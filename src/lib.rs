//! This crate reads and decodes the Modbus registers of EPEver LandStar LS series solar charge controllers.
//!
//! It supports `no-std` environments by use of the `no_std` feature flag.
//!
//! Five fixed register blocks are supported, see [`register::RegisterBlock`]:
//!
//! | Block                  | Bank    | Address | Words |
//! |------------------------|---------|---------|-------|
//! | Rated data             | input   | 0x3000  | 9     |
//! | Real time data         | input   | 0x3100  | 19    |
//! | Real time status       | input   | 0x3200  | 2     |
//! | Settings               | holding | 0x9000  | 10    |
//! | Statistical parameters | input   | 0x3300  | 30    |
//!
//! Controllers this has been used with:
//! * LS1024B
//!
//! It uses Modbus RTU under the hood, over the RS485 port of the controller.
//!
//! The serial port used for controller comms should be configured like so:
//! * Default baud rate: 115200
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! Decoding is independent of the transport. Any slice of register words can be turned into a
//! record with [`decode::BlockRecord::from_words`] or [`decode::Reading::decode`].

#![cfg_attr(feature = "no_std", no_std)]

pub mod controller;
pub mod decode;
pub mod error;
pub mod register;
pub mod report;
pub mod scaling;
pub mod types;

#[cfg(test)]
mod mock_serial;

/// Unit ID the controllers ship with. Can be changed with the PC software or an MT50 remote meter.
pub const DEFAULT_UNIT_ID: u8 = 0x01;

/// Baud rate the controllers ship with.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial device of a typical USB to RS485 adapter.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";
