//! Error types for talking to a LandStar controller.

use thiserror::Error;

use crate::decode::DecodeError;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Everything that can go wrong while reading a register block from the controller.
///
/// A failed read only affects the block being read. The link can be reused for the next one.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Serial communication error: {0:?}")]
    SerialError(I),
    #[error("Modbus protocol error: {0}")]
    ModbusError(rmodbus::ErrorKind),
    #[error("Response did not fit in the receive buffer")]
    BufferError,
    #[error("Register count {0} is out of range")]
    InvalidRange(u16),
    #[error("Invalid response received")]
    InvalidResponse,
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl<I: embedded_io::Error> From<rmodbus::ErrorKind> for Error<I> {
    fn from(err: rmodbus::ErrorKind) -> Self {
        Error::ModbusError(err)
    }
}
