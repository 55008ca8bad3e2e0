//! We use this mocking module in unit tests to stand in for the RS485 link to a controller.
//!
//! Responses are queued up front as complete Modbus RTU frames and handed out in order.

use core::fmt;

/// Emulated serial port.
pub struct MockSerial {
    /// Every byte written by the code under test.
    write_buffer: heapless::Vec<u8, 256>,
    /// Queued response frames, back to back.
    read_buffer: heapless::Vec<u8, 512>,
    read_position: usize,
    should_error_on_read: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MockSerialError {
    /// Nothing left to read.
    WouldBlock,
    BufferOverflow,
    SimulatedError,
}

impl fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::WouldBlock => embedded_io::ErrorKind::Other,
            MockSerialError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::BrokenPipe,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::BufferOverflow)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }

        let remaining = &self.read_buffer[self.read_position..];
        if remaining.is_empty() {
            return Err(MockSerialError::WouldBlock);
        }

        let n = core::cmp::min(buf.len(), remaining.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.read_position += n;
        Ok(n)
    }
}

/// Modbus RTU CRC, transmitted low byte first.
pub fn crc16(frame: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for &byte in frame {
        crc ^= byte as u16;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xA001 } else { crc >> 1 };
        }
    }
    crc
}

/// Append the CRC to a frame body.
pub fn with_crc(body: &[u8]) -> Vec<u8> {
    let mut frame = body.to_vec();
    frame.extend_from_slice(&crc16(body).to_le_bytes());
    frame
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            should_error_on_read: false,
        }
    }

    /// Queue raw bytes to be read back.
    pub fn queue_bytes(&mut self, data: &[u8]) {
        self.read_buffer
            .extend_from_slice(data)
            .expect("mock read buffer full");
    }

    /// Queue a well formed register read response.
    pub fn queue_registers(&mut self, unit_id: u8, function: u8, words: &[u16]) {
        let mut body = vec![unit_id, function, (words.len() * 2) as u8];
        for word in words {
            body.extend_from_slice(&word.to_be_bytes());
        }
        self.queue_bytes(&with_crc(&body));
    }

    /// Queue a Modbus exception response.
    pub fn queue_exception(&mut self, unit_id: u8, function: u8, code: u8) {
        self.queue_bytes(&with_crc(&[unit_id, function | 0x80, code]));
    }

    /// Everything written so far.
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
    }

    /// Bytes queued but not yet read.
    pub fn unread(&self) -> usize {
        self.read_buffer.len() - self.read_position
    }

    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn crc_matches_known_frames() {
        // Read holding register 0x0020, count 1.
        assert_eq!(crc16(&[0x01, 0x03, 0x00, 0x20, 0x00, 0x01]).to_le_bytes(), [0x85, 0xC0]);
        // Response carrying 0x5678.
        assert_eq!(crc16(&[0x01, 0x03, 0x02, 0x56, 0x78]).to_le_bytes(), [0x87, 0xC6]);
    }

    #[test]
    fn queued_frames_are_read_in_order() {
        let mut mock = MockSerial::new();
        mock.queue_registers(0x01, 0x04, &[0x1234]);
        mock.queue_exception(0x01, 0x04, 0x02);

        let mut buffer = [0u8; 7];
        assert_eq!(mock.read(&mut buffer), Ok(7));
        assert_eq!(&buffer[..5], &[0x01, 0x04, 0x02, 0x12, 0x34]);

        let mut buffer = [0u8; 16];
        assert_eq!(mock.read(&mut buffer), Ok(5));
        assert_eq!(&buffer[..3], &[0x01, 0x84, 0x02]);
        assert_eq!(mock.unread(), 0);
        assert_eq!(mock.read(&mut buffer), Err(MockSerialError::WouldBlock));
    }

    #[test]
    fn writes_are_recorded() {
        let mut mock = MockSerial::new();
        mock.write_all(b"Hello, ").unwrap();
        mock.write_all(b"World!").unwrap();
        assert_eq!(mock.written_data(), b"Hello, World!");

        mock.clear_written_data();
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn read_error_simulation() {
        let mut mock = MockSerial::new();
        mock.queue_bytes(b"data");
        mock.set_read_error(true);

        let mut buffer = [0u8; 4];
        assert_eq!(mock.read(&mut buffer), Err(MockSerialError::SimulatedError));

        mock.set_read_error(false);
        assert_eq!(mock.read(&mut buffer), Ok(4));
    }
}
