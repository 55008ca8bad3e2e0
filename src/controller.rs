use embedded_io::Error as _;
use log::{debug, trace};
use rmodbus::{ModbusProto, client::ModbusRequest};

use crate::{
    decode::{
        BlockRecord, RatedData, Reading, RealTimeData, RealTimeStatus, Settings,
        StatisticalParameters,
    },
    error::{Error, Result},
    register::{RegisterBank, RegisterBlock},
};

/// Largest number of registers read in one transaction.
pub const MAX_BLOCK_WORDS: usize = 32;

/// Register words returned by a single read.
pub type Words = heapless::Vec<u16, MAX_BLOCK_WORDS>;

/// Unit id + function code + exception code + CRC.
const EXCEPTION_FRAME_LEN: usize = 5;

/// You can create a ChargeController using any interface which implements [embedded_io::Read] & [embedded_io::Write].
///
/// The controller only ever reads. Each read is one Modbus transaction; a failed read leaves the
/// link usable for the next one.
///
/// `L` is the size of the frame buffer in bytes. The default fits the largest block.
pub struct ChargeController<S: embedded_io::Read + embedded_io::Write, const L: usize = 128> {
    interface: S,
    /// Default for the LS series is 0x01.
    unit_id: u8,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> ChargeController<S, L> {
    /// Create a new ChargeController instance with the given interface and unit ID
    pub fn new(interface: S, unit_id: u8) -> Self {
        Self { interface, unit_id }
    }

    /// The Modbus unit ID requests are addressed to.
    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// Address subsequent requests to another unit on the same bus.
    pub fn set_unit_id(&mut self, unit_id: u8) {
        self.unit_id = unit_id;
    }

    /// Give the interface back, closing the link as far as we are concerned.
    pub fn into_inner(self) -> S {
        self.interface
    }

    /// Read the nameplate ratings.
    pub fn read_rated_data(&mut self) -> Result<RatedData, S::Error> {
        self.read()
    }

    /// Read live PV, battery and load measurements.
    pub fn read_real_time_data(&mut self) -> Result<RealTimeData, S::Error> {
        self.read()
    }

    /// Read the battery and charging status words.
    pub fn read_real_time_status(&mut self) -> Result<RealTimeStatus, S::Error> {
        self.read()
    }

    /// Read battery configuration and charging setpoints.
    pub fn read_settings(&mut self) -> Result<Settings, S::Error> {
        self.read()
    }

    /// Read the daily extremes and energy counters.
    pub fn read_statistical_parameters(&mut self) -> Result<StatisticalParameters, S::Error> {
        self.read()
    }

    /// Read and decode the block behind any record type.
    pub fn read<T: BlockRecord>(&mut self) -> Result<T, S::Error> {
        let words = self.read_block(T::BLOCK)?;
        Ok(T::from_words(&words)?)
    }

    /// Read and decode a block chosen at runtime.
    pub fn read_reading(&mut self, block: RegisterBlock) -> Result<Reading, S::Error> {
        let words = self.read_block(block)?;
        Ok(Reading::decode(block, &words)?)
    }

    /// Read the raw words of a block.
    pub fn read_block(&mut self, block: RegisterBlock) -> Result<Words, S::Error> {
        self.read_registers(block.bank(), block.start_address(), block.word_count())
    }

    /// Read `count` input registers starting at `start`.
    pub fn read_input_registers(&mut self, start: u16, count: u16) -> Result<Words, S::Error> {
        self.read_registers(RegisterBank::Input, start, count)
    }

    /// Read `count` holding registers starting at `start`.
    pub fn read_holding_registers(&mut self, start: u16, count: u16) -> Result<Words, S::Error> {
        self.read_registers(RegisterBank::Holding, start, count)
    }

    fn read_registers(
        &mut self,
        bank: RegisterBank,
        start: u16,
        count: u16,
    ) -> Result<Words, S::Error> {
        if count == 0 || count as usize > MAX_BLOCK_WORDS {
            return Err(Error::InvalidRange(count));
        }

        let mut buff: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut req = ModbusRequest::new(self.unit_id, ModbusProto::Rtu);
        match bank {
            RegisterBank::Input => req.generate_get_inputs(start, count, &mut buff)?,
            RegisterBank::Holding => req.generate_get_holdings(start, count, &mut buff)?,
        }

        debug!(
            "unit {:#04X}: reading {} {} registers from {:#06X}",
            self.unit_id, count, bank, start
        );
        trace!("request {:02X?}", buff.as_slice());

        self.interface
            .write_all(&buff)
            .map_err(Error::SerialError)?;

        // Reuse same buffer when reading back
        buff.clear();

        // unit id + function + byte count + data + CRC
        let expected = 5 + 2 * count as usize;
        self.receive_frame(&mut buff, expected)?;
        trace!("response {:02X?}", buff.as_slice());

        let mut words = Words::new();
        req.parse_u16(&buff, &mut words)?;
        if words.len() != count as usize {
            return Err(Error::InvalidResponse);
        }
        Ok(words)
    }

    /// Read one response frame into `buff`.
    ///
    /// Never reads past the end of the frame, so a following response stays in the interface.
    fn receive_frame(
        &mut self,
        buff: &mut heapless::Vec<u8, L>,
        expected: usize,
    ) -> Result<(), S::Error> {
        let mut temp_buf = [0u8; 8];
        loop {
            // The function code tells us whether this is an exception frame, so get that first.
            let target = match buff.get(1) {
                Some(function) if function & 0x80 != 0 => EXCEPTION_FRAME_LEN,
                Some(_) => expected,
                None => 2,
            };
            if buff.len() >= target {
                return Ok(());
            }

            let want = (target - buff.len()).min(temp_buf.len());
            match self.interface.read(&mut temp_buf[..want]) {
                Ok(0) => return Ok(()),
                Ok(bytes_read) => {
                    buff.extend_from_slice(&temp_buf[..bytes_read])
                        .map_err(|_| Error::BufferError)?;
                }
                Err(e) => {
                    // A timeout after a partial frame is left for the parser to reject.
                    if matches!(
                        e.kind(),
                        embedded_io::ErrorKind::Other | embedded_io::ErrorKind::TimedOut
                    ) && !buff.is_empty()
                    {
                        return Ok(());
                    }
                    return Err(Error::SerialError(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decode::DecodeError,
        mock_serial::{MockSerial, with_crc},
        types::{BatteryType, ChargingMode, ChargingPhase},
    };
    use strum::IntoEnumIterator;

    const UNIT: u8 = 0x01;
    const READ_HOLDING: u8 = 0x03;
    const READ_INPUT: u8 = 0x04;

    fn controller(mock: MockSerial) -> ChargeController<MockSerial> {
        ChargeController::new(mock, UNIT)
    }

    #[test]
    fn real_time_status_request_and_decode() {
        let mut mock = MockSerial::new();
        mock.queue_registers(UNIT, READ_INPUT, &[0x0001, 0x0008]);
        let mut ls = controller(mock);

        let status = ls.read_real_time_status().unwrap();
        assert_eq!(u16::from(status.battery_status), 0x0001);
        assert_eq!(u16::from(status.charging_status), 0x0008);
        assert_eq!(status.charging_status.phase(), ChargingPhase::Boost);

        let ideal_written = with_crc(&[UNIT, READ_INPUT, 0x32, 0x00, 0x00, 0x02]);
        assert_eq!(ls.into_inner().written_data(), ideal_written.as_slice());
    }

    #[test]
    fn settings_use_holding_registers() {
        let mut mock = MockSerial::new();
        mock.queue_registers(
            UNIT,
            READ_HOLDING,
            &[0x0003, 200, 300, 1600, 1550, 1500, 1460, 1440, 1380, 1320],
        );
        let mut ls = controller(mock);

        let settings = ls.read_settings().unwrap();
        assert_eq!(settings.battery_type, BatteryType::Flooded);
        assert_eq!(settings.battery_capacity, 200);
        assert_eq!(settings.boost_reconnect_voltage, 13.2);

        let written = ls.into_inner();
        let written = written.written_data();
        assert_eq!(&written[..6], &[UNIT, READ_HOLDING, 0x90, 0x00, 0x00, 0x0A]);
        assert_eq!(written.len(), 8);
    }

    #[test]
    fn rated_data_power_from_word_pair() {
        let mut mock = MockSerial::new();
        mock.queue_registers(
            UNIT,
            READ_INPUT,
            &[0x2710, 0x0FA0, 0x93E0, 0x0004, 0x0960, 0x0FA0, 0x3880, 0x0001, 0x0001],
        );
        let mut ls = controller(mock);

        let rated = ls.read_rated_data().unwrap();
        assert_eq!(rated.pv_power, 3000.0);
        assert_eq!(rated.battery_power, 800.0);
        assert_eq!(rated.charging_mode, ChargingMode::Pwm);
    }

    #[test]
    fn every_block_in_sequence() {
        let mut mock = MockSerial::new();
        for block in RegisterBlock::iter() {
            let function = match block.bank() {
                RegisterBank::Input => READ_INPUT,
                RegisterBank::Holding => READ_HOLDING,
            };
            let words: Vec<u16> = (0..block.word_count()).collect();
            mock.queue_registers(UNIT, function, &words);
        }
        let mut ls = controller(mock);

        for block in RegisterBlock::iter() {
            let reading = ls.read_reading(block).unwrap();
            assert_eq!(reading.block(), block);
        }

        // Nothing left to read.
        assert!(matches!(
            ls.read_reading(RegisterBlock::StatisticalParameters),
            Err(Error::SerialError(_))
        ));
    }

    #[test]
    fn raw_block_words() {
        let mut mock = MockSerial::new();
        let words: Vec<u16> = (0..30).map(|i| i * 0x0101).collect();
        mock.queue_registers(UNIT, READ_INPUT, &words);
        let mut ls = controller(mock);

        let read = ls.read_block(RegisterBlock::StatisticalParameters).unwrap();
        assert_eq!(read.as_slice(), words.as_slice());
        let written = ls.into_inner();
        assert_eq!(&written.written_data()[..6], &[UNIT, READ_INPUT, 0x33, 0x00, 0x00, 0x1E]);
    }

    #[test]
    fn exception_does_not_poison_the_link() {
        let mut mock = MockSerial::new();
        // Illegal data address.
        mock.queue_exception(UNIT, READ_INPUT, 0x02);
        mock.queue_registers(UNIT, READ_INPUT, &[0x0000, 0x0000]);
        let mut ls = controller(mock);

        assert!(matches!(
            ls.read_real_time_data(),
            Err(Error::ModbusError(_))
        ));

        let status = ls.read_real_time_status().unwrap();
        assert_eq!(u16::from(status.battery_status), 0);
        assert_eq!(ls.into_inner().unread(), 0);
    }

    #[test]
    fn short_response_is_rejected() {
        let mut mock = MockSerial::new();
        mock.queue_registers(UNIT, READ_INPUT, &[0x0001]);
        let mut ls = controller(mock);

        assert!(matches!(
            ls.read_real_time_status(),
            Err(Error::InvalidResponse | Error::ModbusError(_))
        ));
    }

    #[test]
    fn read_error_is_reported() {
        let mut mock = MockSerial::new();
        mock.set_read_error(true);
        let mut ls = controller(mock);

        assert!(matches!(
            ls.read_settings(),
            Err(Error::SerialError(crate::mock_serial::MockSerialError::SimulatedError))
        ));
    }

    #[test]
    fn no_response_is_reported() {
        let mut ls = controller(MockSerial::new());
        assert!(matches!(ls.read_rated_data(), Err(Error::SerialError(_))));
    }

    #[test]
    fn oversized_reads_are_refused_before_sending() {
        let mut ls = controller(MockSerial::new());
        assert!(matches!(
            ls.read_input_registers(0x3100, 0x40),
            Err(Error::InvalidRange(0x40))
        ));
        assert!(matches!(
            ls.read_holding_registers(0x9000, 0),
            Err(Error::InvalidRange(0))
        ));
        assert!(ls.into_inner().written_data().is_empty());
    }

    #[test]
    fn unit_id_is_used_in_requests() {
        let mut mock = MockSerial::new();
        mock.queue_registers(0x0A, READ_INPUT, &[0x0000, 0x0000]);
        let mut ls = controller(mock);
        ls.set_unit_id(0x0A);
        assert_eq!(ls.unit_id(), 0x0A);

        ls.read_real_time_status().unwrap();
        assert_eq!(ls.into_inner().written_data()[0], 0x0A);
    }

    #[test]
    fn decode_errors_convert() {
        let err: Error<crate::mock_serial::MockSerialError> = DecodeError::ShortBuffer {
            block: RegisterBlock::Settings,
            expected: 10,
            actual: 4,
        }
        .into();
        assert!(matches!(err, Error::Decode(DecodeError::ShortBuffer { actual: 4, .. })));
    }
}
