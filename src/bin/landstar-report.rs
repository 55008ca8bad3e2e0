use anyhow::Context;
use clap::Parser;
use landstar::{
    DEFAULT_BAUD_RATE, DEFAULT_DEVICE, DEFAULT_UNIT_ID, controller::ChargeController,
    decode::Reading, register::RegisterBlock,
};
use log::{error, info};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use strum::IntoEnumIterator;

/// Read the rated data, live measurements, status, settings and statistics of a LandStar LS
/// charge controller and print them.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Serial device the controller is attached to
    #[clap(long, default_value = DEFAULT_DEVICE)]
    device: String,

    /// Baud rate. Framing is always 8N1
    #[clap(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Modbus unit ID of the controller, decimal or 0x prefixed hex
    #[clap(long, default_value_t = DEFAULT_UNIT_ID, value_parser = parse_unit_id)]
    unit_id: u8,

    /// How long to wait for the controller to answer
    #[clap(long, default_value_t = 300)]
    timeout_ms: u64,

    /// Only read these blocks (rated, realtime, status, settings, stats). Repeatable
    #[clap(long = "block", value_parser = parse_block)]
    blocks: Vec<RegisterBlock>,

    /// Also print the raw register words of each block
    #[clap(long)]
    raw: bool,

    /// List available serial ports and exit
    #[clap(long)]
    list_ports: bool,
}

fn parse_unit_id(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid unit id `{s}`: {e}"))
}

fn parse_block(s: &str) -> Result<RegisterBlock, String> {
    s.parse().map_err(|_| format!("unknown register block `{s}`"))
}

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();

    if args.list_ports {
        let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;
        for port in ports {
            println!("{}", port.port_name);
        }
        return Ok(());
    }

    info!("Opening {}, {} 8N1", args.device, args.baud);
    let port = serialport::new(&args.device, args.baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(std::time::Duration::from_millis(args.timeout_ms))
        .open()
        .with_context(|| format!("Connection failed: unable to open {}", args.device))?;

    info!("Setting slave ID to {:X}", args.unit_id);
    let mut controller: ChargeController<PortWrapper> =
        ChargeController::new(PortWrapper(port), args.unit_id);

    let blocks: Vec<RegisterBlock> = if args.blocks.is_empty() {
        RegisterBlock::iter().collect()
    } else {
        args.blocks.clone()
    };

    for block in blocks {
        // A failed block is reported and skipped, the rest are still read.
        let words = match controller.read_block(block) {
            Ok(words) => words,
            Err(e) => {
                error!("{block} - read failed: {e}");
                continue;
            }
        };

        if args.raw {
            println!(
                "{block} @ {:#06X}: {:04X?}",
                block.start_address(),
                words.as_slice()
            );
        }

        match Reading::decode(block, &words) {
            Ok(reading) => println!("{reading}\n"),
            Err(e) => error!("{block} - read failed: {e}"),
        }
    }

    info!("Done");
    drop(controller.into_inner());
    Ok(())
}
