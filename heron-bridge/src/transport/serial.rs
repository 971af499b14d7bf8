//! Serial transport implementation

use std::io::{Read, Write};
use std::time::Duration;

use heron_hal::{UartConfig, UartRx, UartTx};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::Result;

/// Serial transport for the USB/CAN converter
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyUSB0")
    /// * `config` - Line settings and read timeout
    pub fn open(path: &str, config: &UartConfig) -> Result<Self> {
        let port = serialport::new(path, config.baudrate)
            .data_bits(match config.data_bits {
                heron_hal::uart::DataBits::Seven => DataBits::Seven,
                heron_hal::uart::DataBits::Eight => DataBits::Eight,
            })
            .parity(match config.parity {
                heron_hal::uart::Parity::None => Parity::None,
                heron_hal::uart::Parity::Even => Parity::Even,
                heron_hal::uart::Parity::Odd => Parity::Odd,
            })
            .stop_bits(match config.stop_bits {
                heron_hal::uart::StopBits::One => StopBits::One,
                heron_hal::uart::StopBits::Two => StopBits::Two,
            })
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(config.read_timeout_ms as u64))
            .open()?;

        log::info!("Opened serial port: {} at {} baud", path, config.baudrate);

        Ok(SerialTransport { port })
    }

    /// Second handle on the same port
    ///
    /// Used to give the reader and the writer threads their own handle;
    /// the OS serializes reads against writes.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(SerialTransport {
            port: self.port.try_clone()?,
        })
    }
}

impl UartRx for SerialTransport {
    type Error = std::io::Error;

    fn read_blocking(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }
}

impl UartTx for SerialTransport {
    type Error = std::io::Error;

    fn write_blocking(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.port.write_all(data)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}
