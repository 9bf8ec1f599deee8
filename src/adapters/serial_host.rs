//! RS-485 link through a USB-to-RS485 adapter on Linux/macOS.
//!
//! The port is opened for each send and released on close, so the CLI can
//! share the adapter with other tools between commands. The adapter's RTS
//! line drives the transceiver direction: low while transmitting, high
//! while listening, with a short settle delay before every write.

use std::io::{ErrorKind, Read, Write};
use std::thread::sleep;
use std::time::Duration;

use log::{debug, warn};
use serialport::SerialPort;

use crate::app::ports::SerialLink;
use crate::config::DriverConfig;
use crate::error::LinkError;

const RTS_FOR_TX: bool = false;
const RTS_FOR_RX: bool = true;

pub struct HostSerialLink {
    path: String,
    baud: u32,
    pre_tx_delay_ms: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl HostSerialLink {
    pub fn new(path: impl Into<String>, config: &DriverConfig) -> Self {
        Self {
            path: path.into(),
            baud: config.baud,
            pre_tx_delay_ms: config.pre_tx_delay_ms,
            port: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, LinkError> {
        self.port.as_mut().ok_or(LinkError::PortUnavailable)
    }
}

impl SerialLink for HostSerialLink {
    fn open(&mut self) -> Result<(), LinkError> {
        if self.port.is_some() {
            return Ok(());
        }
        let mut port = serialport::new(&self.path, self.baud)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| {
                warn!("{} serial port not found ({})", self.path, e);
                LinkError::PortUnavailable
            })?;
        // Without RTS control the transceiver direction is unknown.
        port.write_request_to_send(RTS_FOR_RX).map_err(|e| {
            warn!("{} cannot drive RTS ({})", self.path, e);
            LinkError::PortUnavailable
        })?;
        if let Err(e) = port.clear(serialport::ClearBuffer::Input) {
            warn!("{} could not flush RX ({})", self.path, e);
        }
        self.port = Some(port);
        Ok(())
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        let delay = Duration::from_millis(u64::from(self.pre_tx_delay_ms));
        let port = self.port()?;

        port.write_request_to_send(RTS_FOR_TX)
            .map_err(|_| LinkError::Io)?;
        sleep(delay);
        let written = port.write_all(frame).and_then(|()| port.flush());
        // Release the bus even if the write failed.
        let released = port.write_request_to_send(RTS_FOR_RX);

        written.map_err(|_| LinkError::Io)?;
        released.map_err(|_| LinkError::Io)
    }

    /// Byte-wise read; a gap longer than `timeout_ms` ends the read.
    fn read_until(
        &mut self,
        terminator: u8,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<usize, LinkError> {
        let port = self.port()?;
        port.set_timeout(Duration::from_millis(u64::from(timeout_ms)))
            .map_err(|_| LinkError::Io)?;

        let mut n = 0;
        let mut byte = [0u8; 1];
        while n < buf.len() {
            match port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    buf[n] = byte[0];
                    n += 1;
                    if byte[0] == terminator {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("serial read error: {}", e);
                    return Err(LinkError::Io);
                }
            }
        }
        Ok(n)
    }

    fn close(&mut self) {
        self.port = None;
    }
}
