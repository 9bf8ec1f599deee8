//! RS-485 link over the ESP32 UART.
//!
//! Implements [`SerialLink`] for the wall-panel bus: UART1 at 38400 8N1
//! through an auto-direction transceiver on the pins in [`crate::pins`].
//! The UART stays installed for the whole process; `open` only discards
//! whatever background traffic piled up in the RX FIFO since the last send.
//!
//! On host builds a simulation stub with no panel on the other end
//! compiles instead; every read times out.

use log::info;

use crate::app::ports::SerialLink;
use crate::config::DriverConfig;
use crate::error::LinkError;

#[cfg(feature = "espidf")]
use esp_idf_hal::{
    delay::{FreeRtos, TickType},
    gpio::AnyIOPin,
    peripheral::Peripheral,
    uart::{self, UartDriver},
    units::Hertz,
};

pub struct UartLink {
    #[cfg(feature = "espidf")]
    uart: UartDriver<'static>,
    #[cfg(not(feature = "espidf"))]
    frames_sent: u32,
    pre_tx_delay_ms: u32,
}

impl UartLink {
    /// Install the UART driver on the bus pins.
    #[cfg(feature = "espidf")]
    pub fn new(
        uart: impl Peripheral<P = impl uart::Uart> + 'static,
        config: &DriverConfig,
    ) -> Result<Self, LinkError> {
        let uart_config = uart::config::Config::default().baudrate(Hertz(config.baud));
        // SAFETY: the bus pins are claimed nowhere else.
        let (tx, rx) = unsafe {
            (
                AnyIOPin::new(crate::pins::ERV_UART_TX_GPIO),
                AnyIOPin::new(crate::pins::ERV_UART_RX_GPIO),
            )
        };
        let uart = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &uart_config,
        )
        .map_err(|_| LinkError::PortUnavailable)?;

        info!(
            "UART: RS-485 link up ({} baud, TX={} RX={})",
            config.baud,
            crate::pins::ERV_UART_TX_GPIO,
            crate::pins::ERV_UART_RX_GPIO
        );
        Ok(Self {
            uart,
            pre_tx_delay_ms: config.pre_tx_delay_ms,
        })
    }

    /// Simulation link: accepts writes, never answers.
    #[cfg(not(feature = "espidf"))]
    pub fn new(config: &DriverConfig) -> Result<Self, LinkError> {
        info!("UART(sim): RS-485 link stub ({} baud)", config.baud);
        Ok(Self {
            frames_sent: 0,
            pre_tx_delay_ms: config.pre_tx_delay_ms,
        })
    }

    /// Frames written so far (simulation only).
    #[cfg(not(feature = "espidf"))]
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }
}

#[cfg(feature = "espidf")]
impl SerialLink for UartLink {
    fn open(&mut self) -> Result<(), LinkError> {
        self.uart.clear_rx().map_err(|_| LinkError::Io)
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        FreeRtos::delay_ms(self.pre_tx_delay_ms);
        let mut sent = 0;
        while sent < frame.len() {
            sent += self.uart.write(&frame[sent..]).map_err(|_| LinkError::Io)?;
        }
        self.uart
            .wait_tx_done(TickType::new_millis(100).ticks())
            .map_err(|_| LinkError::Io)
    }

    /// Byte-wise read; a gap longer than `timeout_ms` ends the read.
    fn read_until(
        &mut self,
        terminator: u8,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<usize, LinkError> {
        let ticks = TickType::new_millis(u64::from(timeout_ms)).ticks();
        let mut n = 0;
        let mut byte = [0u8; 1];
        while n < buf.len() {
            match self.uart.read(&mut byte, ticks) {
                Ok(0) => break,
                Ok(_) => {
                    buf[n] = byte[0];
                    n += 1;
                    if byte[0] == terminator {
                        break;
                    }
                }
                Err(_) => return Err(LinkError::Io),
            }
        }
        Ok(n)
    }

    fn close(&mut self) {}
}

#[cfg(not(feature = "espidf"))]
impl SerialLink for UartLink {
    fn open(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.frames_sent += 1;
        log::debug!(
            "UART(sim): {} bytes after {} ms turnaround",
            frame.len(),
            self.pre_tx_delay_ms
        );
        Ok(())
    }

    fn read_until(
        &mut self,
        _t: u8,
        _buf: &mut [u8],
        _timeout_ms: u32,
    ) -> Result<usize, LinkError> {
        Ok(0)
    }

    fn close(&mut self) {}
}
