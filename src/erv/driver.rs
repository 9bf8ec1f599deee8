//! VTTOUCHW protocol driver.
//!
//! Impersonates the wall panel: writes a mode's command frame onto the
//! RS-485 bus, watches the bus for the panel's acknowledgement and retries
//! with a fixed back-off until it sees one or runs out of attempts.
//!
//! ## Ghost-OK
//!
//! The panel sometimes echoes a stale acknowledgement on the very first
//! attempt without the mode actually changing. An ack on attempt 0 is
//! therefore never counted: a successful send always transmits at least
//! twice.
//!
//! ## Dual-target design
//!
//! The driver only sees [`SerialLink`] and [`DelayNs`]. On ESP-IDF these
//! are the UART adapter and `FreeRtos`; on the host, the `serialport`
//! adapter and a thread-sleep delay; in tests, scripted mocks.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use super::frames::{ACK_FRAME, FRAME_END, command_frame, contains_frame};
use super::mode::Mode;
use crate::app::ports::SerialLink;
use crate::config::DriverConfig;
use crate::error::{DriverError, LinkError};

/// Reception buffer size; a few dozen background frames fit comfortably.
pub const RX_BUFFER_LEN: usize = 400;

// ───────────────────────────────────────────────────────────────
// Send status
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Ok,
    Failed(DriverError),
}

/// Result of one mode change: how many frames went out and how it ended.
///
/// Displays the way the panel log has always shown it: one dot per
/// attempt followed by `OK` or `FAILED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendStatus {
    pub attempts: u8,
    pub outcome: SendOutcome,
}

impl SendStatus {
    pub fn succeeded(&self) -> bool {
        self.outcome == SendOutcome::Ok
    }

    pub fn error(&self) -> Option<DriverError> {
        match self.outcome {
            SendOutcome::Ok => None,
            SendOutcome::Failed(e) => Some(e),
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.attempts {
            f.write_str(".")?;
        }
        match self.outcome {
            SendOutcome::Ok => f.write_str("OK"),
            SendOutcome::Failed(_) => f.write_str("FAILED"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Driver
// ───────────────────────────────────────────────────────────────

pub struct ErvDriver<L, D> {
    link: L,
    delay: D,
    config: DriverConfig,
    last_mode: Option<Mode>,
    last_status: Option<SendStatus>,
    rx: [u8; RX_BUFFER_LEN],
}

impl<L: SerialLink, D: DelayNs> ErvDriver<L, D> {
    pub fn new(link: L, delay: D, config: DriverConfig) -> Self {
        Self {
            link,
            delay,
            config,
            last_mode: None,
            last_status: None,
            rx: [0; RX_BUFFER_LEN],
        }
    }

    // ── Mode operations ───────────────────────────────────────

    pub fn standby(&mut self) -> SendStatus {
        self.set_mode(Mode::Standby)
    }

    pub fn smart(&mut self) -> SendStatus {
        self.set_mode(Mode::Smart)
    }

    pub fn away(&mut self) -> SendStatus {
        self.set_mode(Mode::Away)
    }

    pub fn min(&mut self) -> SendStatus {
        self.set_mode(Mode::Min)
    }

    pub fn med(&mut self) -> SendStatus {
        self.set_mode(Mode::Med)
    }

    pub fn max(&mut self) -> SendStatus {
        self.set_mode(Mode::Max)
    }

    pub fn recirc_min(&mut self) -> SendStatus {
        self.set_mode(Mode::RecircMin)
    }

    pub fn recirc_med(&mut self) -> SendStatus {
        self.set_mode(Mode::RecircMed)
    }

    pub fn recirc_max(&mut self) -> SendStatus {
        self.set_mode(Mode::RecircMax)
    }

    /// Command the panel into `mode`.
    ///
    /// `last_mode` is recorded before anything is transmitted; the status
    /// of the previous send is cleared until this one finishes.
    pub fn set_mode(&mut self, mode: Mode) -> SendStatus {
        self.last_mode = Some(mode);
        self.last_status = None;

        let status = self.send_frames(command_frame(mode));
        match status.outcome {
            SendOutcome::Ok => info!("ERV {} {}", mode, status),
            SendOutcome::Failed(e) => warn!("ERV {} {} ({})", mode, status, e),
        }

        self.last_status = Some(status);
        status
    }

    // ── Queries ───────────────────────────────────────────────

    /// Mode most recently attempted, `None` before the first send.
    pub fn last_mode(&self) -> Option<Mode> {
        self.last_mode
    }

    /// Status of the most recent completed send.
    pub fn last_status(&self) -> Option<SendStatus> {
        self.last_status
    }

    /// True if the last send targeted `mode` and was acknowledged.
    pub fn is_in(&self, mode: Mode) -> bool {
        self.last_mode == Some(mode) && self.last_status.is_some_and(|s| s.succeeded())
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    // ── Internal ──────────────────────────────────────────────

    /// Transmit `frame` until a countable ack arrives or attempts run out.
    fn send_frames(&mut self, frame: &[u8]) -> SendStatus {
        if let Err(e) = self.link.open() {
            warn!("ERV: cannot open serial link: {}", e);
            self.link.close();
            return SendStatus {
                attempts: 0,
                outcome: SendOutcome::Failed(DriverError::PortUnavailable),
            };
        }

        let mut status = SendStatus {
            attempts: 0,
            outcome: SendOutcome::Failed(DriverError::AckTimeout),
        };

        for attempt in 0..self.config.attempts {
            status.attempts = attempt + 1;

            let acked = match self.exchange(frame) {
                Ok(acked) => acked,
                Err(e) => {
                    debug!("ERV: attempt {} link error: {}", attempt + 1, e);
                    false
                }
            };

            if acked {
                if attempt == 0 {
                    debug!("ERV: ack on first attempt ignored (ghost OK)");
                } else {
                    debug!("ERV: attempt {} acknowledged", attempt + 1);
                    status.outcome = SendOutcome::Ok;
                    break;
                }
            } else {
                debug!("ERV: attempt {} not acknowledged", attempt + 1);
            }

            self.delay.delay_ms(self.config.backoff_ms);
        }

        self.link.close();
        status
    }

    /// One write followed by reads until the ack shows up, the bus goes
    /// quiet, or the reception buffer fills. Returns whether the ack was seen.
    fn exchange(&mut self, frame: &[u8]) -> Result<bool, LinkError> {
        self.link.write(frame)?;

        let mut len = 0;
        let result = loop {
            let n = match self.link.read_until(
                FRAME_END,
                &mut self.rx[len..],
                self.config.read_timeout_ms,
            ) {
                Ok(n) => n,
                Err(e) => break Err(e),
            };
            len += n;

            if contains_frame(&self.rx[..len], &ACK_FRAME) {
                break Ok(true);
            }
            // Timed out mid-frame, nothing arrived, or no room left.
            if n == 0 || self.rx[len - 1] != FRAME_END || len == RX_BUFFER_LEN {
                break Ok(false);
            }
        };

        self.rx[..len].fill(0);
        result
    }
}
