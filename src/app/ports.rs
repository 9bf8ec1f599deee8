//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ VentilationService / ErvDriver (domain)
//! ```
//!
//! Driven adapters (UART, HTTP cache reader, clock, watchdog, log sink)
//! implement these traits. The domain consumes them via generics, so the
//! cascade and the protocol driver never touch hardware directly.

use crate::error::{LinkError, ProbeError};

// ───────────────────────────────────────────────────────────────
// Serial link (driven adapter: domain ↔ RS-485 bus)
// ───────────────────────────────────────────────────────────────

/// Half-duplex framed byte I/O on the RS-485 bus.
///
/// Direction turnaround (RTS or an auto-direction transceiver) and the
/// pre-transmit quiet time are the implementation's concern.
pub trait SerialLink {
    /// Acquire the port for one send. Fails with
    /// [`LinkError::PortUnavailable`] if the device cannot be opened.
    fn open(&mut self) -> Result<(), LinkError>;

    /// Transmit `frame` in full.
    fn write(&mut self, frame: &[u8]) -> Result<(), LinkError>;

    /// Read into `buf` until `terminator` has been stored, `buf` is full, or
    /// `timeout_ms` passes without a byte. Returns the number of bytes
    /// stored; `0` means nothing arrived.
    fn read_until(
        &mut self,
        terminator: u8,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<usize, LinkError>;

    /// Release the port. Must be safe to call on a port that failed to open.
    fn close(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Environment port (driven adapter: probes → domain)
// ───────────────────────────────────────────────────────────────

/// A neighborhood PM2.5 reading together with how old it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalAqiReading {
    pub pm25: f32,
    pub age_secs: u32,
}

/// Read-side port: the decision loop calls this for every environmental
/// signal. Each query either yields a value or a [`ProbeError`], which the
/// cascade treats as "unknown".
pub trait EnvironmentPort {
    /// Local wall-clock hour, 0–23.
    fn now_hour(&mut self) -> Result<u8, ProbeError>;

    /// Minute of the current hour, 0–59.
    fn minute_of_hour(&mut self) -> Result<u8, ProbeError>;

    /// Outdoor temperature in whole degrees Fahrenheit.
    fn outside_temp_f(&mut self) -> Result<i16, ProbeError>;

    /// Regional EPA PM AQI.
    fn epa_aqi(&mut self) -> Result<u16, ProbeError>;

    /// Most recent neighborhood PM2.5 average.
    fn local_aqi(&mut self) -> Result<LocalAqiReading, ProbeError>;
}

// ───────────────────────────────────────────────────────────────
// Watchdog port
// ───────────────────────────────────────────────────────────────

/// Hardware watchdog. Fed once per tick, whatever the tick decided.
pub trait WatchdogPort {
    fn feed(&self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
