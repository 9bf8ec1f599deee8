//! Unified error types for the ERV controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! decision loop's error handling uniform. All variants are `Copy` so they
//! can ride along inside send statuses and events without allocation.
//!
//! Nothing in here ever terminates the process: the decision loop reduces
//! every error to either "sensor unknown" or "driver attempt failed".

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The RS-485 link could not be used.
    Link(LinkError),
    /// The protocol driver gave up on a mode change.
    Driver(DriverError),
    /// An environmental probe returned no usable value.
    Probe(ProbeError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Driver(e) => write!(f, "driver: {e}"),
            Self::Probe(e) => write!(f, "probe: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Serial link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The serial port could not be opened (missing device, busy, bad driver).
    PortUnavailable,
    /// A write or read on an open port failed.
    Io,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortUnavailable => write!(f, "serial port unavailable"),
            Self::Io => write!(f, "serial I/O error"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Protocol driver errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The link could not be opened; no frame was sent.
    PortUnavailable,
    /// Every attempt was spent without a countable acknowledgement.
    AckTimeout,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortUnavailable => write!(f, "port unavailable"),
            Self::AckTimeout => write!(f, "no acknowledgement from panel"),
        }
    }
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

// ---------------------------------------------------------------------------
// Probe errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// The source could not be reached (network down, HTTP error, clock
    /// not synced).
    Unavailable,
    /// The source answered but the payload could not be interpreted.
    Malformed,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "probe unavailable"),
            Self::Malformed => write!(f, "probe returned malformed data"),
        }
    }
}

impl From<ProbeError> for Error {
    fn from(e: ProbeError) -> Self {
        Self::Probe(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
