//! Outbound application events.
//!
//! The [`VentilationService`](super::service::VentilationService) emits
//! these through the [`EventSink`](super::ports::EventSink) port. The log
//! adapter turns them into the per-check `OK` / `OFF` / `ERROR` console
//! lines and the per-tick summary.

use heapless::Vec;

use crate::erv::driver::SendStatus;
use crate::erv::mode::Mode;
use crate::error::ProbeError;

/// The four predicates of the cascade, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Night,
    LocalAqi,
    EpaAqi,
    OutsideTemp,
}

impl Check {
    pub const fn label(self) -> &'static str {
        match self {
            Check::Night => "night",
            Check::LocalAqi => "local_aqi",
            Check::EpaAqi => "epa_aqi",
            Check::OutsideTemp => "temp",
        }
    }
}

/// How a single predicate came out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Condition is fine for ventilation.
    Ok,
    /// Condition requires standby.
    Off,
    /// The probe gave no usable value; treated as `Ok`.
    Error,
}

impl CheckOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            CheckOutcome::Ok => "OK",
            CheckOutcome::Off => "OFF",
            CheckOutcome::Error => "ERROR",
        }
    }
}

/// The value a predicate looked at, for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Hour(u8),
    TempF(i16),
    EpaAqi(u16),
    LocalAqi { pm25: f32, age_secs: u32 },
    /// Neighborhood reading too old to act on.
    StaleLocalAqi { pm25: f32, age_secs: u32 },
    /// No cached value to judge by.
    Unknown,
    Failed(ProbeError),
}

/// Outcomes of the predicates evaluated this tick. Predicates after the
/// first `Off` are never evaluated and do not appear.
pub type CheckTrail = Vec<(Check, CheckOutcome), 4>;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started; carries the tick period.
    Started { tick_ms: u32 },

    /// The cached EPA AQI was (re)loaded from its probe.
    EpaRefreshed(Result<u16, ProbeError>),

    /// One predicate of the cascade was evaluated.
    CheckEvaluated {
        check: Check,
        outcome: CheckOutcome,
        reading: Reading,
    },

    /// The ERV is already in the target mode and the last send succeeded.
    AlreadyInMode(Mode),

    /// A mode change was sent to the panel.
    ModeCommanded { mode: Mode, status: SendStatus },

    /// End-of-tick summary.
    TickSummary(TickReport),
}

/// What one tick did.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub checks: CheckTrail,
    pub target: Mode,
    /// `None` when the idempotence gate skipped transmission.
    pub status: Option<SendStatus>,
}

impl TickReport {
    /// Whether this tick put frames on the bus.
    pub fn transmitted(&self) -> bool {
        self.status.is_some()
    }

    /// The predicate that forced standby, if any.
    pub fn tripped(&self) -> Option<Check> {
        self.checks
            .iter()
            .find(|(_, o)| *o == CheckOutcome::Off)
            .map(|(c, _)| *c)
    }

    /// Outcome of `check`, or `None` if the cascade stopped before it.
    pub fn outcome(&self, check: Check) -> Option<CheckOutcome> {
        self.checks
            .iter()
            .find(|(c, _)| *c == check)
            .map(|(_, o)| *o)
    }
}
