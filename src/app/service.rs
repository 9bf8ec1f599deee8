//! Ventilation service, the hexagonal core.
//!
//! [`VentilationService`] owns the decision-loop state (thresholds and the
//! cached EPA AQI) and runs one tick at a time: evaluate the predicate
//! cascade, apply the chosen mode through the protocol driver unless the
//! panel is already there, feed the watchdog.
//!
//! ```text
//!  EnvironmentPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                      │   VentilationService   │
//!        ErvDriver  ◀──│  cascade · gate        │──▶ WatchdogPort
//!                      └────────────────────────┘
//! ```
//!
//! Probe failures never force standby.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::ControllerConfig;
use crate::erv::driver::{ErvDriver, SendStatus};
use crate::erv::mode::Mode;

use super::cascade;
use super::events::{AppEvent, Check, CheckOutcome, CheckTrail, Reading, TickReport};
use super::ports::{EnvironmentPort, EventSink, SerialLink, WatchdogPort};

/// Outcome of evaluating the cascade once.
#[derive(Debug, Clone)]
pub struct Decision {
    pub target: Mode,
    pub checks: CheckTrail,
}

// ───────────────────────────────────────────────────────────────
// VentilationService
// ───────────────────────────────────────────────────────────────

pub struct VentilationService {
    config: ControllerConfig,
    last_epa_aqi: Option<u16>,
    tick_count: u64,
}

impl VentilationService {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            last_epa_aqi: None,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the EPA AQI once so the first ticks outside the refresh
    /// window have something to judge by.
    pub fn start(&mut self, env: &mut impl EnvironmentPort, sink: &mut impl EventSink) {
        self.refresh_epa(env, sink);
        sink.emit(&AppEvent::Started {
            tick_ms: self.config.tick_ms,
        });
        info!(
            "VentilationService started (tick {} ms, EPA AQI {:?})",
            self.config.tick_ms, self.last_epa_aqi
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full cycle: cascade → idempotence gate → driver → watchdog.
    ///
    /// The watchdog is fed whatever happened on the bus; a failed send is
    /// simply retried on the next tick.
    pub fn tick<L: SerialLink, D: DelayNs>(
        &mut self,
        env: &mut impl EnvironmentPort,
        erv: &mut ErvDriver<L, D>,
        watchdog: &impl WatchdogPort,
        sink: &mut impl EventSink,
    ) -> TickReport {
        self.tick_count += 1;

        let decision = self.evaluate(env, sink);
        let status = self.apply(decision.target, erv, sink);

        watchdog.feed();

        let report = TickReport {
            tick: self.tick_count,
            checks: decision.checks,
            target: decision.target,
            status,
        };
        sink.emit(&AppEvent::TickSummary(report.clone()));
        report
    }

    /// Evaluate the cascade in order; the first predicate that fires
    /// selects standby and the rest are not consulted.
    pub fn evaluate(
        &mut self,
        env: &mut impl EnvironmentPort,
        sink: &mut impl EventSink,
    ) -> Decision {
        let mut checks = CheckTrail::new();

        let tripped = self.check_night(env, &mut checks, sink)
            || self.check_local_aqi(env, &mut checks, sink)
            || self.check_epa_aqi(env, &mut checks, sink)
            || self.check_outside_temp(env, &mut checks, sink);

        let target = if tripped { Mode::Standby } else { Mode::Smart };
        Decision { target, checks }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Cached EPA AQI, `None` when unknown.
    pub fn last_epa_aqi(&self) -> Option<u16> {
        self.last_epa_aqi
    }

    /// Ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // ── Predicates ────────────────────────────────────────────

    fn check_night(
        &mut self,
        env: &mut impl EnvironmentPort,
        checks: &mut CheckTrail,
        sink: &mut impl EventSink,
    ) -> bool {
        let (outcome, reading) = match env.now_hour() {
            Ok(hour) if cascade::is_night(hour, &self.config) => {
                (CheckOutcome::Off, Reading::Hour(hour))
            }
            Ok(hour) => (CheckOutcome::Ok, Reading::Hour(hour)),
            Err(e) => (CheckOutcome::Error, Reading::Failed(e)),
        };
        record(Check::Night, outcome, reading, checks, sink)
    }

    fn check_local_aqi(
        &mut self,
        env: &mut impl EnvironmentPort,
        checks: &mut CheckTrail,
        sink: &mut impl EventSink,
    ) -> bool {
        let (outcome, reading) = match env.local_aqi() {
            Ok(r) if !cascade::is_fresh(r, &self.config) => (
                CheckOutcome::Ok,
                Reading::StaleLocalAqi {
                    pm25: r.pm25,
                    age_secs: r.age_secs,
                },
            ),
            Ok(r) => {
                let outcome = if cascade::local_aqi_bad(r, &self.config) {
                    CheckOutcome::Off
                } else {
                    CheckOutcome::Ok
                };
                (
                    outcome,
                    Reading::LocalAqi {
                        pm25: r.pm25,
                        age_secs: r.age_secs,
                    },
                )
            }
            Err(e) => (CheckOutcome::Error, Reading::Failed(e)),
        };
        record(Check::LocalAqi, outcome, reading, checks, sink)
    }

    fn check_epa_aqi(
        &mut self,
        env: &mut impl EnvironmentPort,
        checks: &mut CheckTrail,
        sink: &mut impl EventSink,
    ) -> bool {
        match env.minute_of_hour() {
            Ok(minute) if cascade::epa_refresh_due(minute) => self.refresh_epa(env, sink),
            Ok(_) => {}
            Err(e) => debug!("EPA refresh skipped: {}", e),
        }

        let (outcome, reading) = match self.last_epa_aqi {
            None => (CheckOutcome::Error, Reading::Unknown),
            Some(aqi) if cascade::epa_aqi_bad(aqi, &self.config) => {
                (CheckOutcome::Off, Reading::EpaAqi(aqi))
            }
            Some(aqi) => (CheckOutcome::Ok, Reading::EpaAqi(aqi)),
        };
        record(Check::EpaAqi, outcome, reading, checks, sink)
    }

    fn check_outside_temp(
        &mut self,
        env: &mut impl EnvironmentPort,
        checks: &mut CheckTrail,
        sink: &mut impl EventSink,
    ) -> bool {
        let (outcome, reading) = match env.outside_temp_f() {
            Ok(t) if !cascade::temp_usable(t) => (CheckOutcome::Error, Reading::TempF(t)),
            Ok(t) if cascade::too_hot_or_cold(t, &self.config) => {
                (CheckOutcome::Off, Reading::TempF(t))
            }
            Ok(t) => (CheckOutcome::Ok, Reading::TempF(t)),
            Err(e) => (CheckOutcome::Error, Reading::Failed(e)),
        };
        record(Check::OutsideTemp, outcome, reading, checks, sink)
    }

    // ── Internal ──────────────────────────────────────────────

    /// Replace the cached EPA AQI with a fresh probe read. A failed read
    /// leaves it unknown.
    fn refresh_epa(&mut self, env: &mut impl EnvironmentPort, sink: &mut impl EventSink) {
        let result = env.epa_aqi();
        self.last_epa_aqi = result.ok();
        sink.emit(&AppEvent::EpaRefreshed(result));
    }

    /// Idempotence gate, then the driver. Returns `None` if nothing was sent.
    fn apply<L: SerialLink, D: DelayNs>(
        &self,
        target: Mode,
        erv: &mut ErvDriver<L, D>,
        sink: &mut impl EventSink,
    ) -> Option<SendStatus> {
        if erv.is_in(target) {
            sink.emit(&AppEvent::AlreadyInMode(target));
            return None;
        }

        let status = match target {
            Mode::Smart => erv.smart(),
            _ => erv.standby(),
        };
        sink.emit(&AppEvent::ModeCommanded {
            mode: target,
            status,
        });
        Some(status)
    }
}

/// Append to the trail, emit, and report whether the predicate fired.
fn record(
    check: Check,
    outcome: CheckOutcome,
    reading: Reading,
    checks: &mut CheckTrail,
    sink: &mut impl EventSink,
) -> bool {
    // Four predicates, four slots.
    let _ = checks.push((check, outcome));
    sink.emit(&AppEvent::CheckEvaluated {
        check,
        outcome,
        reading,
    });
    outcome == CheckOutcome::Off
}
