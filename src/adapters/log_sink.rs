//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART / USB-CDC on the board, stderr on the host). Every predicate gets
//! an `OK:` / `OFF:` / `ERROR:` line, every tick a one-line summary.

use core::fmt::Write as _;

use heapless::String;
use log::{debug, error, info, warn};

use crate::app::events::{AppEvent, Check, CheckOutcome, Reading, TickReport};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { tick_ms } => {
                info!("START | tick every {} s", tick_ms / 1000);
            }
            AppEvent::EpaRefreshed(Ok(aqi)) => {
                info!("EPA   | refreshed, AQI {}", aqi);
            }
            AppEvent::EpaRefreshed(Err(e)) => {
                warn!("EPA   | refresh failed ({}), AQI unknown", e);
            }
            AppEvent::CheckEvaluated {
                check,
                outcome,
                reading,
            } => {
                let line = check_line(*check, *outcome, reading);
                match outcome {
                    CheckOutcome::Error => error!("{}", line),
                    _ => info!("{}", line),
                }
            }
            AppEvent::AlreadyInMode(mode) => {
                info!("ERV   | already in {}, nothing sent", mode);
            }
            AppEvent::ModeCommanded { mode, status } => {
                // The driver already logged the send at info/warn.
                debug!("ERV   | {} {}", mode, status);
            }
            AppEvent::TickSummary(report) => {
                info!("{}", summary_line(report));
            }
        }
    }
}

/// Human-readable rendering of one predicate, e.g.
/// `OFF: Nighttime (hour 23)` or `ERROR: EPA AQI unknown`.
pub fn check_line(check: Check, outcome: CheckOutcome, reading: &Reading) -> String<96> {
    let mut s = String::new();
    let subject = match check {
        Check::Night => "Nighttime",
        Check::LocalAqi => "Local AQI",
        Check::EpaAqi => "EPA AQI",
        Check::OutsideTemp => "Outside temperature",
    };
    let _ = write!(s, "{}: {} ", outcome.label(), subject);
    let _ = match reading {
        Reading::Hour(h) => write!(s, "(hour {})", h),
        Reading::TempF(0) => write!(s, "reported 0, ignoring"),
        Reading::TempF(t) => write!(s, "({} F)", t),
        Reading::EpaAqi(a) => write!(s, "({})", a),
        Reading::LocalAqi { pm25, age_secs } => {
            write!(s, "({:.1}, {} s old)", pm25, age_secs)
        }
        Reading::StaleLocalAqi { pm25, age_secs } => {
            write!(s, "stale ({:.1}, {} s old), ignoring", pm25, age_secs)
        }
        Reading::Unknown => write!(s, "unknown"),
        Reading::Failed(e) => write!(s, "unavailable ({})", e),
    };
    s
}

/// `TICK #12 | night=OK local_aqi=ERROR epa_aqi=OFF temp=- | target=standby | erv=....OK`
pub fn summary_line(report: &TickReport) -> String<160> {
    let mut s = String::new();
    let _ = write!(s, "TICK #{} |", report.tick);
    for check in [Check::Night, Check::LocalAqi, Check::EpaAqi, Check::OutsideTemp] {
        let label = report.outcome(check).map_or("-", CheckOutcome::label);
        let _ = write!(s, " {}={}", check.label(), label);
    }
    let _ = write!(s, " | target={} | erv=", report.target);
    let _ = match report.status {
        Some(status) => write!(s, "{}", status),
        None => write!(s, "unchanged"),
    };
    s
}
