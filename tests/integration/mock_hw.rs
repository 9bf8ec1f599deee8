//! Mock hardware for integration tests.
//!
//! A scripted RS-485 panel, a canned environment that records which probes
//! were consulted, a counting delay and watchdog, and a sink that keeps
//! every emitted event.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use ervctl::app::events::{AppEvent, Check, CheckOutcome};
use ervctl::app::ports::{EnvironmentPort, EventSink, LocalAqiReading, SerialLink, WatchdogPort};
use ervctl::error::{LinkError, ProbeError};
use ervctl::erv::frames::ACK_FRAME;

// ── Panel / serial link ───────────────────────────────────────

/// How the simulated wall panel answers each transmitted frame.
#[derive(Debug, Clone)]
pub enum Panel {
    /// Acknowledges every frame (the first one is a ghost).
    Acks,
    /// Never answers.
    Silent,
    /// The adapter is unplugged; `open` fails.
    Unplugged,
    /// One reply per write, then silence.
    Script(VecDeque<Vec<u8>>),
}

pub struct MockLink {
    pub panel: Panel,
    pub writes: Vec<Vec<u8>>,
    pub opens: u32,
    pub closes: u32,
    pending: VecDeque<u8>,
}

impl MockLink {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            writes: Vec::new(),
            opens: 0,
            closes: 0,
            pending: VecDeque::new(),
        }
    }

    /// Replies for consecutive attempts: `true` answers with the ack frame.
    pub fn scripted(acks: &[bool]) -> Self {
        let replies = acks
            .iter()
            .map(|ack| if *ack { ACK_FRAME.to_vec() } else { Vec::new() })
            .collect();
        Self::new(Panel::Script(replies))
    }
}

impl SerialLink for MockLink {
    fn open(&mut self) -> Result<(), LinkError> {
        self.opens += 1;
        match self.panel {
            Panel::Unplugged => Err(LinkError::PortUnavailable),
            _ => Ok(()),
        }
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.writes.push(frame.to_vec());
        let reply = match &mut self.panel {
            Panel::Acks => ACK_FRAME.to_vec(),
            Panel::Silent | Panel::Unplugged => Vec::new(),
            Panel::Script(replies) => replies.pop_front().unwrap_or_default(),
        };
        self.pending = reply.into();
        Ok(())
    }

    fn read_until(
        &mut self,
        terminator: u8,
        buf: &mut [u8],
        _timeout_ms: u32,
    ) -> Result<usize, LinkError> {
        let mut n = 0;
        while n < buf.len() {
            let Some(b) = self.pending.pop_front() else {
                break;
            };
            buf[n] = b;
            n += 1;
            if b == terminator {
                break;
            }
        }
        Ok(n)
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}

// ── Delay ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockDelay {
    pub sleeps_ms: Vec<u32>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
    }
}

// ── Watchdog ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockWatchdog {
    feeds: Cell<u32>,
}

impl MockWatchdog {
    pub fn feeds(&self) -> u32 {
        self.feeds.get()
    }
}

impl WatchdogPort for MockWatchdog {
    fn feed(&self) {
        self.feeds.set(self.feeds.get() + 1);
    }
}

// ── Environment ───────────────────────────────────────────────

/// Canned probe answers. Every call is recorded by name, in order.
#[derive(Debug, Clone)]
pub struct MockEnvironment {
    pub hour: Result<u8, ProbeError>,
    pub minute: Result<u8, ProbeError>,
    pub temp_f: Result<i16, ProbeError>,
    pub epa_aqi: Result<u16, ProbeError>,
    pub local_aqi: Result<LocalAqiReading, ProbeError>,
    pub calls: Vec<&'static str>,
}

impl MockEnvironment {
    /// A pleasant spring noon with clean air everywhere.
    pub fn fair_day() -> Self {
        Self {
            hour: Ok(12),
            minute: Ok(5),
            temp_f: Ok(68),
            epa_aqi: Ok(35),
            local_aqi: Ok(LocalAqiReading {
                pm25: 8.0,
                age_secs: 30,
            }),
            calls: Vec::new(),
        }
    }

    /// Every probe failing except the clock.
    pub fn all_unknown(hour: u8) -> Self {
        Self {
            hour: Ok(hour),
            minute: Err(ProbeError::Unavailable),
            temp_f: Err(ProbeError::Unavailable),
            epa_aqi: Err(ProbeError::Unavailable),
            local_aqi: Err(ProbeError::Unavailable),
            calls: Vec::new(),
        }
    }

    pub fn called(&self, probe: &str) -> bool {
        self.calls.contains(&probe)
    }
}

impl EnvironmentPort for MockEnvironment {
    fn now_hour(&mut self) -> Result<u8, ProbeError> {
        self.calls.push("hour");
        self.hour
    }

    fn minute_of_hour(&mut self) -> Result<u8, ProbeError> {
        self.calls.push("minute");
        self.minute
    }

    fn outside_temp_f(&mut self) -> Result<i16, ProbeError> {
        self.calls.push("temp");
        self.temp_f
    }

    fn epa_aqi(&mut self) -> Result<u16, ProbeError> {
        self.calls.push("epa");
        self.epa_aqi
    }

    fn local_aqi(&mut self) -> Result<LocalAqiReading, ProbeError> {
        self.calls.push("local");
        self.local_aqi
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn outcomes(&self) -> Vec<(Check, CheckOutcome)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::CheckEvaluated { check, outcome, .. } => Some((*check, *outcome)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
