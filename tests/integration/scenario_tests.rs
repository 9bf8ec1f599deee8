//! End-to-end ticks: environment → cascade → gate → driver → watchdog.

use ervctl::app::events::{AppEvent, Check, CheckOutcome, TickReport};
use ervctl::app::ports::LocalAqiReading;
use ervctl::app::service::VentilationService;
use ervctl::config::{ControllerConfig, DriverConfig};
use ervctl::error::{DriverError, ProbeError};
use ervctl::erv::frames::command_frame;
use ervctl::erv::{ErvDriver, Mode};

use super::mock_hw::{MockDelay, MockEnvironment, MockLink, MockWatchdog, Panel, RecordingSink};

struct Rig {
    service: VentilationService,
    erv: ErvDriver<MockLink, MockDelay>,
    watchdog: MockWatchdog,
    sink: RecordingSink,
}

impl Rig {
    fn new(panel: Panel) -> Self {
        Self {
            service: VentilationService::new(ControllerConfig::default()),
            erv: ErvDriver::new(
                MockLink::new(panel),
                MockDelay::default(),
                DriverConfig::default(),
            ),
            watchdog: MockWatchdog::default(),
            sink: RecordingSink::default(),
        }
    }

    fn start(&mut self, env: &mut MockEnvironment) {
        self.service.start(env, &mut self.sink);
    }

    fn tick(&mut self, env: &mut MockEnvironment) -> TickReport {
        self.service.tick(env, &mut self.erv, &self.watchdog, &mut self.sink)
    }

    fn writes(&self) -> &[Vec<u8>] {
        &self.erv.link().writes
    }
}

// ── Scenario 1: cold night ────────────────────────────────────

#[test]
fn cold_night_goes_standby_without_consulting_other_probes() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment {
        hour: Ok(23),
        temp_f: Ok(20),
        ..MockEnvironment::fair_day()
    };

    let report = rig.tick(&mut env);

    assert_eq!(report.target, Mode::Standby);
    assert_eq!(report.outcome(Check::Night), Some(CheckOutcome::Off));
    assert_eq!(report.checks.len(), 1);
    assert_eq!(env.calls, ["hour"]);

    let status = report.status.expect("standby must be transmitted");
    assert_eq!(status.to_string(), "..OK");
    assert!(rig.writes().iter().all(|w| w == command_frame(Mode::Standby)));
    assert_eq!(rig.watchdog.feeds(), 1);
}

// ── Scenario 2: clear noon ────────────────────────────────────

#[test]
fn clear_noon_goes_smart() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment::fair_day();
    rig.start(&mut env);
    assert_eq!(rig.service.last_epa_aqi(), Some(35));

    let report = rig.tick(&mut env);

    assert_eq!(report.target, Mode::Smart);
    assert!(report.checks.iter().all(|(_, o)| *o == CheckOutcome::Ok));
    assert_eq!(report.checks.len(), 4);
    assert_eq!(rig.writes().len(), 2);
    assert!(rig.writes().iter().all(|w| w == command_frame(Mode::Smart)));
    assert!(rig.erv.is_in(Mode::Smart));
}

#[test]
fn predicates_run_in_cascade_order() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment::fair_day();
    rig.tick(&mut env);
    // minute 5 is outside the EPA window, so no EPA fetch.
    assert_eq!(env.calls, ["hour", "local", "minute", "temp"]);
    assert_eq!(
        rig.sink.outcomes().iter().map(|(c, _)| *c).collect::<Vec<_>>(),
        [Check::Night, Check::LocalAqi, Check::EpaAqi, Check::OutsideTemp]
    );
}

// ── Scenario 3: bad regional air ──────────────────────────────

#[test]
fn bad_regional_air_goes_standby() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment {
        hour: Ok(14),
        minute: Ok(25),
        epa_aqi: Ok(150),
        ..MockEnvironment::fair_day()
    };

    let report = rig.tick(&mut env);

    assert_eq!(report.target, Mode::Standby);
    assert_eq!(report.outcome(Check::EpaAqi), Some(CheckOutcome::Off));
    assert_eq!(report.outcome(Check::OutsideTemp), None);
    assert!(!env.called("temp"));
    assert_eq!(rig.service.last_epa_aqi(), Some(150));
}

#[test]
fn epa_cache_survives_outside_refresh_window() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment {
        minute: Ok(25),
        epa_aqi: Ok(150),
        ..MockEnvironment::fair_day()
    };
    assert_eq!(rig.tick(&mut env).target, Mode::Standby);

    // The feed improves, but we are past the window: the cached bad value holds.
    env.minute = Ok(40);
    env.epa_aqi = Ok(20);
    env.calls.clear();
    assert_eq!(rig.tick(&mut env).target, Mode::Standby);
    assert!(!env.called("epa"));

    env.minute = Ok(21);
    assert_eq!(rig.tick(&mut env).target, Mode::Smart);
    assert_eq!(rig.service.last_epa_aqi(), Some(20));
}

#[test]
fn failed_epa_refresh_forgets_cached_value() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment {
        epa_aqi: Ok(180),
        ..MockEnvironment::fair_day()
    };
    rig.start(&mut env);
    assert_eq!(rig.tick(&mut env).target, Mode::Standby);

    env.minute = Ok(22);
    env.epa_aqi = Err(ProbeError::Unavailable);
    let report = rig.tick(&mut env);
    assert_eq!(rig.service.last_epa_aqi(), None);
    assert_eq!(report.outcome(Check::EpaAqi), Some(CheckOutcome::Error));
    assert_eq!(report.target, Mode::Smart);
}

// ── Scenario 4: transient probe failure ───────────────────────

#[test]
fn probe_failures_never_block_ventilation() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment::all_unknown(10);
    rig.start(&mut env);

    let report = rig.tick(&mut env);

    assert_eq!(report.target, Mode::Smart);
    assert_eq!(report.outcome(Check::Night), Some(CheckOutcome::Ok));
    assert_eq!(report.outcome(Check::LocalAqi), Some(CheckOutcome::Error));
    assert_eq!(report.outcome(Check::EpaAqi), Some(CheckOutcome::Error));
    assert_eq!(report.outcome(Check::OutsideTemp), Some(CheckOutcome::Error));
}

#[test]
fn unsynced_clock_is_not_night() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment {
        hour: Err(ProbeError::Unavailable),
        ..MockEnvironment::fair_day()
    };
    let report = rig.tick(&mut env);
    assert_eq!(report.outcome(Check::Night), Some(CheckOutcome::Error));
    assert_eq!(report.target, Mode::Smart);
}

#[test]
fn zero_temperature_is_no_data() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment {
        temp_f: Ok(0),
        ..MockEnvironment::fair_day()
    };
    let report = rig.tick(&mut env);
    assert_eq!(report.outcome(Check::OutsideTemp), Some(CheckOutcome::Error));
    assert_eq!(report.target, Mode::Smart);
}

// ── Scenario 5: stale neighbor sensor ─────────────────────────

#[test]
fn stale_neighbor_reading_is_ignored() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment {
        local_aqi: Ok(LocalAqiReading {
            pm25: 55.0,
            age_secs: 600,
        }),
        ..MockEnvironment::fair_day()
    };
    let report = rig.tick(&mut env);
    assert_eq!(report.outcome(Check::LocalAqi), Some(CheckOutcome::Ok));
    assert_eq!(report.target, Mode::Smart);

    env.local_aqi = Ok(LocalAqiReading {
        pm25: 55.0,
        age_secs: 20,
    });
    let report = rig.tick(&mut env);
    assert_eq!(report.outcome(Check::LocalAqi), Some(CheckOutcome::Off));
    assert_eq!(report.target, Mode::Standby);
}

// ── Scenario 6: driver permanently unreachable ────────────────

#[test]
fn unreachable_panel_fails_and_retries_next_tick() {
    let mut rig = Rig::new(Panel::Silent);
    let mut env = MockEnvironment::fair_day();

    let status = rig.tick(&mut env).status.expect("first tick transmits");
    assert_eq!(status.attempts, 11);
    assert_eq!(status.error(), Some(DriverError::AckTimeout));
    assert!(status.to_string().ends_with("...........FAILED"));
    assert_eq!(rig.writes().len(), 11);
    assert_eq!(rig.erv.link().closes, 1);
    assert_eq!(rig.watchdog.feeds(), 1);

    let again = rig.tick(&mut env);
    assert!(again.transmitted(), "a failed send must be retried");
    assert_eq!(rig.writes().len(), 22);
    assert_eq!(rig.watchdog.feeds(), 2);
}

#[test]
fn unplugged_adapter_still_feeds_watchdog() {
    let mut rig = Rig::new(Panel::Unplugged);
    let mut env = MockEnvironment::fair_day();

    let status = rig.tick(&mut env).status.unwrap();
    assert_eq!(status.error(), Some(DriverError::PortUnavailable));
    assert_eq!(status.attempts, 0);
    assert!(rig.writes().is_empty());
    assert_eq!(rig.watchdog.feeds(), 1);
}

// ── Idempotence gate ──────────────────────────────────────────

#[test]
fn repeated_outcome_transmits_once() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment::fair_day();

    assert!(rig.tick(&mut env).transmitted());
    let writes = rig.writes().len();

    rig.sink.clear();
    let second = rig.tick(&mut env);
    assert!(!second.transmitted());
    assert_eq!(rig.writes().len(), writes);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::AlreadyInMode(Mode::Smart))),
        1
    );
    assert_eq!(rig.watchdog.feeds(), 2);
}

#[test]
fn mode_flip_transmits_new_frame() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment::fair_day();
    rig.tick(&mut env);

    env.hour = Ok(22);
    let report = rig.tick(&mut env);
    assert!(report.transmitted());
    assert_eq!(rig.erv.last_mode(), Some(Mode::Standby));
    assert_eq!(rig.writes().last().unwrap(), command_frame(Mode::Standby));
}

#[test]
fn tick_summary_closes_every_tick() {
    let mut rig = Rig::new(Panel::Acks);
    let mut env = MockEnvironment::fair_day();
    rig.tick(&mut env);
    rig.tick(&mut env);

    assert_eq!(rig.service.tick_count(), 2);
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::TickSummary(r)) if r.tick == 2
    ));
}
