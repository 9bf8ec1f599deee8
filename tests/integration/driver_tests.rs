//! Protocol driver against a scripted panel.

use std::collections::VecDeque;

use ervctl::config::DriverConfig;
use ervctl::error::DriverError;
use ervctl::erv::driver::RX_BUFFER_LEN;
use ervctl::erv::frames::{ACK_FRAME, command_frame};
use ervctl::erv::{ErvDriver, Mode, SendStatus};

use super::mock_hw::{MockDelay, MockLink, Panel};

fn driver(link: MockLink) -> ErvDriver<MockLink, MockDelay> {
    ErvDriver::new(link, MockDelay::default(), DriverConfig::default())
}

#[test]
fn each_mode_operation_sends_its_own_frame() {
    type Op = fn(&mut ErvDriver<MockLink, MockDelay>) -> SendStatus;
    let ops: [(Mode, Op); 9] = [
        (Mode::Standby, ErvDriver::standby),
        (Mode::Smart, ErvDriver::smart),
        (Mode::Away, ErvDriver::away),
        (Mode::Min, ErvDriver::min),
        (Mode::Med, ErvDriver::med),
        (Mode::Max, ErvDriver::max),
        (Mode::RecircMin, ErvDriver::recirc_min),
        (Mode::RecircMed, ErvDriver::recirc_med),
        (Mode::RecircMax, ErvDriver::recirc_max),
    ];

    for (mode, op) in ops {
        let mut erv = driver(MockLink::new(Panel::Acks));
        let status = op(&mut erv);
        assert!(status.succeeded(), "{mode}");
        assert_eq!(erv.last_mode(), Some(mode));
        assert!(erv.is_in(mode));
        assert!(erv.link().writes.iter().all(|w| w == command_frame(mode)), "{mode}");
    }
}

#[test]
fn lone_ghost_ack_is_a_failure() {
    let mut erv = driver(MockLink::scripted(&[true]));
    let status = erv.smart();
    assert!(!status.succeeded());
    assert_eq!(status.attempts, 11);
    assert!(!erv.is_in(Mode::Smart));
    assert_eq!(erv.last_mode(), Some(Mode::Smart));
}

#[test]
fn backoff_is_fixed_and_follows_every_miss() {
    let mut erv = driver(MockLink::new(Panel::Silent));
    erv.standby();
    let delay = erv_delay(&erv);
    assert_eq!(delay.len(), 11);
    assert!(delay.iter().all(|ms| *ms == 250));
}

#[test]
fn late_ack_stops_retrying() {
    let mut erv = driver(MockLink::scripted(&[false, false, false, false, true]));
    let status = erv.max();
    assert_eq!(status.to_string(), ".....OK");
    assert_eq!(erv.link().writes.len(), 5);
    assert_eq!(erv_delay(&erv).len(), 4);
}

#[test]
fn attempts_are_configurable() {
    let config = DriverConfig {
        attempts: 3,
        ..DriverConfig::default()
    };
    let mut erv = ErvDriver::new(MockLink::new(Panel::Silent), MockDelay::default(), config);
    let status = erv.away();
    assert_eq!(status.to_string(), "...FAILED");
    assert_eq!(erv.link().writes.len(), 3);
}

#[test]
fn port_is_opened_and_closed_once_per_send() {
    let mut erv = driver(MockLink::new(Panel::Acks));
    erv.smart();
    erv.standby();
    assert_eq!(erv.link().opens, 2);
    assert_eq!(erv.link().closes, 2);
}

#[test]
fn unplugged_adapter_reports_port_unavailable() {
    let mut erv = driver(MockLink::new(Panel::Unplugged));
    let status = erv.min();
    assert_eq!(status.error(), Some(DriverError::PortUnavailable));
    assert_eq!(status.to_string(), "FAILED");
    assert_eq!(erv.last_status(), Some(status));
}

#[test]
fn ack_beyond_reception_buffer_is_missed() {
    let chatter = [0x01, 0x10, 0x12, 0x01, 0x01, 0x04];
    let mut flood: Vec<u8> = chatter
        .iter()
        .copied()
        .cycle()
        .take(RX_BUFFER_LEN + chatter.len())
        .collect();
    flood.extend_from_slice(&ACK_FRAME);

    let mut near: Vec<u8> = chatter.repeat(10);
    near.extend_from_slice(&ACK_FRAME);

    let replies = VecDeque::from([Vec::new(), flood, near]);
    let mut erv = driver(MockLink::new(Panel::Script(replies)));
    let status = erv.recirc_max();
    // Attempt 2 drowns its ack in chatter; attempt 3 finds it.
    assert_eq!(status.to_string(), "...OK");
}

#[test]
fn success_clears_after_a_later_failure() {
    let replies = VecDeque::from([Vec::new(), ACK_FRAME.to_vec()]);
    let mut erv = driver(MockLink::new(Panel::Script(replies)));
    assert!(erv.smart().succeeded());
    assert!(erv.is_in(Mode::Smart));

    // Script exhausted: the panel has gone quiet.
    assert!(!erv.smart().succeeded());
    assert!(!erv.is_in(Mode::Smart));
}

fn erv_delay(erv: &ErvDriver<MockLink, MockDelay>) -> &[u32] {
    &erv.delay().sleeps_ms
}
