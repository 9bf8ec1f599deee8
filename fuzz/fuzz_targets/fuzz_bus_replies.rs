//! Fuzz target: `ErvDriver` against arbitrary bus traffic
//!
//! Every write is answered with an arbitrary chunk of the fuzz input, so
//! the reception loop sees torn frames, floods, stray terminators and
//! occasionally the real ack.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Never more transmissions than configured attempts
//! - Success implies at least two transmissions (first ack is a ghost)
//!
//! cargo fuzz run fuzz_bus_replies

#![no_main]

use embedded_hal::delay::DelayNs;
use ervctl::app::ports::SerialLink;
use ervctl::config::DriverConfig;
use ervctl::error::LinkError;
use ervctl::erv::{ErvDriver, Mode};
use libfuzzer_sys::fuzz_target;

struct FuzzLink<'a> {
    chunks: core::slice::Chunks<'a, u8>,
    pending: &'a [u8],
    writes: usize,
}

impl SerialLink for FuzzLink<'_> {
    fn open(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn write(&mut self, _frame: &[u8]) -> Result<(), LinkError> {
        self.writes += 1;
        self.pending = self.chunks.next().unwrap_or(&[]);
        Ok(())
    }

    fn read_until(&mut self, term: u8, buf: &mut [u8], _t: u32) -> Result<usize, LinkError> {
        let take = match self.pending.iter().position(|b| *b == term) {
            Some(i) => i + 1,
            None => self.pending.len(),
        }
        .min(buf.len());
        buf[..take].copy_from_slice(&self.pending[..take]);
        self.pending = &self.pending[take..];
        Ok(take)
    }

    fn close(&mut self) {}
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
    fn delay_ms(&mut self, _ms: u32) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&head, rest)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(head % 64) + 1;
    let mode = Mode::ALL[usize::from(head) % Mode::ALL.len()];

    let link = FuzzLink {
        chunks: rest.chunks(chunk * 8),
        pending: &[],
        writes: 0,
    };
    let config = DriverConfig::default();
    let mut erv = ErvDriver::new(link, NoDelay, config);
    let status = erv.set_mode(mode);

    let writes = erv.link().writes;
    assert!(writes <= usize::from(config.attempts));
    if status.succeeded() {
        assert!(writes >= 2, "ghost ack counted");
    }
});
