//! Fuzz target: webdis reply parsers
//!
//! Feeds arbitrary bodies to the three cache parsers.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Temperatures stay inside the accepted band
//! - Local AQI readings are never negative
//!
//! cargo fuzz run fuzz_webdis_replies

#![no_main]

use ervctl::adapters::kv_cache::{parse_epa_aqi, parse_local_aqi, parse_temperature};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(t) = parse_temperature(data) {
        assert!((-100..=150).contains(&t));
    }
    let _ = parse_epa_aqi(data);
    if let Ok(r) = parse_local_aqi(data, 1_700_000_000_000) {
        assert!(r.pm25 >= 0.0);
    }
});
