//! Sensor probe hub.
//!
//! Implements [`EnvironmentPort`] on top of a [`WallClock`] and the webdis
//! cache. Each call is one HTTP round trip; nothing is cached here (the
//! service owns the EPA cache).

use log::debug;

use super::kv_cache::{self, HttpTransport};
use super::time::WallClock;
use crate::app::ports::{EnvironmentPort, LocalAqiReading};
use crate::config::ProbeConfig;
use crate::error::ProbeError;

pub struct ProbeHub<H, C> {
    http: H,
    clock: C,
    config: ProbeConfig,
}

impl<H: HttpTransport, C: WallClock> ProbeHub<H, C> {
    pub fn new(http: H, clock: C, config: ProbeConfig) -> Self {
        Self {
            http,
            clock,
            config,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn fetch(&mut self, command: &str, key: &str) -> Result<Vec<u8>, ProbeError> {
        let url = kv_cache::command_url(&self.config.cache_url, command, key);
        let result = self.http.get(&url);
        if let Err(e) = &result {
            debug!("Probe: {} failed ({})", url, e);
        }
        result
    }
}

impl<H: HttpTransport, C: WallClock> EnvironmentPort for ProbeHub<H, C> {
    fn now_hour(&mut self) -> Result<u8, ProbeError> {
        self.clock
            .local_time()
            .map(|t| t.hour)
            .ok_or(ProbeError::Unavailable)
    }

    fn minute_of_hour(&mut self) -> Result<u8, ProbeError> {
        self.clock
            .local_time()
            .map(|t| t.minute)
            .ok_or(ProbeError::Unavailable)
    }

    fn outside_temp_f(&mut self) -> Result<i16, ProbeError> {
        let key = self.config.temperature_key.clone();
        let body = self.fetch("GET", &key)?;
        kv_cache::parse_temperature(&body)
    }

    fn epa_aqi(&mut self) -> Result<u16, ProbeError> {
        let key = self.config.epa_aqi_key.clone();
        let body = self.fetch("GET", &key)?;
        kv_cache::parse_epa_aqi(&body)
    }

    /// Needs a synced clock to age the sample.
    fn local_aqi(&mut self) -> Result<LocalAqiReading, ProbeError> {
        let now_ms = self.clock.unix_ms().ok_or(ProbeError::Unavailable)?;
        let key = self.config.local_aqi_key.clone();
        let body = self.fetch("TS.GET", &key)?;
        kv_cache::parse_local_aqi(&body, now_ms)
    }
}
