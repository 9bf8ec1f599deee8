//! System configuration parameters
//!
//! All tunable parameters for the ERV controller. Thresholds are fixed at
//! boot; nothing here is persisted. The firmware uses the defaults with a
//! handful of compile-time overrides ([`BuildOverrides`]).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Decision-loop thresholds and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Night window ---
    /// First hour (local) of the night window, inclusive.
    pub night_start: u8,
    /// First hour (local) after the night window.
    pub night_end: u8,

    // --- Outdoor temperature band (°F) ---
    /// ERV off below this temperature.
    pub too_cold_f: i16,
    /// ERV off above this temperature.
    pub too_hot_f: i16,

    // --- Air quality ---
    /// ERV off when the regional EPA AQI is strictly above this.
    pub high_epa_aqi: u16,
    /// ERV off when the neighborhood PM2.5 is at or above this.
    pub high_local_aqi: f32,
    /// Neighborhood readings at least this old are ignored.
    pub local_aqi_freshness_secs: u32,

    // --- Seasons (day of year) ---
    /// Beginning of summer hours (Apr 15). Exposed, not consulted.
    pub spring_day: u16,
    /// Beginning of winter hours (Oct 15). Exposed, not consulted.
    pub fall_day: u16,

    // --- Timing ---
    /// Decision loop period (milliseconds).
    pub tick_ms: u32,
    /// Hardware watchdog timeout (milliseconds).
    pub watchdog_ms: u32,

    /// POSIX TZ string used for local wall-clock hours.
    pub timezone: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            night_start: 22,
            night_end: 6,

            too_cold_f: 32,
            too_hot_f: 90,

            high_epa_aqi: 100,
            high_local_aqi: 40.0,
            local_aqi_freshness_secs: 180,

            spring_day: 106,
            fall_day: 289,

            tick_ms: 300_000,     // 5 min
            watchdog_ms: 600_000, // 10 min

            timezone: String::from("CST6CDT,M3.2.0,M11.1.0"),
        }
    }
}

impl ControllerConfig {
    /// Reject values that would make the cascade or the watchdog misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.night_start > 23 || self.night_end > 23 {
            return Err(Error::Config("night hours must be 0-23"));
        }
        if self.too_cold_f >= self.too_hot_f {
            return Err(Error::Config("too_cold_f must be below too_hot_f"));
        }
        if self.tick_ms == 0 {
            return Err(Error::Config("tick_ms must be non-zero"));
        }
        if self.watchdog_ms <= self.tick_ms {
            return Err(Error::Config("watchdog_ms must exceed tick_ms"));
        }
        if self.spring_day == 0 || self.fall_day > 366 || self.spring_day >= self.fall_day {
            return Err(Error::Config("season bands must satisfy 1 <= spring < fall <= 366"));
        }
        Ok(())
    }
}

/// RS-485 line parameters and retry policy for the protocol driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Transmit attempts per mode change.
    pub attempts: u8,
    /// Line rate (8-N-1 is fixed).
    pub baud: u32,
    /// How long a single read waits for the frame terminator.
    pub read_timeout_ms: u32,
    /// Sleep between attempts.
    pub backoff_ms: u32,
    /// Quiet time before driving the bus.
    pub pre_tx_delay_ms: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            attempts: 11,
            baud: 38_400,
            read_timeout_ms: 100,
            backoff_ms: 250,
            pre_tx_delay_ms: 5,
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<()> {
        // Ghost-OK discards the first ack, so one attempt can never succeed.
        if self.attempts < 2 {
            return Err(Error::Config("attempts must be at least 2"));
        }
        if self.baud == 0 {
            return Err(Error::Config("baud must be non-zero"));
        }
        Ok(())
    }

    /// Upper bound on the time one mode change can hold the bus.
    pub fn worst_case_ms(&self) -> u32 {
        u32::from(self.attempts) * (self.read_timeout_ms + self.backoff_ms)
    }
}

/// Where the environmental probes read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Base URL of the webdis front-end of the in-LAN cache.
    pub cache_url: String,
    /// Key holding the NWS outdoor temperature (°F, decimal string).
    pub temperature_key: String,
    /// Key holding the AirNow observation array (JSON string).
    pub epa_aqi_key: String,
    /// Time-series key holding the neighborhood PM2.5 average.
    pub local_aqi_key: String,
    /// Per-request timeout.
    pub http_timeout_ms: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cache_url: String::from("http://webdis.local:7379"),
            temperature_key: String::from("nws-temperature"),
            epa_aqi_key: String::from("json-epa-aqi"),
            local_aqi_key: String::from("webdis-local-aqi-average"),
            http_timeout_ms: 10_000,
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.cache_url.starts_with("http://") || self.cache_url.starts_with("https://")) {
            return Err(Error::Config("cache_url must be an http(s) URL"));
        }
        if self.http_timeout_ms == 0 || self.http_timeout_ms > 30_000 {
            return Err(Error::Config("http_timeout_ms must be 1-30000"));
        }
        Ok(())
    }
}

/// Values baked into the firmware image at compile time.
///
/// Set `ERV_CACHE_URL`, `ERV_TZ`, `ERV_WIFI_SSID` and `ERV_WIFI_PASS` in
/// the build environment; anything unset keeps its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOverrides {
    pub cache_url: Option<&'static str>,
    pub timezone: Option<&'static str>,
    pub wifi_ssid: Option<&'static str>,
    pub wifi_pass: Option<&'static str>,
}

impl BuildOverrides {
    pub const fn from_build_env() -> Self {
        Self {
            cache_url: option_env!("ERV_CACHE_URL"),
            timezone: option_env!("ERV_TZ"),
            wifi_ssid: option_env!("ERV_WIFI_SSID"),
            wifi_pass: option_env!("ERV_WIFI_PASS"),
        }
    }

    pub fn apply(&self, controller: &mut ControllerConfig, probes: &mut ProbeConfig) {
        if let Some(url) = self.cache_url {
            probes.cache_url = url.to_owned();
        }
        if let Some(tz) = self.timezone {
            controller.timezone = tz.to_owned();
        }
    }

    /// SSID and passphrase, if an SSID was provided.
    pub fn wifi_credentials(&self) -> Option<(&'static str, &'static str)> {
        self.wifi_ssid.map(|ssid| (ssid, self.wifi_pass.unwrap_or("")))
    }
}
