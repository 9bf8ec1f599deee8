//! Clock and delay adapters.
//!
//! - **`feature = "espidf"`**: wall time from the system clock after SNTP
//!   sync, converted with the POSIX TZ string; monotonic time from
//!   `esp_timer_get_time()`.
//! - **host**: `std::time` with local time reported as UTC, plus a
//!   thread-sleep [`DelayNs`] for the CLI's inter-attempt back-off.

#[cfg(not(feature = "espidf"))]
use embedded_hal::delay::DelayNs;

/// Reject obviously unsynced time (before 2020-01-01).
const EPOCH_2020: u64 = 1_577_836_800;

/// Local wall-clock time, the only parts the cascade needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
}

/// Wall-clock source for the probes. `None` means not synchronised yet.
pub trait WallClock {
    fn local_time(&self) -> Option<LocalTime>;
    fn unix_ms(&self) -> Option<u64>;
}

/// Time adapter for the ESP32-C3 platform.
pub struct Esp32TimeAdapter {
    #[cfg(feature = "espidf")]
    _sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Esp32TimeAdapter {
    /// Host clock; nothing to configure.
    #[cfg(not(feature = "espidf"))]
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Set the timezone and start SNTP. Until the first sync completes
    /// every wall-clock query returns `None`.
    #[cfg(feature = "espidf")]
    pub fn new(timezone: &str) -> Self {
        // SAFETY: called once at boot before any other thread reads TZ.
        unsafe {
            std::env::set_var("TZ", timezone);
            esp_idf_svc::sys::tzset();
        }
        let sntp = match esp_idf_svc::sntp::EspSntp::new_default() {
            Ok(s) => {
                log::info!("Clock: SNTP started (TZ={})", timezone);
                Some(s)
            }
            Err(e) => {
                log::warn!("Clock: SNTP start failed ({}), time stays unsynced", e);
                None
            }
        };
        Self { _sntp: sntp }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(feature = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(feature = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(feature = "espidf")]
    fn unix_secs(&self) -> Option<u64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        let secs = u64::try_from(tv.tv_sec).ok()?;
        (secs >= EPOCH_2020).then_some(secs)
    }

    #[cfg(not(feature = "espidf"))]
    fn unix_secs(&self) -> Option<u64> {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_secs();
        (secs >= EPOCH_2020).then_some(secs)
    }
}

#[cfg(not(feature = "espidf"))]
impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for Esp32TimeAdapter {
    #[cfg(feature = "espidf")]
    fn local_time(&self) -> Option<LocalTime> {
        let secs = self.unix_secs()? as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        if !(0..24).contains(&tm.tm_hour) || !(0..60).contains(&tm.tm_min) {
            return None;
        }
        Some(LocalTime {
            hour: tm.tm_hour as u8,
            minute: tm.tm_min as u8,
        })
    }

    #[cfg(not(feature = "espidf"))]
    fn local_time(&self) -> Option<LocalTime> {
        self.unix_secs().map(utc_time_of_day)
    }

    fn unix_ms(&self) -> Option<u64> {
        self.unix_secs().map(|s| s * 1_000)
    }
}

/// Hour and minute of a Unix timestamp in UTC.
pub fn utc_time_of_day(unix_secs: u64) -> LocalTime {
    let of_day = unix_secs % 86_400;
    LocalTime {
        hour: (of_day / 3_600) as u8,
        minute: (of_day % 3_600 / 60) as u8,
    }
}

/// Blocking delay for the host CLI.
#[cfg(not(feature = "espidf"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepDelay;

#[cfg(not(feature = "espidf"))]
impl DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
