//! The ventilation predicates, as pure functions of already-fetched values.
//!
//! Each predicate answers "does this condition require standby?". Probe
//! failures are resolved by the caller before getting here: an unknown
//! value never reaches these functions and never forces standby.

use crate::app::ports::LocalAqiReading;
use crate::config::ControllerConfig;

/// Hours `{h mod 24 : h ∈ [night_start, night_end + 24)}`.
///
/// With the defaults (22, 6) this is 22, 23, 0, 1, 2, 3, 4, 5.
pub fn is_night(hour: u8, cfg: &ControllerConfig) -> bool {
    let hour = u16::from(hour % 24);
    let start = u16::from(cfg.night_start);
    let end = u16::from(cfg.night_end) + 24;
    (start..end).any(|h| h % 24 == hour)
}

/// Fresh neighborhood reading at or above the limit. Readings at least
/// `local_aqi_freshness_secs` old are ignored whatever their value.
pub fn local_aqi_bad(reading: LocalAqiReading, cfg: &ControllerConfig) -> bool {
    is_fresh(reading, cfg) && reading.pm25 >= cfg.high_local_aqi
}

pub fn is_fresh(reading: LocalAqiReading, cfg: &ControllerConfig) -> bool {
    reading.age_secs < cfg.local_aqi_freshness_secs
}

/// AirNow publishes about 15 minutes past the hour, so the cached value is
/// only refreshed strictly between minutes 20 and 30.
pub fn epa_refresh_due(minute: u8) -> bool {
    minute > 20 && minute < 30
}

/// Regional AQI strictly above the limit.
pub fn epa_aqi_bad(aqi: u16, cfg: &ControllerConfig) -> bool {
    aqi > cfg.high_epa_aqi
}

/// A zero reading carries no information (the weather feed reports 0 when
/// it has nothing) and is never out of band.
pub fn temp_usable(temp_f: i16) -> bool {
    temp_f != 0
}

/// Outside the comfortable band, exclusive at both ends.
pub fn too_hot_or_cold(temp_f: i16, cfg: &ControllerConfig) -> bool {
    temp_usable(temp_f) && (temp_f < cfg.too_cold_f || temp_f > cfg.too_hot_f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ControllerConfig {
        ControllerConfig::default()
    }

    #[test]
    fn default_night_hours() {
        let night: Vec<u8> = (0..24).filter(|h| is_night(*h, &cfg())).collect();
        assert_eq!(night, [0, 1, 2, 3, 4, 5, 22, 23]);
    }

    #[test]
    fn custom_night_window() {
        let c = ControllerConfig {
            night_start: 21,
            night_end: 7,
            ..cfg()
        };
        assert!(is_night(21, &c));
        assert!(is_night(6, &c));
        assert!(!is_night(7, &c));
        assert!(!is_night(20, &c));
    }

    #[test]
    fn local_aqi_threshold_is_inclusive() {
        let fresh = |pm25| LocalAqiReading { pm25, age_secs: 5 };
        assert!(local_aqi_bad(fresh(40.0), &cfg()));
        assert!(!local_aqi_bad(fresh(39.9), &cfg()));
    }

    #[test]
    fn stale_local_aqi_ignored() {
        let r = LocalAqiReading {
            pm25: 500.0,
            age_secs: 180,
        };
        assert!(!local_aqi_bad(r, &cfg()));
        let r = LocalAqiReading { age_secs: 179, ..r };
        assert!(local_aqi_bad(r, &cfg()));
    }

    #[test]
    fn epa_window_is_exclusive() {
        assert!(!epa_refresh_due(20));
        assert!(epa_refresh_due(21));
        assert!(epa_refresh_due(29));
        assert!(!epa_refresh_due(30));
    }

    #[test]
    fn epa_threshold_is_exclusive() {
        assert!(!epa_aqi_bad(100, &cfg()));
        assert!(epa_aqi_bad(101, &cfg()));
    }

    #[test]
    fn temperature_band() {
        assert!(too_hot_or_cold(31, &cfg()));
        assert!(!too_hot_or_cold(32, &cfg()));
        assert!(!too_hot_or_cold(90, &cfg()));
        assert!(too_hot_or_cold(91, &cfg()));
        assert!(too_hot_or_cold(-5, &cfg()));
    }

    #[test]
    fn zero_temperature_is_no_data() {
        assert!(!temp_usable(0));
        assert!(!too_hot_or_cold(0, &cfg()));
    }
}
