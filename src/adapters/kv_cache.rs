//! Webdis (Redis-over-HTTP) cache client.
//!
//! Every environmental reading the cascade needs is published into an
//! in-LAN Redis by other services; this adapter fetches them through
//! webdis. Webdis wraps each reply in a one-key object named after the
//! command:
//!
//! ```text
//! GET /GET/nws-temperature                 → {"GET":"71.6"}
//! GET /GET/json-epa-aqi                    → {"GET":"[{\"AQI\":42,...}]"}
//! GET /TS.GET/webdis-local-aqi-average     → {"TS.GET":[1700000000000,"12.5"]}
//! ```
//!
//! Scalars may arrive as strings or numbers. Parsing is pure and runs on
//! the host; only [`EspHttpTransport`] touches the network stack.

use serde_json::Value;

use crate::app::ports::LocalAqiReading;
use crate::error::ProbeError;

/// Largest response body accepted. The EPA array is the big one.
pub const MAX_BODY_LEN: usize = 4096;

/// Blocking HTTP GET returning the response body.
pub trait HttpTransport {
    fn get(&mut self, url: &str) -> Result<Vec<u8>, ProbeError>;
}

/// `{base}/{command}/{key}`, tolerating a trailing slash on `base`.
pub fn command_url(base: &str, command: &str, key: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), command, key)
}

// ───────────────────────────────────────────────────────────────
// Reply parsing
// ───────────────────────────────────────────────────────────────

/// Outdoor temperature in whole °F.
pub fn parse_temperature(body: &[u8]) -> Result<i16, ProbeError> {
    let doc = parse(body)?;
    let value = envelope(&doc, "GET")?;
    let f = number(value).ok_or(ProbeError::Malformed)?;
    if !(-100.0..=150.0).contains(&f) {
        return Err(ProbeError::Malformed);
    }
    Ok(f.round() as i16)
}

/// AQI of the first entry of the stored AirNow observation array.
pub fn parse_epa_aqi(body: &[u8]) -> Result<u16, ProbeError> {
    let doc = parse(body)?;
    let value = envelope(&doc, "GET")?;

    // The array is normally stored as a JSON string.
    let inner;
    let array = match value {
        Value::String(s) => {
            inner = parse(s.as_bytes())?;
            &inner
        }
        other => other,
    };

    let aqi = array
        .as_array()
        .and_then(|a| a.first())
        .and_then(|first| first.get("AQI"))
        .and_then(Value::as_i64)
        .ok_or(ProbeError::Malformed)?;
    u16::try_from(aqi).map_err(|_| ProbeError::Malformed)
}

/// Latest `[timestamp_ms, value]` sample and its age relative to `now_ms`.
/// A sample stamped in the future counts as brand new.
pub fn parse_local_aqi(body: &[u8], now_ms: u64) -> Result<LocalAqiReading, ProbeError> {
    let doc = parse(body)?;
    let sample = envelope(&doc, "TS.GET")?
        .as_array()
        .ok_or(ProbeError::Malformed)?;
    let [ts, value] = sample.as_slice() else {
        return Err(ProbeError::Malformed);
    };

    let ts_ms = number(ts).ok_or(ProbeError::Malformed)?;
    let pm25 = number(value).ok_or(ProbeError::Malformed)?;
    if ts_ms < 0.0 || pm25 < 0.0 {
        return Err(ProbeError::Malformed);
    }

    let age_ms = now_ms.saturating_sub(ts_ms as u64);
    Ok(LocalAqiReading {
        pm25: pm25 as f32,
        age_secs: u32::try_from(age_ms / 1_000).unwrap_or(u32::MAX),
    })
}

fn parse(body: &[u8]) -> Result<Value, ProbeError> {
    serde_json::from_slice(body).map_err(|_| ProbeError::Malformed)
}

/// The reply under `command`. A missing key (`null`) is unavailable, not
/// malformed.
fn envelope<'a>(doc: &'a Value, command: &str) -> Result<&'a Value, ProbeError> {
    match doc.get(command) {
        None => Err(ProbeError::Malformed),
        Some(Value::Null) => Err(ProbeError::Unavailable),
        Some(v) => Ok(v),
    }
}

/// Finite number, given either as JSON number or as a decimal string.
fn number(v: &Value) -> Option<f64> {
    let x = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    x.is_finite().then_some(x)
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF transport
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
pub use esp::EspHttpTransport;

#[cfg(feature = "espidf")]
mod esp {
    use core::time::Duration;

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use esp_idf_svc::io::Read;
    use log::debug;

    use super::{HttpTransport, MAX_BODY_LEN};
    use crate::error::ProbeError;

    pub struct EspHttpTransport {
        timeout: Duration,
    }

    impl EspHttpTransport {
        pub fn new(timeout_ms: u32) -> Self {
            Self {
                timeout: Duration::from_millis(u64::from(timeout_ms)),
            }
        }
    }

    impl HttpTransport for EspHttpTransport {
        fn get(&mut self, url: &str) -> Result<Vec<u8>, ProbeError> {
            let mut conn = EspHttpConnection::new(&Configuration {
                timeout: Some(self.timeout),
                ..Default::default()
            })
            .map_err(|_| ProbeError::Unavailable)?;

            conn.initiate_request(Method::Get, url, &[])
                .map_err(|_| ProbeError::Unavailable)?;
            conn.initiate_response()
                .map_err(|_| ProbeError::Unavailable)?;

            let status = conn.status();
            if status != 200 {
                debug!("HTTP {} from {}", status, url);
                return Err(ProbeError::Unavailable);
            }

            let mut body = Vec::new();
            let mut chunk = [0u8; 256];
            loop {
                let n = conn.read(&mut chunk).map_err(|_| ProbeError::Unavailable)?;
                if n == 0 {
                    break;
                }
                if body.len() + n > MAX_BODY_LEN {
                    return Err(ProbeError::Malformed);
                }
                body.extend_from_slice(&chunk[..n]);
            }
            Ok(body)
        }
    }
}
