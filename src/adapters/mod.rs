//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements        | Connects to                    |
//! |---------------|-------------------|--------------------------------|
//! | `uart`        | SerialLink        | ESP32 UART1 + RS-485 module    |
//! | `serial_host` | SerialLink        | USB-to-RS485 adapter (host)    |
//! | `probes`      | EnvironmentPort   | clock + webdis cache           |
//! | `kv_cache`    | HttpTransport     | webdis over ESP-IDF HTTP       |
//! | `time`        | WallClock         | SNTP-synced system clock       |
//! | `log_sink`    | EventSink         | Serial log output              |
//! | `wifi`        | ConnectivityPort  | ESP-IDF WiFi STA               |

pub mod kv_cache;
pub mod log_sink;
pub mod probes;
#[cfg(feature = "host")]
pub mod serial_host;
pub mod time;
pub mod uart;
pub mod wifi;
