//! ERV controller firmware: main entry point.
//!
//! Hexagonal architecture with a single run-to-completion tick loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartLink        ProbeHub            LogEventSink   Watchdog   │
//! │  (SerialLink)    (EnvironmentPort)   (EventSink)    (TWDT)     │
//! │  WifiAdapter     Esp32TimeAdapter    EspHttpTransport          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  VentilationService (cascade · idempotence gate)       │    │
//! │  │  ErvDriver (VTTOUCHW frames · ghost-OK · retries)      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Ticker (fixed period, first tick at boot)                     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use ervctl::Error;
use ervctl::adapters::kv_cache::EspHttpTransport;
use ervctl::adapters::log_sink::LogEventSink;
use ervctl::adapters::probes::ProbeHub;
use ervctl::adapters::time::Esp32TimeAdapter;
use ervctl::adapters::uart::UartLink;
use ervctl::adapters::wifi::{ConnectivityPort, WifiAdapter};
use ervctl::app::service::VentilationService;
use ervctl::config::{BuildOverrides, ControllerConfig, DriverConfig, ProbeConfig};
use ervctl::drivers::watchdog::Watchdog;
use ervctl::erv::ErvDriver;
use ervctl::ticker::{TickWait, Ticker};

/// Longest single sleep between ticker polls.
const MAX_SLEEP_MS: u64 = 1_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ERV controller v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let overrides = BuildOverrides::from_build_env();
    let mut controller = ControllerConfig::default();
    let mut probe_cfg = ProbeConfig::default();
    let driver_cfg = DriverConfig::default();
    overrides.apply(&mut controller, &mut probe_cfg);
    controller.validate()?;
    driver_cfg.validate()?;
    probe_cfg.validate()?;

    let watchdog = Watchdog::new(controller.watchdog_ms);

    // ── 3. Network + clock ────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = WifiAdapter::new();
    wifi.attach(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?);
    match overrides.wifi_credentials() {
        Some((ssid, pass)) => {
            wifi.set_credentials(ssid, pass)?;
            if let Err(e) = wifi.connect() {
                warn!("WiFi: {} (will retry every tick)", e);
            }
        }
        None => warn!("WiFi: no credentials (build with ERV_WIFI_SSID); probes will be unknown"),
    }

    let clock = Esp32TimeAdapter::new(&controller.timezone);

    // ── 4. Bus + probes ───────────────────────────────────────
    let link = UartLink::new(peripherals.uart1, &driver_cfg).map_err(Error::from)?;
    let mut erv = ErvDriver::new(link, FreeRtos, driver_cfg);

    let http = EspHttpTransport::new(probe_cfg.http_timeout_ms);
    let mut probes = ProbeHub::new(http, clock, probe_cfg);
    let mut sink = LogEventSink::new();

    // ── 5. Decision loop ──────────────────────────────────────
    let mut service = VentilationService::new(controller);
    service.start(&mut probes, &mut sink);

    let mut ticker = Ticker::new(service.config().tick_ms, probes.clock().uptime_ms());
    info!("System ready. Entering tick loop.");

    loop {
        match ticker.poll(probes.clock().uptime_ms()) {
            TickWait::Due => {
                wifi.poll();
                service.tick(&mut probes, &mut erv, &watchdog, &mut sink);
            }
            TickWait::Sleep(ms) => FreeRtos::delay_ms(ms.min(MAX_SLEEP_MS) as u32),
        }
    }
}
