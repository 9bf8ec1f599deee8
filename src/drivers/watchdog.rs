//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the decision loop stops feeding it for longer than
//! the configured timeout (ten minutes, two missed ticks). The loop feeds
//! it once per tick whatever the outcome of that tick.

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::app::ports::WatchdogPort;

pub struct Watchdog {
    #[cfg(feature = "espidf")]
    subscribed: bool,
    #[cfg(not(feature = "espidf"))]
    feeds: core::cell::Cell<u64>,
}

impl Watchdog {
    /// Initialise the TWDT and subscribe the current task.
    #[cfg(feature = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                log::warn!(
                    "TWDT reconfigure returned {} (may already be configured)",
                    ret
                );
            }

            let ret = esp_task_wdt_add(core::ptr::null_mut());
            let subscribed = ret == ESP_OK;
            if subscribed {
                info!(
                    "Watchdog: subscribed ({} s timeout, panic on trigger)",
                    timeout_ms / 1000
                );
            } else {
                log::warn!("Watchdog: failed to subscribe ({})", ret);
            }

            Self { subscribed }
        }
    }

    #[cfg(not(feature = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): no-op ({} s timeout)", timeout_ms / 1000);
        Self {
            feeds: core::cell::Cell::new(0),
        }
    }

    /// Times fed since creation (simulation only).
    #[cfg(not(feature = "espidf"))]
    pub fn feeds(&self) -> u64 {
        self.feeds.get()
    }
}

impl WatchdogPort for Watchdog {
    fn feed(&self) {
        #[cfg(feature = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(feature = "espidf"))]
        self.feeds.set(self.feeds.get() + 1);
    }
}
