//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the motion loop stops running: a stalled loop
//! would leave the last duty pattern energising the winding.
//!
//! The main loop must call `feed()` after every processed tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Default stall timeout for the motion loop.
pub const DEFAULT_TIMEOUT_MS: u32 = 2_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    timeout_ms: u32,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Reconfigure the TWDT to `timeout_ms` and subscribe the current task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: plain ESP-IDF calls from task context at boot.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    log::info!("Watchdog: motion loop subscribed ({}ms timeout)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed, timeout_ms }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): {}ms, no-op", timeout_ms);
            Self { timeout_ms }
        }
    }

    /// Feed the watchdog.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: the current task is subscribed.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
