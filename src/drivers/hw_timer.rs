//! Periodic motion tick using ESP-IDF's esp_timer API.
//!
//! The callback posts into [`TICKS`](crate::events::TICKS) and wakes the
//! main task through a FreeRTOS task notification. On simulation targets
//! the functions only validate their arguments; tests drive ticks by hand.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can safely use the task-level notification API.

use crate::error::TimebaseError;

#[cfg(target_os = "espidf")]
use crate::events::TICKS;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicPtr, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// Task woken by every tick; set in `start_tick_timer()`.
#[cfg(target_os = "espidf")]
static TICK_WAITER: AtomicPtr<tskTaskControlBlock> = AtomicPtr::new(core::ptr::null_mut());

/// SAFETY: TICK_TIMER is written once in `start_tick_timer()` before any
/// callback fires. Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn tick_timer() -> esp_timer_handle_t {
    unsafe { TICK_TIMER }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(_arg: *mut core::ffi::c_void) {
    TICKS.post();
    let waiter = TICK_WAITER.load(Ordering::Acquire);
    if !waiter.is_null() {
        // SAFETY: the handle belongs to the main task, which never exits.
        unsafe {
            xTaskGenericNotify(
                waiter,
                0,
                0,
                eNotifyAction_eIncrement,
                core::ptr::null_mut(),
            );
        }
    }
}

fn period_us(hz: u32) -> Result<u64, TimebaseError> {
    if hz == 0 || hz > 1_000_000 {
        return Err(TimebaseError::InvalidRate(hz));
    }
    Ok(1_000_000 / u64::from(hz))
}

/// Start (or restart) the periodic tick at `hz`.
/// The calling task becomes the one woken by [`wait_for_tick`].
#[cfg(target_os = "espidf")]
pub fn start_tick_timer(hz: u32) -> Result<(), TimebaseError> {
    let period = period_us(hz)?;
    // SAFETY: TICK_TIMER is written here from the single main-task context
    // before the timer is started; the callback never touches it.
    unsafe {
        TICK_WAITER.store(xTaskGetCurrentTaskHandle(), Ordering::Release);

        if tick_timer().is_null() {
            let args = esp_timer_create_args_t {
                callback: Some(tick_cb),
                arg: core::ptr::null_mut(),
                dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
                name: b"motion\0".as_ptr() as *const _,
                skip_unhandled_events: true,
            };
            let ret = esp_timer_create(&args, &raw mut TICK_TIMER);
            if ret != ESP_OK {
                log::error!("hw_timer: tick timer create failed (rc={})", ret);
                return Err(TimebaseError::Platform(ret));
            }
        }

        TICKS.clear();
        let ret = esp_timer_start_periodic(tick_timer(), period);
        if ret != ESP_OK {
            log::error!("hw_timer: tick timer start failed (rc={})", ret);
            return Err(TimebaseError::Platform(ret));
        }
    }
    info!("hw_timer: motion tick @{}Hz started", hz);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_tick_timer(hz: u32) -> Result<(), TimebaseError> {
    period_us(hz)?;
    log::info!("hw_timer(sim): tick @{}Hz (driven by caller)", hz);
    Ok(())
}

/// Stop the periodic tick. Safe to call when not running.
#[cfg(target_os = "espidf")]
pub fn stop_tick_timer() {
    // SAFETY: tick_timer() contract is main task only; null-check prevents
    // stopping a timer that was never created.
    unsafe {
        let t = tick_timer();
        if !t.is_null() {
            esp_timer_stop(t);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_tick_timer() {}

/// Block the calling (main) task until the next tick notification or
/// `timeout_ticks` FreeRTOS ticks elapse.
#[cfg(target_os = "espidf")]
pub fn wait_for_tick(timeout_ticks: u32) {
    // SAFETY: plain FreeRTOS call on the current task's notification slot.
    unsafe {
        ulTaskGenericNotifyTake(0, 1, timeout_ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_for_one_khz() {
        assert_eq!(period_us(1000), Ok(1000));
    }

    #[test]
    fn zero_rate_rejected() {
        assert_eq!(start_tick_timer(0), Err(TimebaseError::InvalidRate(0)));
        assert!(start_tick_timer(1000).is_ok());
    }
}
