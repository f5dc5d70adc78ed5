//! GPIO adapter for the contact ladder.
//!
//! Implements [`GpioPort`].
//!
//! - **`target_os = "espidf"`**: raw ESP-IDF `gpio_config` / `gpio_get_level`.
//!   A wet contact pulls its input HIGH, which reads as [`PinLevel::Active`].
//! - **all other targets**: an in-memory pin map for host-side simulation.
//!   Unconfigured pins fail to read, like a misconfigured board would.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
use log::info;

use crate::app::ports::{GpioPort, PinLevel};
use crate::error::{PinId, SensorError};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

/// Highest GPIO number the adapter accepts.
const MAX_GPIO: PinId = 48;

pub struct GpioAdapter {
    #[cfg(not(target_os = "espidf"))]
    pins: HashMap<PinId, bool>,
}

impl GpioAdapter {
    pub fn new() -> Self {
        #[cfg(not(target_os = "espidf"))]
        info!("GpioAdapter: simulation backend");

        #[cfg(target_os = "espidf")]
        info!("GpioAdapter: ESP-IDF GPIO");

        Self {
            #[cfg(not(target_os = "espidf"))]
            pins: HashMap::new(),
        }
    }

    /// Set the simulated level of a configured pin.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_active(&mut self, pin: PinId, active: bool) {
        if let Some(level) = self.pins.get_mut(&pin) {
            *level = active;
        }
    }

    fn check_range(pin: PinId) -> bool {
        (0..=MAX_GPIO).contains(&pin)
    }
}

impl Default for GpioAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort for GpioAdapter {
    #[cfg(target_os = "espidf")]
    fn configure_input_pullup(&mut self, pin: PinId) -> Result<(), SensorError> {
        if !Self::check_range(pin) {
            return Err(SensorError::GpioConfigFailed(pin));
        }
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
            ..Default::default()
        };
        // SAFETY: gpio_config reads the descriptor and touches only the
        // pin named in the bit mask.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::GpioConfigFailed(pin));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn configure_input_pullup(&mut self, pin: PinId) -> Result<(), SensorError> {
        if !Self::check_range(pin) {
            return Err(SensorError::GpioConfigFailed(pin));
        }
        // Pull-up with a dry contact idles inactive in the simulation.
        self.pins.entry(pin).or_insert(false);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_digital(&mut self, pin: PinId) -> Result<PinLevel, SensorError> {
        if !Self::check_range(pin) {
            return Err(SensorError::GpioReadFailed(pin));
        }
        // SAFETY: gpio_get_level is a read-only register access on an
        // already-configured input pin.
        let high = unsafe { gpio_get_level(pin) } != 0;
        Ok(if high {
            PinLevel::Active
        } else {
            PinLevel::Inactive
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_digital(&mut self, pin: PinId) -> Result<PinLevel, SensorError> {
        match self.pins.get(&pin) {
            Some(true) => Ok(PinLevel::Active),
            Some(false) => Ok(PinLevel::Inactive),
            None => Err(SensorError::GpioReadFailed(pin)),
        }
    }
}
