//! LM393 resistive rain sensor.
//!
//! The board exposes the raw divider voltage on an ADC pin and the
//! comparator output on a digital pin.  The comparator is HIGH while the
//! panel is dry.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 and GPIO via hw_init helpers.
//! On host/test: defaults to dry (level 4095, digital HIGH).

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_LEVEL: AtomicU16 = AtomicU16::new(4095);
#[cfg(not(target_os = "espidf"))]
static SIM_DIGITAL_HIGH: AtomicBool = AtomicBool::new(true);

/// Simulate the panel state; wet panels pull the level down.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_rain(analog_level: u16, digital_high: bool) {
    SIM_LEVEL.store(analog_level, Ordering::Relaxed);
    SIM_DIGITAL_HIGH.store(digital_high, Ordering::Relaxed);
}

#[derive(Debug, Default)]
pub struct RainSensor {
    _private: (),
}

impl RainSensor {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(target_os = "espidf")]
    pub fn analog_level(&mut self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_RAIN)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn analog_level(&mut self) -> u16 {
        SIM_LEVEL.load(Ordering::Relaxed)
    }

    #[cfg(target_os = "espidf")]
    pub fn digital_high(&mut self) -> bool {
        hw_init::gpio_read(pins::RAIN_DIGITAL_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn digital_high(&mut self) -> bool {
        SIM_DIGITAL_HIGH.load(Ordering::Relaxed)
    }
}
