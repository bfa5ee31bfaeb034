//! Status LED drivers.
//!
//! - [`StatusLed`]: discrete RGB LED on three LEDC PWM channels, showing the
//!   temperature band.
//! - [`IndicatorLed`]: single on/off LED (green "window open").
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives LEDC channels / GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct StatusLed {
    current: (u8, u8, u8),
}

impl StatusLed {
    pub fn new() -> Self {
        Self { current: (0, 0, 0) }
    }

    pub fn set_colour(&mut self, r: u8, g: u8, b: u8) {
        hw_init::ledc_set(hw_init::LEDC_CH_LED_R, r);
        hw_init::ledc_set(hw_init::LEDC_CH_LED_G, g);
        hw_init::ledc_set(hw_init::LEDC_CH_LED_B, b);
        self.current = (r, g, b);
    }

    pub fn off(&mut self) {
        self.set_colour(0, 0, 0);
    }

    pub fn current_colour(&self) -> (u8, u8, u8) {
        self.current
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IndicatorLed {
    gpio: i32,
    on: bool,
}

impl IndicatorLed {
    pub fn new(gpio: i32) -> Self {
        hw_init::gpio_write(gpio, false);
        Self { gpio, on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_tracks_last_colour() {
        let mut led = StatusLed::new();
        led.set_colour(0, 0, 255);
        assert_eq!(led.current_colour(), (0, 0, 255));
        led.off();
        assert_eq!(led.current_colour(), (0, 0, 0));
    }

    #[test]
    fn indicator_starts_off() {
        let mut led = IndicatorLed::new(21);
        assert!(!led.is_on());
        led.set(true);
        assert!(led.is_on());
    }
}
