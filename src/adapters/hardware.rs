//! Hardware adapter: bridges board peripherals to the domain port traits.
//!
//! Owns the DHT22, the rain sensor, the window stepper and both status
//! LEDs, exposing them through [`ClimateSensorPort`], [`RainSensorPort`] and
//! [`ActuatorPort`].  On non-espidf targets the underlying drivers use
//! cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, ClimateSensorPort, RainSensorPort};
use crate::decision::{TemperatureBand, WindowState};
use crate::drivers::dht22::Dht22;
use crate::drivers::rain_sensor::RainSensor;
use crate::drivers::status_led::{IndicatorLed, StatusLed};
use crate::drivers::stepper::StepperDriver;
use crate::pins;

/// Concrete adapter that combines all board hardware behind port traits.
pub struct HardwareAdapter {
    dht: Dht22,
    rain: RainSensor,
    stepper: StepperDriver,
    window_led: IndicatorLed,
    rgb: StatusLed,
    travel_steps: u16,
    /// Humidity from the last DHT transaction, `NaN` if it failed.
    humidity: f32,
}

impl HardwareAdapter {
    pub fn new(dht: Dht22, stepper: StepperDriver, travel_steps: u16) -> Self {
        Self {
            dht,
            rain: RainSensor::new(),
            stepper,
            window_led: IndicatorLed::new(pins::WINDOW_LED_GPIO),
            rgb: StatusLed::new(),
            travel_steps,
            humidity: f32::NAN,
        }
    }

    pub fn window_position(&self) -> u16 {
        self.stepper.position()
    }

    pub fn rgb_colour(&self) -> (u8, u8, u8) {
        self.rgb.current_colour()
    }

    pub fn window_led_on(&self) -> bool {
        self.window_led.is_on()
    }
}

// ── Sensor ports ──────────────────────────────────────────────

impl ClimateSensorPort for HardwareAdapter {
    /// Runs the bus transaction; humidity is cached for the next call.
    fn read_temperature(&mut self) -> f32 {
        match self.dht.read() {
            Ok((t, h)) => {
                self.humidity = h;
                t
            }
            Err(_) => {
                self.humidity = f32::NAN;
                f32::NAN
            }
        }
    }

    fn read_humidity(&mut self) -> f32 {
        self.humidity
    }
}

impl RainSensorPort for HardwareAdapter {
    fn read_rain_analog(&mut self) -> u16 {
        self.rain.analog_level()
    }

    fn read_rain_digital(&mut self) -> bool {
        self.rain.digital_high()
    }
}

// ── ActuatorPort ──────────────────────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn move_window(&mut self, target: WindowState) {
        let steps = match target {
            WindowState::Open => self.travel_steps,
            WindowState::Closed => 0,
        };
        self.stepper.move_to(steps);
    }

    fn set_window_led(&mut self, on: bool) {
        self.window_led.set(on);
    }

    fn set_temperature_led(&mut self, band: TemperatureBand) {
        let (r, g, b) = band.rgb();
        self.rgb.set_colour(r, g, b);
    }
}
