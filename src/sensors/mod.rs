//! Sensor subsystem: the value types produced each sampling tick and the
//! two self-throttling samplers that produce them.
//!
//! The samplers are pure domain logic: they reach hardware only through
//! [`ClimateSensorPort`](crate::app::ports::ClimateSensorPort) and
//! [`RainSensorPort`](crate::app::ports::RainSensorPort).

pub mod climate;
pub mod rain;

use crate::error::SensorError;

/// One temperature / humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Outside temperature (°C).
    pub temperature_c: f32,
    /// Outside relative humidity (%).
    pub humidity_pct: f32,
}

impl SensorReading {
    /// Validate a raw driver sample.  The DHT driver reports a failed
    /// transfer as `NaN` in either field.
    pub fn from_raw(temperature_c: f32, humidity_pct: f32) -> Result<Self, SensorError> {
        let reading = Self {
            temperature_c,
            humidity_pct,
        };
        if reading.is_valid() {
            Ok(reading)
        } else {
            Err(SensorError::ReadFailed)
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.temperature_c.is_nan() && !self.humidity_pct.is_nan()
    }
}

/// Rain panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainState {
    /// Raw 12-bit ADC level.  The analog channel is weighted heavily towards
    /// 4095 and does not track the comparator threshold, so it is logged but
    /// never used for decisions.
    pub analog_level: u16,
    /// Panel is wet.  Derived from the comparator line only.
    pub is_wet: bool,
}

impl RainState {
    /// The LM393 differential amplifier drives its output HIGH while the
    /// panel is dry and LOW when water bridges the traces.
    pub fn from_levels(analog_level: u16, digital_high: bool) -> Self {
        Self {
            analog_level,
            is_wet: !digital_high,
        }
    }
}
