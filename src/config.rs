//! System configuration parameters
//!
//! All tunable parameters for the WeatherMonitor.  Values can be overridden
//! through the [`ConfigPort`](crate::app::ports::ConfigPort) (NVS on the
//! device).  Credentials are deliberately **not** part of this struct.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Climate limits the decision engine compares readings against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateThresholds {
    /// Lowest acceptable outside temperature (°C, inclusive).
    pub temp_low_c: f32,
    /// Highest acceptable outside temperature (°C, inclusive).
    pub temp_high_c: f32,
    /// Ideal relative humidity (%).
    pub humidity_target_pct: f32,
    /// Allowed deviation either side of the target (%, inclusive).
    pub humidity_tolerance_pct: f32,
}

impl ClimateThresholds {
    pub fn humidity_low_pct(&self) -> f32 {
        self.humidity_target_pct - self.humidity_tolerance_pct
    }

    pub fn humidity_high_pct(&self) -> f32 {
        self.humidity_target_pct + self.humidity_tolerance_pct
    }
}

impl Default for ClimateThresholds {
    fn default() -> Self {
        Self {
            temp_low_c: 18.0,
            temp_high_c: 28.0,
            humidity_target_pct: 50.0,
            humidity_tolerance_pct: 10.0,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Decision thresholds ---
    pub thresholds: ClimateThresholds,

    // --- Timing ---
    /// Climate sample + report interval (milliseconds)
    pub climate_sample_interval_ms: u32,
    /// Rain sensor sample interval (milliseconds)
    pub rain_sample_interval_ms: u32,
    /// Display refresh interval (milliseconds)
    pub display_refresh_interval_ms: u32,

    // --- Shadow service ---
    /// Device id registered with the shadow service
    pub device_id: heapless::String<32>,
    /// Toggle instance that enables/disables climate sensing
    pub sensing_toggle_instance: heapless::String<32>,

    // --- Window actuator ---
    /// Stepper travel from fully closed to fully open (steps)
    pub window_travel_steps: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut device_id = heapless::String::new();
        let _ = device_id.push_str("653846228332c2648adaa2a7");
        let mut sensing_toggle_instance = heapless::String::new();
        let _ = sensing_toggle_instance.push_str("toggleInstance1");

        Self {
            thresholds: ClimateThresholds::default(),

            // Timing
            climate_sample_interval_ms: 60_000, // 1/min
            rain_sample_interval_ms: 10_000,    // every 10 s
            display_refresh_interval_ms: 1_000, // 1 Hz

            device_id,
            sensing_toggle_instance,

            window_travel_steps: 2048, // one revolution of a 28BYJ-48
        }
    }
}

/// Range-check every field.  Adapters call this before persisting so a bad
/// remote update can never disable the fail-safe thresholds.
pub fn validate(cfg: &SystemConfig) -> Result<(), ConfigError> {
    let t = &cfg.thresholds;
    if !t.temp_low_c.is_finite() || !t.temp_high_c.is_finite() {
        return Err(ConfigError::ValidationFailed(
            "temperature limits must be finite",
        ));
    }
    if !(-40.0..=60.0).contains(&t.temp_low_c) || !(-40.0..=60.0).contains(&t.temp_high_c) {
        return Err(ConfigError::ValidationFailed(
            "temperature limits must be -40.0–60.0",
        ));
    }
    if t.temp_low_c >= t.temp_high_c {
        return Err(ConfigError::ValidationFailed(
            "temp_low_c must be < temp_high_c",
        ));
    }
    if !(0.0..=100.0).contains(&t.humidity_target_pct) {
        return Err(ConfigError::ValidationFailed(
            "humidity_target_pct must be 0–100",
        ));
    }
    if !(0.0..=50.0).contains(&t.humidity_tolerance_pct) {
        return Err(ConfigError::ValidationFailed(
            "humidity_tolerance_pct must be 0–50",
        ));
    }
    if !(2_000..=3_600_000).contains(&cfg.climate_sample_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "climate_sample_interval_ms must be 2000–3600000",
        ));
    }
    if !(100..=600_000).contains(&cfg.rain_sample_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "rain_sample_interval_ms must be 100–600000",
        ));
    }
    if !(50..=60_000).contains(&cfg.display_refresh_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "display_refresh_interval_ms must be 50–60000",
        ));
    }
    if cfg.device_id.is_empty() || cfg.sensing_toggle_instance.is_empty() {
        return Err(ConfigError::ValidationFailed(
            "device_id and sensing_toggle_instance must not be empty",
        ));
    }
    if cfg.window_travel_steps == 0 {
        return Err(ConfigError::ValidationFailed(
            "window_travel_steps must be > 0",
        ));
    }
    Ok(())
}
