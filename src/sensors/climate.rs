//! Climate sampler (DHT22 temperature + humidity).
//!
//! Called every loop iteration, does real work at most once per
//! `climate_sample_interval_ms`:
//!
//! 1. skip entirely while the sensing toggle is off;
//! 2. read temperature and humidity, bail out on `NaN` (retried next call);
//! 3. forward the reading to the shadow service, changed or not;
//! 4. only a successful send advances the last-known values and the
//!    last-event timestamp, so a failed send is retried next call.
//!
//! A valid reading is always handed back to the caller so the decision
//! engine can act on it even while the network is down.

use log::{debug, warn};

use super::SensorReading;
use crate::app::ports::{ClimateSensorPort, ShadowPort};
use crate::app::state::DeviceState;
use crate::interval::IntervalGate;
use crate::reporter::EventReporter;

/// What one [`ClimateSampler::sample`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClimateOutcome {
    /// Sensing toggled off.
    Disabled,
    /// Rate limit not yet elapsed.
    NotDue,
    /// Sensor returned NaN; nothing changed.
    ReadFailed,
    /// Valid reading, delivered to the shadow service.
    Reported(SensorReading),
    /// Valid reading, but the send failed; will retry.
    Unreported(SensorReading),
}

impl ClimateOutcome {
    /// The fresh valid reading, if this call produced one.
    pub fn reading(&self) -> Option<SensorReading> {
        match self {
            Self::Reported(r) | Self::Unreported(r) => Some(*r),
            _ => None,
        }
    }
}

pub struct ClimateSampler {
    /// Its timestamp is the last successfully reported event.
    gate: IntervalGate,
}

impl ClimateSampler {
    /// The first call at or after `now_ms` samples immediately.
    pub fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            gate: IntervalGate::primed(interval_ms, now_ms),
        }
    }

    pub fn sample(
        &mut self,
        now_ms: u32,
        state: &mut DeviceState,
        sensor: &mut impl ClimateSensorPort,
        reporter: &mut EventReporter,
        shadow: &mut impl ShadowPort,
    ) -> ClimateOutcome {
        if !state.sensing_enabled() {
            return ClimateOutcome::Disabled;
        }
        if !self.gate.is_due(now_ms) {
            return ClimateOutcome::NotDue;
        }

        let temperature = sensor.read_temperature();
        let humidity = sensor.read_humidity();
        let Ok(reading) = SensorReading::from_raw(temperature, humidity) else {
            warn!("DHT reading failed!");
            return ClimateOutcome::ReadFailed;
        };
        state.current = Some(reading);
        state.current_at_ms = now_ms;

        if state.last_reported == Some(reading) {
            debug!("Same temperature and humidity as last check-in");
        }

        if reporter.send_climate_event(shadow, &reading).is_err() {
            return ClimateOutcome::Unreported(reading);
        }

        state.last_reported = Some(reading);
        self.gate.mark(now_ms);
        ClimateOutcome::Reported(reading)
    }

    /// Timestamp of the last successfully reported event.
    pub fn last_event_ms(&self) -> u32 {
        self.gate.last_ms()
    }
}
