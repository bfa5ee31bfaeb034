//! Rain sampler (LM393 comparator + resistive panel).
//!
//! Polls both sensor lines every `rain_sample_interval_ms`.  The digital
//! comparator output is authoritative; the analog level is logged for
//! diagnostics only.
//!
//! Known gaps: readings are not validated, and consecutive wet/dry flips are
//! not debounced.  A panel stays wet for a while after rain stops, so a
//! minimum-wet hold-down would be the natural next step.

use log::info;

use super::RainState;
use crate::app::ports::RainSensorPort;
use crate::app::state::DeviceState;
use crate::interval::IntervalGate;

pub struct RainSampler {
    gate: IntervalGate,
}

impl RainSampler {
    /// The first call to [`sample`](Self::sample) at or after `now_ms` reads
    /// the sensor immediately.
    pub fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            gate: IntervalGate::primed(interval_ms, now_ms),
        }
    }

    /// Read the sensor if the interval has elapsed.  Returns the fresh state
    /// (also stored in `state.rain`) or `None` when not due.
    pub fn sample(
        &mut self,
        now_ms: u32,
        state: &mut DeviceState,
        sensor: &mut impl RainSensorPort,
    ) -> Option<RainState> {
        if !self.gate.poll(now_ms) {
            return None;
        }

        let analog = sensor.read_rain_analog();
        let digital = sensor.read_rain_digital();
        let rain = RainState::from_levels(analog, digital);

        info!(
            "Rain: analog={} digital={} -> {}",
            analog,
            u8::from(digital),
            if rain.is_wet { "wet" } else { "dry" }
        );

        state.rain = Some(rain);
        Some(rain)
    }
}
