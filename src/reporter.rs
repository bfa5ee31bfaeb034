//! Event reporter: forwards state changes to the shadow service.
//!
//! Every operation delegates to the [`ShadowPort`] and surfaces the outcome.
//! Failures are logged and counted but never abort the loop; the caller
//! decides whether to keep its state for a retry on the next iteration.

use log::{info, warn};

use crate::app::ports::ShadowPort;
use crate::error::CommsError;
use crate::sensors::SensorReading;

/// Per-kind delivery counters, exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReporterStats {
    pub sent: u32,
    pub failed: u32,
}

#[derive(Debug, Default)]
pub struct EventReporter {
    stats: ReporterStats,
}

impl EventReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_climate_event(
        &mut self,
        shadow: &mut impl ShadowPort,
        reading: &SensorReading,
    ) -> Result<(), CommsError> {
        let outcome = shadow.send_temperature_event(reading.temperature_c, reading.humidity_pct);
        match outcome {
            Ok(()) => info!(
                "Temperature: {:.1} Celsius\tHumidity: {:.1}%",
                reading.temperature_c, reading.humidity_pct
            ),
            Err(e) => warn!("Could not send climate event to server: {}", e),
        }
        self.record(outcome.map_err(CommsError::from))
    }

    pub fn send_push_notification(
        &mut self,
        shadow: &mut impl ShadowPort,
        text: &str,
    ) -> Result<(), CommsError> {
        let outcome = shadow.send_push_notification(text);
        match outcome {
            Ok(()) => info!("Push notification sent: \"{}\"", text),
            Err(e) => warn!("Could not send push notification \"{}\": {}", text, e),
        }
        self.record(outcome.map_err(CommsError::from))
    }

    pub fn send_toggle_state_event(
        &mut self,
        shadow: &mut impl ShadowPort,
        instance: &str,
        state: bool,
    ) -> Result<(), CommsError> {
        let outcome = shadow.send_toggle_state_event(instance, state);
        if let Err(e) = outcome {
            warn!("Could not report toggle '{}' = {}: {}", instance, state, e);
        }
        self.record(outcome.map_err(CommsError::from))
    }

    pub fn stats(&self) -> ReporterStats {
        self.stats
    }

    fn record(&mut self, outcome: Result<(), CommsError>) -> Result<(), CommsError> {
        match outcome {
            Ok(()) => self.stats.sent = self.stats.sent.saturating_add(1),
            Err(_) => self.stats.failed = self.stats.failed.saturating_add(1),
        }
        outcome
    }
}
