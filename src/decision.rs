//! Window decision engine.
//!
//! Combines the latest climate and rain readings with the configured
//! [`ClimateThresholds`] to decide the window position.  Rules, first match
//! wins:
//!
//! 1. rain detected                       → closed, "rain detected"
//! 2. temperature outside `[low, high]`   → closed, "temperature out of range (too hot|too cold)"
//! 3. humidity outside `target ± tolerance` → closed, "humidity out of range"
//! 4. otherwise                            → open
//!
//! Missing data never opens the window: until both a valid climate reading
//! and a rain state exist, the verdict is `Closed(AwaitingData)`.
//!
//! Notifications are edge-triggered.  The engine remembers the previous
//! verdict and only emits a message when its text differs from the previous
//! verdict's, so a condition that persists for hours produces one push and a
//! humidity swing straight from too humid to too dry produces one too.

use crate::config::ClimateThresholds;
use crate::sensors::{RainState, SensorReading};

/// Physical window position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    Open,
    #[default]
    Closed,
}

/// Temperature band shown on the RGB status LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    /// Below `temp_low_c` (blue).
    Cold,
    /// Within limits (green).
    Comfortable,
    /// Above `temp_high_c` (red).
    Hot,
}

impl TemperatureBand {
    pub fn classify(temperature_c: f32, thresholds: &ClimateThresholds) -> Self {
        if temperature_c < thresholds.temp_low_c {
            Self::Cold
        } else if temperature_c > thresholds.temp_high_c {
            Self::Hot
        } else {
            Self::Comfortable
        }
    }

    /// RGB colour for the status LED.
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Cold => (0, 0, 255),
            Self::Comfortable => (0, 255, 0),
            Self::Hot => (255, 0, 0),
        }
    }
}

/// Why the window must stay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// No valid reading yet (boot, sensor offline).
    AwaitingData,
    Rain,
    TooHot,
    TooCold,
    TooHumid,
    TooDry,
}

impl CloseReason {
    /// Push-notification text, `None` for reasons that never notify.
    pub const fn notification(self) -> Option<&'static str> {
        match self {
            Self::AwaitingData => None,
            Self::Rain => Some("rain detected"),
            Self::TooHot => Some("temperature out of range (too hot)"),
            Self::TooCold => Some("temperature out of range (too cold)"),
            Self::TooHumid | Self::TooDry => Some("humidity out of range"),
        }
    }
}

/// Outcome of applying the policy to one set of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Open,
    Closed(CloseReason),
}

impl Verdict {
    pub const fn window(self) -> WindowState {
        match self {
            Self::Open => WindowState::Open,
            Self::Closed(_) => WindowState::Closed,
        }
    }

    pub const fn notification(self) -> Option<&'static str> {
        match self {
            Self::Open => None,
            Self::Closed(reason) => reason.notification(),
        }
    }
}

/// Apply the policy.  Pure: no state, no I/O.
pub fn evaluate(
    reading: Option<&SensorReading>,
    rain: Option<&RainState>,
    thresholds: &ClimateThresholds,
) -> Verdict {
    if rain.is_some_and(|r| r.is_wet) {
        return Verdict::Closed(CloseReason::Rain);
    }

    let (Some(reading), Some(_)) = (reading, rain) else {
        return Verdict::Closed(CloseReason::AwaitingData);
    };
    if !reading.is_valid() {
        return Verdict::Closed(CloseReason::AwaitingData);
    }

    if reading.temperature_c > thresholds.temp_high_c {
        return Verdict::Closed(CloseReason::TooHot);
    }
    if reading.temperature_c < thresholds.temp_low_c {
        return Verdict::Closed(CloseReason::TooCold);
    }

    if reading.humidity_pct > thresholds.humidity_high_pct() {
        return Verdict::Closed(CloseReason::TooHumid);
    }
    if reading.humidity_pct < thresholds.humidity_low_pct() {
        return Verdict::Closed(CloseReason::TooDry);
    }

    Verdict::Open
}

/// Result of one [`DecisionEngine::decide`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub window: WindowState,
    /// Set only when the close message changes.
    pub notification: Option<&'static str>,
    /// The window position differs from the previous decision.
    pub window_changed: bool,
}

/// Stateful wrapper that adds edge-triggering on top of [`evaluate`].
#[derive(Debug)]
pub struct DecisionEngine {
    thresholds: ClimateThresholds,
    previous: Verdict,
}

impl DecisionEngine {
    pub fn new(thresholds: ClimateThresholds) -> Self {
        Self {
            thresholds,
            previous: Verdict::Closed(CloseReason::AwaitingData),
        }
    }

    pub fn decide(
        &mut self,
        reading: Option<&SensorReading>,
        rain: Option<&RainState>,
    ) -> Decision {
        let verdict = evaluate(reading, rain, &self.thresholds);
        let notification = verdict
            .notification()
            .filter(|_| verdict.notification() != self.previous.notification());
        let window_changed = verdict.window() != self.previous.window();
        self.previous = verdict;

        Decision {
            verdict,
            window: verdict.window(),
            notification,
            window_changed,
        }
    }

    pub fn previous(&self) -> Verdict {
        self.previous
    }

    pub fn thresholds(&self) -> &ClimateThresholds {
        &self.thresholds
    }
}
