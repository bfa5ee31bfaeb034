//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log on the device, a recording
//! vector in tests).

use crate::decision::{Verdict, WindowState};
use crate::keypad::KeyEvent;
use crate::sensors::{RainState, SensorReading};

/// Who flipped a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleSource {
    /// Shadow-service command.
    Remote,
    /// Keypad.
    Local,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial window position).
    Started(WindowState),

    /// A valid climate reading was taken.
    ClimateSampled {
        reading: SensorReading,
        reported: bool,
    },

    /// The climate sensor returned NaN.
    ClimateReadFailed,

    RainSampled(RainState),

    /// The window was driven to a new position.
    WindowChanged {
        from: WindowState,
        to: WindowState,
        verdict: Verdict,
    },

    /// A push notification was attempted.
    Notification {
        text: &'static str,
        delivered: bool,
    },

    ToggleChanged {
        instance: String,
        state: bool,
        source: ToggleSource,
    },

    KeyPressed(KeyEvent),
}
