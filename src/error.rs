//! Unified error types for the WeatherMonitor firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy` so they
//! can be passed around the samplers and reporter without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned an invalid value.
    Sensor(SensorError),
    /// The shadow service could not be reached.
    Comms(CommsError),
    /// A required peripheral was not found at start-up.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Climate sensor returned NaN for temperature or humidity.
    ReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "climate read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Not connected to the shadow service.
    NotConnected,
    /// The shadow service rejected or dropped the event.
    SendFailed,
    /// WiFi station could not associate.
    WifiConnectFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "shadow service not connected"),
            Self::SendFailed => write!(f, "shadow event send failed"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}
