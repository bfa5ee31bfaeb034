//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, shadow client, keypad, display,
//! event sinks, storage) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics, so
//! the domain core never touches hardware or the network directly.
//!
//! ## Fallibility conventions
//!
//! - Sensor ports mirror the vendor drivers: a failed climate read yields
//!   `f32::NAN`, which the samplers validate.
//! - Shadow and config ports return typed errors; the domain logs them and
//!   retries on a later loop iteration.

use crate::config::SystemConfig;
use crate::decision::{TemperatureBand, WindowState};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Temperature / humidity sensor (DHT22 on the board).
pub trait ClimateSensorPort {
    /// Temperature in °C, `NaN` when the read failed.
    fn read_temperature(&mut self) -> f32;

    /// Relative humidity in %, `NaN` when the read failed.
    fn read_humidity(&mut self) -> f32;
}

/// LM393 resistive rain sensor.
pub trait RainSensorPort {
    /// Raw 12-bit ADC level (0–4095).  Diagnostic only.
    fn read_rain_analog(&mut self) -> u16;

    /// Comparator output.  HIGH means the panel is **dry**.
    fn read_rain_digital(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Drive the window stepper to the fully open or fully closed position.
    fn move_window(&mut self, target: WindowState);

    /// Green "window open" indicator.
    fn set_window_led(&mut self, on: bool);

    /// RGB temperature status indicator.
    fn set_temperature_led(&mut self, band: TemperatureBand);
}

// ───────────────────────────────────────────────────────────────
// Shadow-service port (driven adapter: domain ↔ cloud)
// ───────────────────────────────────────────────────────────────

/// App key / secret pair used to authenticate against the shadow service.
#[derive(Debug, Clone)]
pub struct ShadowCredentials {
    pub app_key: String,
    pub app_secret: String,
}

/// Commands delivered by the shadow service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShadowCommand {
    /// A toggle instance was switched on or off remotely.
    SetToggleState { instance: String, state: bool },
}

/// Cloud device-shadow client.
pub trait ShadowPort {
    /// Open the session.  Retries are the adapter's business.
    fn connect(&mut self, credentials: &ShadowCredentials) -> Result<(), ShadowError>;

    /// Service the connection.  Must be called every loop iteration; returns
    /// inbound commands received since the last call.
    fn handle(&mut self) -> Vec<ShadowCommand>;

    fn is_connected(&self) -> bool;

    fn send_temperature_event(&mut self, temperature_c: f32, humidity_pct: f32)
    -> Result<(), ShadowError>;

    fn send_push_notification(&mut self, text: &str) -> Result<(), ShadowError>;

    fn send_toggle_state_event(&mut self, instance: &str, state: bool) -> Result<(), ShadowError>;
}

// ───────────────────────────────────────────────────────────────
// User interface ports (keypad in, display out)
// ───────────────────────────────────────────────────────────────

/// TCA8418 keypad matrix controller.
pub trait KeypadPort {
    /// At least one key event is queued.
    fn available(&mut self) -> bool;

    /// Pop the next raw key event (bit 7 = press, low 7 bits = key code).
    fn get_event(&mut self) -> u8;
}

/// Monochrome 128×64 display accepting draw primitives.
pub trait DisplayPort {
    fn clear(&mut self);
    fn draw_pixel(&mut self, x: u8, y: u8);
    fn draw_vline(&mut self, x: u8, y: u8, height: u8);
    fn draw_hline(&mut self, x: u8, y: u8, width: u8);
    fn set_cursor(&mut self, x: u8, y: u8);
    fn print(&mut self, text: &str);
    /// Write a single glyph from the display's built-in font (CP437).
    fn write_glyph(&mut self, code: u8);
    /// Push the frame buffer to the panel.
    fn flush(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST run [`config::validate`](crate::config::validate)
/// before persisting and reject invalid values rather than clamping them.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`ShadowPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowError {
    /// No open session.
    NotConnected,
    /// Session refused by the server (bad key / secret).
    AuthRejected,
    /// The transport failed to deliver the message.
    SendFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for ShadowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::AuthRejected => write!(f, "authentication rejected"),
            Self::SendFailed => write!(f, "send failed"),
        }
    }
}

impl From<ShadowError> for crate::error::CommsError {
    fn from(e: ShadowError) -> Self {
        match e {
            ShadowError::NotConnected | ShadowError::AuthRejected => Self::NotConnected,
            ShadowError::SendFailed => Self::SendFailed,
        }
    }
}
