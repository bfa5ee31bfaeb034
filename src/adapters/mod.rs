//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                   |
//! |------------|---------------------|-------------------------------|
//! | `hardware` | ClimateSensorPort   | DHT22                         |
//! |            | RainSensorPort      | LM393 (ADC1 + GPIO)           |
//! |            | ActuatorPort        | 28BYJ-48 stepper, LEDs        |
//! | `log_sink` | EventSink           | Serial log output             |
//! | `nvs`      | ConfigPort          | NVS / in-memory store         |
//! | `shadow`   | ShadowPort          | Device-shadow WebSocket       |
//! | `time`     | Clock               | ESP32 system timer            |
//! | `ui`       | KeypadPort          | TCA8418 over I²C              |
//! |            | DisplayPort         | SH1107 over I²C               |
//! | `wifi`     | (none)              | ESP-IDF WiFi STA              |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod shadow;
pub mod time;
pub mod ui;
pub mod wifi;
