//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as a single
//! `TAG | key=value` line to the ESP-IDF logger (UART in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(window) => {
                info!("START | window={:?}", window);
            }
            AppEvent::ClimateSampled { reading, reported } => {
                info!(
                    "CLIMATE | T={:.1}\u{00b0}C | RH={:.1}% | reported={}",
                    reading.temperature_c, reading.humidity_pct, reported
                );
            }
            AppEvent::ClimateReadFailed => {
                warn!("CLIMATE | read failed");
            }
            AppEvent::RainSampled(rain) => {
                info!(
                    "RAIN | level={} | {}",
                    rain.analog_level,
                    if rain.is_wet { "WET" } else { "dry" }
                );
            }
            AppEvent::WindowChanged { from, to, verdict } => {
                info!("WINDOW | {:?} -> {:?} | verdict={:?}", from, to, verdict);
            }
            AppEvent::Notification { text, delivered } => {
                if *delivered {
                    info!("NOTIFY | \"{}\" | sent", text);
                } else {
                    warn!("NOTIFY | \"{}\" | pending", text);
                }
            }
            AppEvent::ToggleChanged { instance, state, source } => {
                info!(
                    "TOGGLE | {}={} | source={:?}",
                    instance,
                    if *state { "on" } else { "off" },
                    source
                );
            }
            AppEvent::KeyPressed(key) => {
                info!("KEY | '{}' (row={}, col={})", key.symbol, key.row, key.col);
            }
        }
    }
}
