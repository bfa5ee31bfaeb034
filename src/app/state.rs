//! Device state owned by the main loop.
//!
//! Everything the loop remembers between iterations lives here and is passed
//! by reference into each component.  The toggle map is mutated in exactly
//! one place: [`DeviceState::apply_toggle`], called from the command step of
//! the loop.

use heapless::FnvIndexMap;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::decision::WindowState;
use crate::sensors::{RainState, SensorReading};

/// Maximum number of distinct toggle instances tracked.
pub const MAX_TOGGLES: usize = 8;

pub type InstanceName = heapless::String<32>;

/// Toggle instance → on/off, as last set by the shadow service or keypad.
pub type ToggleMap = FnvIndexMap<InstanceName, bool, MAX_TOGGLES>;

#[derive(Debug)]
pub struct DeviceState {
    /// Remote / local toggle switches.
    pub toggles: ToggleMap,
    /// Instance whose state gates climate sensing.
    pub sensing_instance: InstanceName,
    /// Last reading successfully reported to the shadow service.
    pub last_reported: Option<SensorReading>,
    /// Most recent valid reading (reported or not).
    pub current: Option<SensorReading>,
    /// Loop time `current` was taken at.
    pub current_at_ms: u32,
    /// Most recent rain state.
    pub rain: Option<RainState>,
    /// Physical window position as last commanded.
    pub window: WindowState,
}

impl DeviceState {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            toggles: ToggleMap::new(),
            sensing_instance: config.sensing_toggle_instance.clone(),
            last_reported: None,
            current: None,
            current_at_ms: 0,
            rain: None,
            window: WindowState::Closed,
        }
    }

    /// Climate sensing is on unless its toggle has been switched off.
    pub fn sensing_enabled(&self) -> bool {
        self.toggles
            .get(&self.sensing_instance)
            .copied()
            .unwrap_or(true)
    }

    /// `current`, unless sensing is off or the reading is older than
    /// `max_age_ms`.  Only this may drive the window.
    pub fn fresh_reading(&self, now_ms: u32, max_age_ms: u32) -> Option<SensorReading> {
        if !self.sensing_enabled() || now_ms.wrapping_sub(self.current_at_ms) > max_age_ms {
            return None;
        }
        self.current
    }

    /// Record a toggle state.  Returns `false` if the instance could not be
    /// stored (name too long or map full).
    pub fn apply_toggle(&mut self, instance: &str, on: bool) -> bool {
        let mut key = InstanceName::new();
        if key.push_str(instance).is_err() {
            warn!("Toggle '{}' ignored: instance name too long", instance);
            return false;
        }
        match self.toggles.insert(key, on) {
            Ok(_) => {
                info!(
                    "State for \"{}\" set to {}",
                    instance,
                    if on { "on" } else { "off" }
                );
                true
            }
            Err(_) => {
                warn!("Toggle '{}' ignored: toggle map full", instance);
                false
            }
        }
    }
}
