//! Mock adapters for integration tests.
//!
//! Each mock records what the service asked of it so tests can assert on
//! the full command history without touching real GPIO, I²C or network.

use std::collections::VecDeque;

use weathermon::app::events::AppEvent;
use weathermon::app::ports::{
    ActuatorPort, ClimateSensorPort, DisplayPort, EventSink, KeypadPort, RainSensorPort,
    ShadowCommand, ShadowCredentials, ShadowError, ShadowPort,
};
use weathermon::decision::{TemperatureBand, WindowState};

// ── Board (sensors + actuators) ───────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    MoveWindow(WindowState),
    WindowLed(bool),
    TemperatureLed(TemperatureBand),
}

pub struct MockBoard {
    pub temperature: f32,
    pub humidity: f32,
    /// Comparator output: HIGH = dry.
    pub rain_digital: bool,
    pub rain_analog: u16,
    pub climate_reads: u32,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockBoard {
    /// 22 °C, 50 %, dry panel.
    pub fn comfortable() -> Self {
        Self {
            temperature: 22.0,
            humidity: 50.0,
            rain_digital: true,
            rain_analog: 4095,
            climate_reads: 0,
            calls: Vec::new(),
        }
    }

    pub fn with_climate(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature,
            humidity,
            ..Self::comfortable()
        }
    }

    pub fn set_wet(&mut self, wet: bool) {
        self.rain_digital = !wet;
        self.rain_analog = if wet { 1200 } else { 4095 };
    }

    pub fn window_moves(&self) -> Vec<WindowState> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::MoveWindow(w) => Some(*w),
                _ => None,
            })
            .collect()
    }

    pub fn window_led(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::WindowLed(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn temperature_led(&self) -> Option<TemperatureBand> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::TemperatureLed(b) => Some(*b),
            _ => None,
        })
    }
}

impl ClimateSensorPort for MockBoard {
    fn read_temperature(&mut self) -> f32 {
        self.climate_reads += 1;
        self.temperature
    }

    fn read_humidity(&mut self) -> f32 {
        self.humidity
    }
}

impl RainSensorPort for MockBoard {
    fn read_rain_analog(&mut self) -> u16 {
        self.rain_analog
    }

    fn read_rain_digital(&mut self) -> bool {
        self.rain_digital
    }
}

impl ActuatorPort for MockBoard {
    fn move_window(&mut self, target: WindowState) {
        self.calls.push(ActuatorCall::MoveWindow(target));
    }

    fn set_window_led(&mut self, on: bool) {
        self.calls.push(ActuatorCall::WindowLed(on));
    }

    fn set_temperature_led(&mut self, band: TemperatureBand) {
        self.calls.push(ActuatorCall::TemperatureLed(band));
    }
}

// ── Shadow service ────────────────────────────────────────────

#[derive(Default)]
pub struct MockShadow {
    pub offline: bool,
    pub inbound: VecDeque<ShadowCommand>,
    pub temperature_events: Vec<(f32, f32)>,
    pub notifications: Vec<String>,
    pub toggle_events: Vec<(String, bool)>,
}

#[allow(dead_code)]
impl MockShadow {
    pub fn queue_toggle(&mut self, instance: &str, state: bool) {
        self.inbound.push_back(ShadowCommand::SetToggleState {
            instance: instance.into(),
            state,
        });
    }

    pub fn notification_count(&self, text: &str) -> usize {
        self.notifications.iter().filter(|n| *n == text).count()
    }

    fn online(&self) -> Result<(), ShadowError> {
        if self.offline {
            Err(ShadowError::NotConnected)
        } else {
            Ok(())
        }
    }
}

impl ShadowPort for MockShadow {
    fn connect(&mut self, _credentials: &ShadowCredentials) -> Result<(), ShadowError> {
        self.online()
    }

    fn handle(&mut self) -> Vec<ShadowCommand> {
        if self.offline {
            return Vec::new();
        }
        self.inbound.drain(..).collect()
    }

    fn is_connected(&self) -> bool {
        !self.offline
    }

    fn send_temperature_event(&mut self, t: f32, h: f32) -> Result<(), ShadowError> {
        self.online()?;
        self.temperature_events.push((t, h));
        Ok(())
    }

    fn send_push_notification(&mut self, text: &str) -> Result<(), ShadowError> {
        self.online()?;
        self.notifications.push(text.to_owned());
        Ok(())
    }

    fn send_toggle_state_event(&mut self, instance: &str, state: bool) -> Result<(), ShadowError> {
        self.online()?;
        self.toggle_events.push((instance.to_owned(), state));
        Ok(())
    }
}

// ── Front panel (keypad + display) ────────────────────────────

#[derive(Default)]
pub struct MockPanel {
    pub keys: VecDeque<u8>,
    pub printed: Vec<String>,
    pub glyphs: Vec<u8>,
    pub flushes: u32,
}

#[allow(dead_code)]
impl MockPanel {
    /// Queue a press and release of the key at matrix position (row, col).
    pub fn tap(&mut self, row: u8, col: u8) {
        let key = row * 10 + col + 1;
        self.keys.push_back(0x80 | key);
        self.keys.push_back(key);
    }

    /// Text drawn since the last `clear`.
    pub fn screen(&self) -> String {
        self.printed.join("|")
    }
}

impl KeypadPort for MockPanel {
    fn available(&mut self) -> bool {
        !self.keys.is_empty()
    }

    fn get_event(&mut self) -> u8 {
        self.keys.pop_front().unwrap_or(0)
    }
}

impl DisplayPort for MockPanel {
    fn clear(&mut self) {
        self.printed.clear();
        self.glyphs.clear();
    }
    fn draw_pixel(&mut self, _x: u8, _y: u8) {}
    fn draw_vline(&mut self, _x: u8, _y: u8, _height: u8) {}
    fn draw_hline(&mut self, _x: u8, _y: u8, _width: u8) {}
    fn set_cursor(&mut self, _x: u8, _y: u8) {}
    fn print(&mut self, text: &str) {
        self.printed.push(text.to_owned());
    }
    fn write_glyph(&mut self, code: u8) {
        self.glyphs.push(code);
    }
    fn flush(&mut self) {
        self.flushes += 1;
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Test rig ──────────────────────────────────────────────────

/// A started `AppService` wired to a full set of mocks.
pub struct Rig {
    pub app: weathermon::app::service::AppService,
    pub board: MockBoard,
    pub shadow: MockShadow,
    pub panel: MockPanel,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(board: MockBoard) -> Self {
        Self::with_config(weathermon::config::SystemConfig::default(), board)
    }

    pub fn with_config(config: weathermon::config::SystemConfig, board: MockBoard) -> Self {
        Self::build(config, board, MockShadow::default())
    }

    /// Start with the shadow service unreachable.
    pub fn offline(board: MockBoard) -> Self {
        let shadow = MockShadow {
            offline: true,
            ..MockShadow::default()
        };
        Self::build(weathermon::config::SystemConfig::default(), board, shadow)
    }

    fn build(
        config: weathermon::config::SystemConfig,
        board: MockBoard,
        shadow: MockShadow,
    ) -> Self {
        let mut rig = Self {
            app: weathermon::app::service::AppService::new(config, 0),
            board,
            shadow,
            panel: MockPanel::default(),
            sink: RecordingSink::default(),
        };
        rig.app.start(&mut rig.board, &mut rig.shadow, &mut rig.sink);
        rig
    }

    pub fn tick(&mut self, now_ms: u32) {
        self.app.tick(
            now_ms,
            &mut self.board,
            &mut self.shadow,
            &mut self.panel,
            &mut self.sink,
        );
    }

    /// Notifications other than the start-up announcement.
    pub fn alerts(&self) -> Vec<&str> {
        self.shadow
            .notifications
            .iter()
            .map(String::as_str)
            .filter(|n| *n != weathermon::app::service::ONLINE_MESSAGE)
            .collect()
    }
}
