//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the device state, the samplers, the decision engine
//! and the display renderer.  All I/O flows through port traits injected at
//! call sites, making the whole loop testable with mock adapters.
//!
//! ```text
//!  ClimateSensorPort ─┐                          ┌─▶ ActuatorPort
//!  RainSensorPort ────┤   ┌──────────────────┐   ├─▶ DisplayPort
//!  KeypadPort ────────┼─▶ │    AppService    │ ──┼─▶ EventSink
//!  ShadowPort ◀───────┘   │ samplers·decision│   └─▶ ShadowPort
//!                         └──────────────────┘
//! ```
//!
//! One [`tick`](AppService::tick) is one loop iteration:
//! shadow commands → keypad → rain → climate → decision → notification
//! retry → display.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::decision::{DecisionEngine, TemperatureBand, WindowState};
use crate::display::{DisplayRenderer, Page};
use crate::keypad::{self, KeyAction};
use crate::reporter::{EventReporter, ReporterStats};
use crate::sensors::climate::{ClimateOutcome, ClimateSampler};
use crate::sensors::rain::RainSampler;

use super::commands::AppCommand;
use super::events::{AppEvent, ToggleSource};
use super::ports::{
    ActuatorPort, ClimateSensorPort, DisplayPort, EventSink, KeypadPort, RainSensorPort,
    ShadowPort,
};
use super::state::{DeviceState, InstanceName};

/// Announced once the loop is about to start.
pub const ONLINE_MESSAGE: &str = "ESP Device is online";

/// Upper bound on keypad events drained per iteration, so a stuck
/// controller cannot starve the samplers.
const MAX_KEY_EVENTS_PER_TICK: usize = 16;

/// A climate reading older than this many sample intervals no longer
/// counts for the window decision.
const STALE_AFTER_INTERVALS: u32 = 3;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    config: SystemConfig,
    state: DeviceState,
    rain: RainSampler,
    climate: ClimateSampler,
    engine: DecisionEngine,
    reporter: EventReporter,
    display: DisplayRenderer,
    /// Notification whose send failed; retried until sent or superseded.
    pending_notification: Option<&'static str>,
    /// Local toggle change the shadow service has not acknowledged yet.
    pending_toggle: Option<(InstanceName, bool)>,
    led_band: Option<TemperatureBand>,
    tick_count: u64,
}

impl AppService {
    /// Construct the service.  Every sampler fires on the first tick at or
    /// after `now_ms`.
    pub fn new(config: SystemConfig, now_ms: u32) -> Self {
        Self {
            state: DeviceState::new(&config),
            rain: RainSampler::new(config.rain_sample_interval_ms, now_ms),
            climate: ClimateSampler::new(config.climate_sample_interval_ms, now_ms),
            engine: DecisionEngine::new(config.thresholds),
            reporter: EventReporter::new(),
            display: DisplayRenderer::new(config.display_refresh_interval_ms, now_ms),
            pending_notification: None,
            pending_toggle: None,
            led_band: None,
            tick_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the actuators in the fail-safe position and announce the device.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorPort,
        shadow: &mut impl ShadowPort,
        sink: &mut impl EventSink,
    ) {
        hw.move_window(WindowState::Closed);
        hw.set_window_led(false);
        self.state.window = WindowState::Closed;

        sink.emit(&AppEvent::Started(self.state.window));
        info!("AppService started, window {:?}", self.state.window);

        self.notify(ONLINE_MESSAGE, shadow, sink);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration.
    ///
    /// `hw` satisfies all three hardware ports and `ui` both user-interface
    /// ports, which avoids double mutable borrows of the board adapters.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl ClimateSensorPort + RainSensorPort + ActuatorPort),
        shadow: &mut impl ShadowPort,
        ui: &mut (impl KeypadPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Shadow service: keep-alive plus inbound commands
        for cmd in shadow.handle() {
            self.apply_command(cmd.into(), shadow, sink);
        }

        // 2. Keypad
        self.poll_keypad(ui, shadow, sink);

        // 3. Rain
        let rain = self.rain.sample(now_ms, &mut self.state, hw);
        if let Some(rain) = rain {
            sink.emit(&AppEvent::RainSampled(rain));
        }

        // 4. Climate
        let outcome = self.climate.sample(
            now_ms,
            &mut self.state,
            hw,
            &mut self.reporter,
            shadow,
        );
        match outcome {
            ClimateOutcome::Reported(reading) => {
                self.display.push_sample(reading.temperature_c);
                sink.emit(&AppEvent::ClimateSampled { reading, reported: true });
            }
            ClimateOutcome::Unreported(reading) => {
                sink.emit(&AppEvent::ClimateSampled { reading, reported: false });
            }
            ClimateOutcome::ReadFailed => sink.emit(&AppEvent::ClimateReadFailed),
            ClimateOutcome::Disabled | ClimateOutcome::NotDue => {}
        }

        // 5. Decision, only on fresh data
        if rain.is_some() || outcome.reading().is_some() {
            self.evaluate(now_ms, hw, shadow, sink);
        }

        // 6. Pending notification and toggle report
        if shadow.is_connected() {
            if self.pending_notification.is_some() {
                self.flush_pending(shadow, sink);
            }
            self.flush_toggle(shadow);
        }

        // 7. Display
        self.display.refresh(now_ms, &self.state, ui);
    }

    // ── Command handling ──────────────────────────────────────

    /// The single place device state is mutated from outside input.
    pub fn apply_command(
        &mut self,
        cmd: AppCommand,
        shadow: &mut impl ShadowPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetToggle { instance, state, source } => {
                if self.state.apply_toggle(&instance, state) {
                    sink.emit(&AppEvent::ToggleChanged { instance, state, source });
                }
            }
            AppCommand::ToggleSensing => {
                let state = !self.state.sensing_enabled();
                let instance = self.state.sensing_instance.clone();
                if self.state.apply_toggle(&instance, state) {
                    self.pending_toggle = Some((instance.clone(), state));
                    self.flush_toggle(shadow);
                    sink.emit(&AppEvent::ToggleChanged {
                        instance: instance.as_str().into(),
                        state,
                        source: ToggleSource::Local,
                    });
                }
            }
            AppCommand::PreviousPage => self.display.set_page(self.display.page().previous()),
            AppCommand::NextPage => self.display.set_page(self.display.page().next()),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn window(&self) -> WindowState {
        self.state.window
    }

    pub fn page(&self) -> Page {
        self.display.page()
    }

    pub fn pending_notification(&self) -> Option<&'static str> {
        self.pending_notification
    }

    pub fn pending_toggle(&self) -> Option<(&str, bool)> {
        self.pending_toggle
            .as_ref()
            .map(|(instance, state)| (instance.as_str(), *state))
    }

    pub fn reporter_stats(&self) -> ReporterStats {
        self.reporter.stats()
    }

    /// Timestamp of the last successfully reported climate event.
    pub fn last_climate_event_ms(&self) -> u32 {
        self.climate.last_event_ms()
    }

    /// Loop iterations executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll_keypad(
        &mut self,
        ui: &mut impl KeypadPort,
        shadow: &mut impl ShadowPort,
        sink: &mut impl EventSink,
    ) {
        for _ in 0..MAX_KEY_EVENTS_PER_TICK {
            if !ui.available() {
                break;
            }
            let code = ui.get_event();
            let Some(event) = keypad::decode(code) else {
                warn!("Keypad: ignoring invalid event 0x{:02X}", code);
                continue;
            };
            if !event.pressed {
                continue;
            }
            info!("Key pressed: {}", event.symbol);
            sink.emit(&AppEvent::KeyPressed(event));

            match AppCommand::from_key(KeyAction::from_symbol(event.symbol)) {
                Some(cmd) => self.apply_command(cmd, shadow, sink),
                None => info!("Key '{}' has no action", event.symbol),
            }
        }
    }

    fn evaluate(
        &mut self,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        shadow: &mut impl ShadowPort,
        sink: &mut impl EventSink,
    ) {
        let max_age_ms = self
            .config
            .climate_sample_interval_ms
            .saturating_mul(STALE_AFTER_INTERVALS);
        let reading = self.state.fresh_reading(now_ms, max_age_ms);
        let decision = self.engine.decide(reading.as_ref(), self.state.rain.as_ref());

        if decision.window != self.state.window {
            let from = self.state.window;
            hw.move_window(decision.window);
            hw.set_window_led(decision.window == WindowState::Open);
            self.state.window = decision.window;
            info!("Window {:?} -> {:?} ({:?})", from, decision.window, decision.verdict);
            sink.emit(&AppEvent::WindowChanged {
                from,
                to: decision.window,
                verdict: decision.verdict,
            });
        }

        if let Some(reading) = reading {
            let band = TemperatureBand::classify(reading.temperature_c, &self.config.thresholds);
            if self.led_band != Some(band) {
                hw.set_temperature_led(band);
                self.led_band = Some(band);
            }
        }

        if let Some(text) = decision.notification {
            self.notify(text, shadow, sink);
        }
    }

    /// Send now; on failure keep the text for a later retry.  A newer
    /// notification replaces an older undelivered one.
    fn notify(&mut self, text: &'static str, shadow: &mut impl ShadowPort, sink: &mut impl EventSink) {
        self.pending_notification = Some(text);
        if !self.flush_pending(shadow, sink) {
            sink.emit(&AppEvent::Notification { text, delivered: false });
        }
    }

    /// Report the latest local toggle change; kept for retry on failure.
    fn flush_toggle(&mut self, shadow: &mut impl ShadowPort) {
        let Some((instance, state)) = self.pending_toggle.as_ref() else {
            return;
        };
        if self
            .reporter
            .send_toggle_state_event(shadow, instance, *state)
            .is_ok()
        {
            self.pending_toggle = None;
        }
    }

    /// Returns `true` when nothing is left pending.
    fn flush_pending(&mut self, shadow: &mut impl ShadowPort, sink: &mut impl EventSink) -> bool {
        let Some(text) = self.pending_notification else {
            return true;
        };
        if self.reporter.send_push_notification(shadow, text).is_err() {
            return false;
        }
        self.pending_notification = None;
        sink.emit(&AppEvent::Notification { text, delivered: true });
        true
    }
}
