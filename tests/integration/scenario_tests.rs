//! End-to-end weather scenarios through the full loop.
//!
//! Thresholds are the defaults: 18–28 °C, humidity 50 ± 10 %.

use crate::mock_hw::{MockBoard, Rig};

use weathermon::app::events::AppEvent;
use weathermon::decision::{CloseReason, TemperatureBand, Verdict, WindowState};

const RAIN_MS: u32 = 10_000;
const CLIMATE_MS: u32 = 60_000;

#[test]
fn too_hot_keeps_window_closed_and_notifies() {
    let mut rig = Rig::new(MockBoard::with_climate(30.0, 45.0));
    rig.tick(0);

    assert_eq!(rig.app.window(), WindowState::Closed);
    assert_eq!(rig.alerts(), vec!["temperature out of range (too hot)"]);
    assert_eq!(rig.board.temperature_led(), Some(TemperatureBand::Hot));
    // Start-up close only; no further travel.
    assert_eq!(rig.board.window_moves(), vec![WindowState::Closed]);
}

#[test]
fn rain_overrides_comfortable_climate() {
    let mut board = MockBoard::comfortable();
    board.set_wet(true);
    let mut rig = Rig::new(board);
    rig.tick(0);

    assert_eq!(rig.app.window(), WindowState::Closed);
    assert_eq!(rig.alerts(), vec!["rain detected"]);
    assert!(!rig.board.window_led());
}

#[test]
fn comfortable_dry_weather_opens_window_silently() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.tick(0);

    assert_eq!(rig.app.window(), WindowState::Open);
    assert!(rig.alerts().is_empty());
    assert_eq!(
        rig.board.window_moves(),
        vec![WindowState::Closed, WindowState::Open]
    );
    assert!(rig.board.window_led());
    assert_eq!(rig.board.temperature_led(), Some(TemperatureBand::Comfortable));
}

#[test]
fn failed_climate_read_changes_nothing() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.tick(0);
    let before = rig.app.state().current;
    let last_event = rig.app.last_climate_event_ms();
    assert_eq!(rig.shadow.temperature_events.len(), 1);

    rig.board.temperature = f32::NAN;
    rig.tick(CLIMATE_MS);

    assert_eq!(rig.app.state().current, before);
    assert_eq!(rig.app.last_climate_event_ms(), last_event);
    assert_eq!(rig.app.window(), WindowState::Open);
    assert_eq!(rig.shadow.temperature_events.len(), 1);
    assert!(rig.sink.events.contains(&AppEvent::ClimateReadFailed));
}

#[test]
fn dead_climate_sensor_does_not_reopen_window_after_rain() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.tick(0);
    assert_eq!(rig.app.window(), WindowState::Open);

    rig.board.temperature = f32::NAN;
    rig.board.set_wet(true);
    rig.tick(RAIN_MS);
    assert_eq!(rig.app.window(), WindowState::Closed);

    rig.board.set_wet(false);
    for i in 2..=1_000 {
        rig.tick(i * RAIN_MS);
    }

    assert_eq!(rig.app.window(), WindowState::Closed);
    assert!(rig.sink.events.contains(&AppEvent::WindowChanged {
        from: WindowState::Open,
        to: WindowState::Closed,
        verdict: Verdict::Closed(CloseReason::AwaitingData),
    }));
    assert_eq!(rig.alerts(), vec!["rain detected"]);
}

#[test]
fn persistent_rain_notifies_once() {
    let mut board = MockBoard::comfortable();
    board.set_wet(true);
    let mut rig = Rig::new(board);

    rig.tick(0);
    rig.tick(RAIN_MS);
    rig.tick(2 * RAIN_MS);

    assert_eq!(rig.shadow.notification_count("rain detected"), 1);
}

#[test]
fn rain_closes_an_open_window() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.tick(0);
    assert_eq!(rig.app.window(), WindowState::Open);

    rig.board.set_wet(true);
    rig.tick(RAIN_MS);

    assert_eq!(rig.app.window(), WindowState::Closed);
    assert!(rig.sink.events.contains(&AppEvent::WindowChanged {
        from: WindowState::Open,
        to: WindowState::Closed,
        verdict: Verdict::Closed(CloseReason::Rain),
    }));
    assert!(!rig.board.window_led());
}

#[test]
fn humidity_swing_renotifies_after_recovery() {
    let mut rig = Rig::new(MockBoard::with_climate(22.0, 75.0));
    rig.tick(0);
    assert_eq!(rig.alerts(), vec!["humidity out of range"]);

    rig.board.humidity = 50.0;
    rig.tick(CLIMATE_MS);
    assert_eq!(rig.app.window(), WindowState::Open);

    rig.board.humidity = 30.0;
    rig.tick(2 * CLIMATE_MS);
    assert_eq!(
        rig.alerts(),
        vec!["humidity out of range", "humidity out of range"]
    );
}

#[test]
fn direct_humidity_swing_notifies_once() {
    let mut rig = Rig::new(MockBoard::with_climate(22.0, 75.0));
    rig.tick(0);

    rig.board.humidity = 30.0;
    rig.tick(CLIMATE_MS);

    assert_eq!(rig.app.window(), WindowState::Closed);
    assert_eq!(rig.alerts(), vec!["humidity out of range"]);
}

#[test]
fn readings_between_samples_are_not_taken() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.tick(0);
    rig.tick(CLIMATE_MS - 1);
    assert_eq!(rig.board.climate_reads, 1);
    rig.tick(CLIMATE_MS);
    assert_eq!(rig.board.climate_reads, 2);
}
