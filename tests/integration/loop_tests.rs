//! Loop orchestration: start-up, toggles, keypad, display and the
//! pending-notification retry.

use crate::mock_hw::{MockBoard, Rig};

use weathermon::app::events::{AppEvent, ToggleSource};
use weathermon::app::service::ONLINE_MESSAGE;
use weathermon::decision::WindowState;
use weathermon::display::Page;

const SENSING: &str = "toggleInstance1";

#[test]
fn start_announces_device_online() {
    let rig = Rig::new(MockBoard::comfortable());
    assert_eq!(rig.shadow.notifications, vec![ONLINE_MESSAGE.to_owned()]);
    assert_eq!(rig.sink.events[0], AppEvent::Started(WindowState::Closed));
}

#[test]
fn online_message_waits_for_connection() {
    let mut rig = Rig::offline(MockBoard::comfortable());
    assert_eq!(rig.app.pending_notification(), Some(ONLINE_MESSAGE));

    rig.tick(0);
    assert!(rig.shadow.notifications.is_empty());

    rig.shadow.offline = false;
    rig.tick(1);
    assert_eq!(rig.shadow.notifications, vec![ONLINE_MESSAGE.to_owned()]);
    assert_eq!(rig.app.pending_notification(), None);
}

#[test]
fn newer_alert_supersedes_undelivered_one() {
    let mut rig = Rig::offline(MockBoard::with_climate(30.0, 50.0));
    rig.tick(0);
    assert_eq!(
        rig.app.pending_notification(),
        Some("temperature out of range (too hot)")
    );

    rig.board.set_wet(true);
    rig.tick(10_000);
    assert_eq!(rig.app.pending_notification(), Some("rain detected"));

    rig.shadow.offline = false;
    rig.tick(10_001);
    assert_eq!(rig.alerts(), vec!["rain detected"]);
}

#[test]
fn climate_is_decided_locally_while_offline() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.shadow.offline = true;
    rig.tick(0);

    assert_eq!(rig.app.window(), WindowState::Open);
    assert_eq!(rig.app.state().last_reported, None);
    assert!(rig.app.state().current.is_some());
    assert_eq!(rig.app.reporter_stats().failed, 1);
}

#[test]
fn remote_toggle_round_trip_gates_sensing() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.shadow.queue_toggle(SENSING, false);
    rig.tick(0);
    assert!(!rig.app.state().sensing_enabled());
    assert_eq!(rig.board.climate_reads, 0);
    assert!(rig.sink.events.contains(&AppEvent::ToggleChanged {
        instance: SENSING.into(),
        state: false,
        source: ToggleSource::Remote,
    }));

    rig.shadow.queue_toggle(SENSING, true);
    rig.tick(60_000);
    assert!(rig.app.state().sensing_enabled());
    assert_eq!(rig.board.climate_reads, 1);
}

#[test]
fn switching_sensing_off_closes_window_on_next_rain_sample() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.tick(0);
    assert_eq!(rig.app.window(), WindowState::Open);

    rig.shadow.queue_toggle(SENSING, false);
    rig.tick(10_000);
    assert_eq!(rig.app.window(), WindowState::Closed);
    assert!(rig.alerts().is_empty());
}

#[test]
fn unrelated_toggles_leave_sensing_alone() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.shadow.queue_toggle("toggleInstance2", false);
    rig.tick(0);
    assert!(rig.app.state().sensing_enabled());
    assert_eq!(rig.board.climate_reads, 1);
}

#[test]
fn hash_key_flips_sensing_and_reports_it() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.panel.tap(2, 3);
    rig.tick(0);
    assert!(!rig.app.state().sensing_enabled());

    rig.panel.tap(2, 3);
    rig.tick(1);
    assert!(rig.app.state().sensing_enabled());
    assert_eq!(
        rig.shadow.toggle_events,
        vec![(SENSING.to_owned(), false), (SENSING.to_owned(), true)]
    );
}

#[test]
fn page_keys_switch_display_content() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.tick(0);
    assert!(rig.panel.screen().contains("Temp:22.0C"));
    assert!(rig.panel.screen().contains("Cur:22.0C"));

    // 'B' next page
    rig.panel.tap(3, 1);
    rig.tick(1_000);
    assert_eq!(rig.app.page(), Page::Status);
    let screen = rig.panel.screen();
    assert!(screen.contains("Window: OPEN"), "{screen}");
    assert!(screen.contains("Rain: dry"), "{screen}");
    assert!(screen.contains("Sensing: on"), "{screen}");

    // 'A' previous page
    rig.panel.tap(3, 0);
    rig.tick(2_000);
    assert_eq!(rig.app.page(), Page::Climate);
}

#[test]
fn unmapped_and_invalid_key_codes_are_ignored() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.panel.tap(0, 0); // '1'
    rig.panel.keys.push_back(0x80 | 99);
    rig.panel.keys.push_back(0);
    rig.tick(0);

    assert_eq!(rig.app.page(), Page::Climate);
    assert!(rig.app.state().sensing_enabled());
    let presses: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::KeyPressed(k) => Some(k.symbol),
            _ => None,
        })
        .collect();
    assert_eq!(presses, vec!['1']);
}

#[test]
fn display_redraws_only_on_change() {
    let mut rig = Rig::new(MockBoard::comfortable());
    rig.tick(0);
    assert_eq!(rig.panel.flushes, 1);

    // Nothing new: refresh interval elapsed but content is identical.
    rig.tick(1_000);
    assert_eq!(rig.panel.flushes, 1);

    rig.board.set_wet(true);
    rig.tick(10_000);
    assert_eq!(rig.panel.flushes, 2);
}
