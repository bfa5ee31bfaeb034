//! Property tests for the timing, sensing and decision invariants.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;

use weathermon::config::ClimateThresholds;
use weathermon::decision::{CloseReason, DecisionEngine, Verdict, WindowState, evaluate};
use weathermon::interval::{IntervalGate, elapsed};
use weathermon::keypad::{self, KEYMAP};
use weathermon::sensors::{RainState, SensorReading};

fn reading() -> impl Strategy<Value = SensorReading> {
    (-40.0f32..60.0, 0.0f32..100.0).prop_map(|(t, h)| SensorReading {
        temperature_c: t,
        humidity_pct: h,
    })
}

fn rain() -> impl Strategy<Value = RainState> {
    (0u16..=4095, any::<bool>()).prop_map(|(level, high)| RainState::from_levels(level, high))
}

// ── Interval gate ─────────────────────────────────────────────

proptest! {
    /// Fires and advances exactly when the wrapped distance reaches the
    /// interval, across the u32 rollover.
    #[test]
    fn gate_advances_iff_interval_elapsed(
        last in any::<u32>(),
        interval in 1u32..=3_600_000,
        delta in any::<u32>(),
    ) {
        let now = last.wrapping_add(delta);
        let mut marker = last;
        let fired = elapsed(&mut marker, interval, now);

        prop_assert_eq!(fired, delta >= interval);
        prop_assert_eq!(marker, if fired { now } else { last });
    }

    #[test]
    fn gate_struct_matches_free_function(
        start in any::<u32>(),
        interval in 1u32..=600_000,
        steps in proptest::collection::vec(0u32..=700_000, 1..=20),
    ) {
        let mut gate = IntervalGate::new(interval);
        gate.mark(start);
        let mut marker = start;
        let mut now = start;
        for step in steps {
            now = now.wrapping_add(step);
            let due = gate.is_due(now);
            prop_assert_eq!(gate.poll(now), due);
            prop_assert_eq!(elapsed(&mut marker, interval, now), due);
            prop_assert_eq!(gate.last_ms(), marker);
        }
    }
}

// ── Rain polarity ─────────────────────────────────────────────

proptest! {
    #[test]
    fn wet_is_negated_comparator_line(level in 0u16..=4095, high in any::<bool>()) {
        let state = RainState::from_levels(level, high);
        prop_assert_eq!(state.is_wet, !high);
        prop_assert_eq!(state.analog_level, level);
    }
}

// ── Decision invariants ───────────────────────────────────────

proptest! {
    /// Wet panel always wins, whatever the climate.
    #[test]
    fn rain_takes_precedence(r in proptest::option::of(reading()), level in 0u16..=4095) {
        let wet = RainState::from_levels(level, false);
        prop_assert_eq!(
            evaluate(r.as_ref(), Some(&wet), &ClimateThresholds::default()),
            Verdict::Closed(CloseReason::Rain)
        );
    }

    /// The window is only ever open inside every limit on a dry panel.
    #[test]
    fn open_implies_all_conditions_favourable(r in reading(), rs in rain()) {
        let th = ClimateThresholds::default();
        if evaluate(Some(&r), Some(&rs), &th) == Verdict::Open {
            prop_assert!(!rs.is_wet);
            prop_assert!(r.temperature_c >= th.temp_low_c && r.temperature_c <= th.temp_high_c);
            prop_assert!(r.humidity_pct >= th.humidity_low_pct());
            prop_assert!(r.humidity_pct <= th.humidity_high_pct());
        }
    }

    /// Missing either input keeps the window shut.
    #[test]
    fn missing_data_fails_closed(r in reading(), level in 0u16..=4095) {
        let th = ClimateThresholds::default();
        let dry = RainState::from_levels(level, true);
        prop_assert_eq!(evaluate(Some(&r), None, &th).window(), WindowState::Closed);
        prop_assert_eq!(evaluate(None, Some(&dry), &th).window(), WindowState::Closed);
    }

    /// Same inputs twice: same window, and no second notification.
    #[test]
    fn repeated_inputs_are_idempotent(r in reading(), rs in rain()) {
        let mut engine = DecisionEngine::new(ClimateThresholds::default());
        let first = engine.decide(Some(&r), Some(&rs));
        let second = engine.decide(Some(&r), Some(&rs));

        prop_assert_eq!(first.window, second.window);
        prop_assert_eq!(first.verdict, second.verdict);
        prop_assert!(!second.window_changed);
        prop_assert_eq!(second.notification, None);
    }
}

// ── Keypad decode ─────────────────────────────────────────────

proptest! {
    #[test]
    fn decode_never_panics_and_stays_in_matrix(code in any::<u8>()) {
        if let Some(ev) = keypad::decode(code) {
            prop_assert!(usize::from(ev.row) < keypad::ROWS);
            prop_assert!(usize::from(ev.col) < keypad::COLS);
            prop_assert_eq!(ev.pressed, code & 0x80 != 0);
            prop_assert_eq!(ev.symbol, KEYMAP[usize::from(ev.col)][usize::from(ev.row)]);
        } else {
            let key = code & 0x7F;
            prop_assert!(key == 0 || (key - 1) / 10 >= 4 || (key - 1) % 10 >= 4);
        }
    }
}
