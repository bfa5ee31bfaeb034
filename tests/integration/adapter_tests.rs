//! The real shadow client and config store behind the service.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::mock_hw::{MockBoard, MockPanel, RecordingSink};

use weathermon::adapters::nvs::NvsConfigStore;
use weathermon::adapters::shadow::{ShadowClient, ShadowTransport, TransportError};
use weathermon::adapters::time::Clock;
use weathermon::app::ports::{ConfigError, ConfigPort, ShadowCredentials, ShadowPort};
use weathermon::app::service::{AppService, ONLINE_MESSAGE};
use weathermon::config::SystemConfig;

const SECRET: &str = "5f36b0b2-secret";

// ── In-memory transport ───────────────────────────────────────

#[derive(Default)]
struct Wire {
    open: bool,
    outbound: Vec<String>,
    inbound: VecDeque<String>,
}

/// Both ends share the wire so the test can inspect it while the client
/// owns the transport.
#[derive(Clone, Default)]
struct MemTransport(Rc<RefCell<Wire>>);

impl ShadowTransport for MemTransport {
    fn open(&mut self, _app_key: &str, _device_id: &str) -> Result<(), TransportError> {
        self.0.borrow_mut().open = true;
        Ok(())
    }
    fn close(&mut self) {
        self.0.borrow_mut().open = false;
    }
    fn is_open(&self) -> bool {
        self.0.borrow().open
    }
    fn send_text(&mut self, frame: &str) -> Result<(), TransportError> {
        let mut wire = self.0.borrow_mut();
        if !wire.open {
            return Err(TransportError::Closed);
        }
        wire.outbound.push(frame.to_owned());
        Ok(())
    }
    fn poll_text(&mut self) -> Option<String> {
        self.0.borrow_mut().inbound.pop_front()
    }
}

#[derive(Clone, Default)]
struct TestClock(Rc<Cell<u32>>);

impl Clock for TestClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
    fn unix_time_secs(&self) -> u64 {
        1_700_000_000
    }
}

fn hmac_hex(payload: &Value) -> String {
    hmac_sha256::HMAC::mac(payload.to_string().as_bytes(), SECRET.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Payloads sent by the device, signature checked.
fn sent_payloads(wire: &MemTransport) -> Vec<Value> {
    wire.0
        .borrow()
        .outbound
        .iter()
        .map(|frame| {
            let env: Value = serde_json::from_str(frame).unwrap();
            assert_eq!(env["signature"]["HMAC"], hmac_hex(&env["payload"]));
            env["payload"].clone()
        })
        .collect()
}

fn toggle_request(device_id: &str, state: &str) -> String {
    let payload = json!({
        "action": "setToggleState",
        "type": "request",
        "deviceId": device_id,
        "instanceId": "toggleInstance1",
        "replyToken": "srv-42",
        "createdAt": 1_700_000_000u64,
        "value": { "state": state },
    });
    json!({
        "header": { "payloadVersion": 2, "signatureVersion": 1 },
        "payload": payload,
        "signature": { "HMAC": hmac_hex(&payload) },
    })
    .to_string()
}

#[test]
fn service_talks_signed_json_to_the_shadow_server() {
    let config = SystemConfig::default();
    let device_id = config.device_id.to_string();
    let wire = MemTransport::default();
    let mut shadow = ShadowClient::new(wire.clone(), TestClock::default(), &device_id);
    shadow
        .connect(&ShadowCredentials {
            app_key: "app-key".into(),
            app_secret: SECRET.into(),
        })
        .unwrap();

    let mut board = MockBoard::comfortable();
    let mut panel = MockPanel::default();
    let mut sink = RecordingSink::default();
    let mut app = AppService::new(config, 0);
    app.start(&mut board, &mut shadow, &mut sink);
    app.tick(0, &mut board, &mut shadow, &mut panel, &mut sink);

    let sent = sent_payloads(&wire);
    assert_eq!(sent[0]["action"], "pushNotification");
    assert_eq!(sent[0]["value"]["alert"], ONLINE_MESSAGE);
    assert_eq!(sent[1]["action"], "currentTemperature");
    assert_eq!(sent[1]["deviceId"], device_id.as_str());
    assert_eq!(sent[1]["value"]["temperature"], 22.0);
    assert_eq!(sent[1]["value"]["humidity"], 50.0);

    // Remote switch-off arrives on the next iteration and is acknowledged.
    wire.0
        .borrow_mut()
        .inbound
        .push_back(toggle_request(&device_id, "Off"));
    app.tick(1, &mut board, &mut shadow, &mut panel, &mut sink);
    assert!(!app.state().sensing_enabled());

    let sent = sent_payloads(&wire);
    let ack = sent.last().unwrap();
    assert_eq!(ack["type"], "response");
    assert_eq!(ack["replyToken"], "srv-42");
    assert_eq!(ack["value"]["state"], "Off");
}

#[test]
fn dropped_link_is_reopened_and_alert_delivered() {
    let config = SystemConfig::default();
    let wire = MemTransport::default();
    let clock = TestClock::default();
    let mut shadow = ShadowClient::new(wire.clone(), clock.clone(), &config.device_id);
    shadow
        .connect(&ShadowCredentials {
            app_key: "app-key".into(),
            app_secret: SECRET.into(),
        })
        .unwrap();

    let mut board = MockBoard::comfortable();
    board.set_wet(true);
    let (mut panel, mut sink) = (MockPanel::default(), RecordingSink::default());
    let mut app = AppService::new(config, 0);
    app.start(&mut board, &mut shadow, &mut sink);

    wire.0.borrow_mut().open = false;
    app.tick(0, &mut board, &mut shadow, &mut panel, &mut sink);
    assert_eq!(app.pending_notification(), Some("rain detected"));

    clock.0.set(2_000);
    app.tick(2_000, &mut board, &mut shadow, &mut panel, &mut sink);
    assert_eq!(app.pending_notification(), None);
    let alerts: Vec<_> = sent_payloads(&wire)
        .into_iter()
        .filter(|p| p["action"] == "pushNotification")
        .map(|p| p["value"]["alert"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(alerts, vec![ONLINE_MESSAGE.to_owned(), "rain detected".to_owned()]);
}

#[test]
fn config_store_round_trips_and_rejects_invalid() {
    let store = NvsConfigStore::new().unwrap();
    assert_eq!(store.load(), Err(ConfigError::NotFound));

    let mut config = SystemConfig::default();
    config.thresholds.temp_high_c = 30.0;
    config.climate_sample_interval_ms = 30_000;
    store.save(&config).unwrap();
    assert_eq!(store.load().unwrap(), config);

    let mut bad = config.clone();
    bad.thresholds.temp_low_c = 40.0;
    assert!(matches!(store.save(&bad), Err(ConfigError::ValidationFailed(_))));
    assert_eq!(store.load().unwrap(), config);
}
