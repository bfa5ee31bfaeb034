//! Device-shadow service client.
//!
//! Implements [`ShadowPort`] on top of any [`ShadowTransport`] (a WebSocket
//! on the device, an in-memory pipe in tests).
//!
//! ## Wire format
//!
//! Every frame is a JSON envelope:
//!
//! ```text
//! {"header":{"payloadVersion":2,"signatureVersion":1},
//!  "payload":{"action":..,"type":"event|request|response","deviceId":..,..},
//!  "signature":{"HMAC":"<hex>"}}
//! ```
//!
//! The signature is `HMAC-SHA256(app_secret, payload)` over the compact
//! serialisation of the payload as a `serde_json::Value` (keys sorted), so
//! both ends can recompute it from the parsed frame.  Inbound frames with a
//! bad signature or another device's id are dropped.
//!
//! ## Connection management
//!
//! [`ShadowPort::handle`] notices a dropped transport and reconnects with
//! exponential backoff (2 s doubling to 60 s).  Sends while disconnected
//! fail fast with [`ShadowError::NotConnected`]; the domain retries them.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::app::ports::{ShadowCommand, ShadowCredentials, ShadowError, ShadowPort};
use crate::interval::IntervalGate;

use super::time::Clock;

pub const SHADOW_SERVER_URI: &str = "ws://ws.sinric.pro";

const BACKOFF_INITIAL_MS: u32 = 2_000;
const BACKOFF_MAX_MS: u32 = 60_000;

const ACTION_TEMPERATURE: &str = "currentTemperature";
const ACTION_PUSH: &str = "pushNotification";
const ACTION_TOGGLE: &str = "setToggleState";

// ───────────────────────────────────────────────────────────────
// Transport seam
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    ConnectFailed,
    Closed,
    WriteFailed,
}

/// Bidirectional text-frame channel to the shadow server.
pub trait ShadowTransport {
    /// Open the channel, authenticating with `app_key` for `device_id`.
    fn open(&mut self, app_key: &str, device_id: &str) -> Result<(), TransportError>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn send_text(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Next received frame, non-blocking.
    fn poll_text(&mut self) -> Option<String>;
}

// ───────────────────────────────────────────────────────────────
// Message types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    payload_version: u8,
    signature_version: u8,
}

const HEADER: Header = Header {
    payload_version: 2,
    signature_version: 1,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Signature {
    #[serde(rename = "HMAC")]
    hmac: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Envelope {
    header: Header,
    payload: Value,
    signature: Signature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MessageType {
    Event,
    Request,
    Response,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Cause {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    action: String,
    #[serde(rename = "type")]
    kind: MessageType,
    device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instance_id: Option<String>,
    #[serde(default)]
    reply_token: String,
    #[serde(default)]
    created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<Cause>,
    #[serde(default)]
    value: Value,
}

fn toggle_value(state: bool) -> Value {
    let state = if state { "On" } else { "Off" };
    json!({ "state": state })
}

fn parse_toggle_value(value: &Value) -> Option<bool> {
    match value.get("state")?.as_str()? {
        "On" => Some(true),
        "Off" => Some(false),
        _ => None,
    }
}

fn hex(bytes: &[u8]) -> String {
    use core::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{:02x}", b);
        s
    })
}

/// Hex HMAC over the canonical payload serialisation.
fn sign(payload: &Value, secret: &str) -> String {
    let canonical = payload.to_string();
    hex(&hmac_sha256::HMAC::mac(canonical.as_bytes(), secret.as_bytes()))
}

fn unhex_tag(text: &str) -> Option<[u8; 32]> {
    let bytes = text.as_bytes();
    if bytes.len() != 64 || !bytes.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let mut tag = [0u8; 32];
    for (out, pair) in tag.iter_mut().zip(bytes.chunks_exact(2)) {
        let pair = core::str::from_utf8(pair).ok()?;
        *out = u8::from_str_radix(pair, 16).ok()?;
    }
    Some(tag)
}

/// Constant-time check of a hex tag against the payload.
fn verify(payload: &Value, secret: &str, tag_hex: &str) -> bool {
    let Some(tag) = unhex_tag(tag_hex) else {
        return false;
    };
    hmac_sha256::HMAC::verify(payload.to_string().as_bytes(), secret.as_bytes(), &tag)
}

// ───────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────

pub struct ShadowClient<T: ShadowTransport, C: Clock> {
    transport: T,
    clock: C,
    device_id: String,
    credentials: Option<ShadowCredentials>,
    connected: bool,
    backoff_ms: u32,
    retry: IntervalGate,
    next_token: u32,
}

impl<T: ShadowTransport, C: Clock> ShadowClient<T, C> {
    pub fn new(transport: T, clock: C, device_id: &str) -> Self {
        Self {
            transport,
            clock,
            device_id: device_id.to_owned(),
            credentials: None,
            connected: false,
            backoff_ms: BACKOFF_INITIAL_MS,
            retry: IntervalGate::new(BACKOFF_INITIAL_MS),
            next_token: 0,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Delay before the next reconnect attempt.
    pub fn backoff_ms(&self) -> u32 {
        self.backoff_ms
    }

    fn try_open(&mut self) -> Result<(), ShadowError> {
        let Some(creds) = self.credentials.as_ref() else {
            return Err(ShadowError::NotConnected);
        };
        let now = self.clock.now_ms();
        match self.transport.open(&creds.app_key, &self.device_id) {
            Ok(()) => {
                info!("Shadow: connected as {}", self.device_id);
                self.connected = true;
                self.backoff_ms = BACKOFF_INITIAL_MS;
                Ok(())
            }
            Err(e) => {
                warn!("Shadow: connect failed ({:?}), retry in {} ms", e, self.backoff_ms);
                self.schedule_retry(now);
                Err(ShadowError::NotConnected)
            }
        }
    }

    fn schedule_retry(&mut self, now_ms: u32) {
        self.retry = IntervalGate::new(self.backoff_ms);
        self.retry.mark(now_ms);
        self.backoff_ms = self.backoff_ms.saturating_mul(2).min(BACKOFF_MAX_MS);
    }

    fn secret(&self) -> Result<&str, ShadowError> {
        self.credentials
            .as_ref()
            .map(|c| c.app_secret.as_str())
            .ok_or(ShadowError::NotConnected)
    }

    fn reply_token(&mut self) -> String {
        self.next_token = self.next_token.wrapping_add(1);
        format!("{}-{}", self.device_id, self.next_token)
    }

    fn send_payload(&mut self, payload: &Payload) -> Result<(), ShadowError> {
        if !self.is_connected() {
            return Err(ShadowError::NotConnected);
        }
        let payload = serde_json::to_value(payload).map_err(|_| ShadowError::SendFailed)?;
        let envelope = Envelope {
            header: HEADER,
            signature: Signature {
                hmac: sign(&payload, self.secret()?),
            },
            payload,
        };
        let frame = serde_json::to_string(&envelope).map_err(|_| ShadowError::SendFailed)?;
        debug!("Shadow >> {}", frame);
        self.transport.send_text(&frame).map_err(|e| {
            warn!("Shadow: send failed ({:?})", e);
            ShadowError::SendFailed
        })
    }

    fn event(&mut self, action: &str, instance_id: Option<String>, cause: &str, value: Value) -> Payload {
        Payload {
            action: action.to_owned(),
            kind: MessageType::Event,
            device_id: self.device_id.clone(),
            instance_id,
            reply_token: self.reply_token(),
            created_at: self.clock.unix_time_secs(),
            success: None,
            cause: Some(Cause { kind: cause.to_owned() }),
            value,
        }
    }

    /// Validate one inbound frame; acknowledge and return it if it is a
    /// toggle request for this device.
    fn handle_frame(&mut self, frame: &str) -> Option<ShadowCommand> {
        debug!("Shadow << {}", frame);
        let envelope: Envelope = match serde_json::from_str(frame) {
            Ok(e) => e,
            Err(e) => {
                warn!("Shadow: dropping malformed frame: {}", e);
                return None;
            }
        };
        let secret = self.secret().ok()?;
        if !verify(&envelope.payload, secret, &envelope.signature.hmac) {
            warn!("Shadow: dropping frame with bad signature");
            return None;
        }
        let request: Payload = serde_json::from_value(envelope.payload).ok()?;
        if request.device_id != self.device_id || request.kind != MessageType::Request {
            return None;
        }
        if request.action != ACTION_TOGGLE {
            info!("Shadow: unsupported action '{}'", request.action);
            return None;
        }
        let (Some(instance), Some(state)) =
            (request.instance_id.clone(), parse_toggle_value(&request.value))
        else {
            warn!("Shadow: malformed {} request", ACTION_TOGGLE);
            return None;
        };

        let response = Payload {
            kind: MessageType::Response,
            success: Some(true),
            created_at: self.clock.unix_time_secs(),
            cause: None,
            value: toggle_value(state),
            ..request
        };
        if self.send_payload(&response).is_err() {
            warn!("Shadow: could not acknowledge {} for '{}'", ACTION_TOGGLE, instance);
        }

        Some(ShadowCommand::SetToggleState { instance, state })
    }
}

impl<T: ShadowTransport, C: Clock> ShadowPort for ShadowClient<T, C> {
    fn connect(&mut self, credentials: &ShadowCredentials) -> Result<(), ShadowError> {
        self.credentials = Some(credentials.clone());
        self.try_open()
    }

    fn handle(&mut self) -> Vec<ShadowCommand> {
        if self.connected && !self.transport.is_open() {
            warn!("Shadow: connection lost");
            self.connected = false;
            self.backoff_ms = BACKOFF_INITIAL_MS;
            self.schedule_retry(self.clock.now_ms());
        }

        if !self.connected {
            if self.credentials.is_some() && self.retry.is_due(self.clock.now_ms()) {
                let _ = self.try_open();
            }
            if !self.connected {
                return Vec::new();
            }
        }

        let mut commands = Vec::new();
        while let Some(frame) = self.transport.poll_text() {
            if let Some(cmd) = self.handle_frame(&frame) {
                commands.push(cmd);
            }
        }
        commands
    }

    fn is_connected(&self) -> bool {
        self.connected && self.transport.is_open()
    }

    fn send_temperature_event(&mut self, temperature_c: f32, humidity_pct: f32) -> Result<(), ShadowError> {
        let value = json!({
            "temperature": (f64::from(temperature_c) * 10.0).round() / 10.0,
            "humidity": (f64::from(humidity_pct) * 10.0).round() / 10.0,
        });
        let payload = self.event(ACTION_TEMPERATURE, None, "PERIODIC_POLL", value);
        self.send_payload(&payload)
    }

    fn send_push_notification(&mut self, text: &str) -> Result<(), ShadowError> {
        let payload = self.event(ACTION_PUSH, None, "ALERT", json!({ "alert": text }));
        self.send_payload(&payload)
    }

    fn send_toggle_state_event(&mut self, instance: &str, state: bool) -> Result<(), ShadowError> {
        let payload = self.event(
            ACTION_TOGGLE,
            Some(instance.to_owned()),
            "PHYSICAL_INTERACTION",
            toggle_value(state),
        );
        self.send_payload(&payload)
    }
}

// ───────────────────────────────────────────────────────────────
// On-device WebSocket transport
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use ws::WsTransport;

#[cfg(target_os = "espidf")]
mod ws {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use esp_idf_svc::ws::FrameType;
    use esp_idf_svc::ws::client::{
        EspWebSocketClient, EspWebSocketClientConfig, WebSocketEventType,
    };
    use log::warn;

    use super::{SHADOW_SERVER_URI, ShadowTransport, TransportError};

    /// Inbound frames queued by the client task, drained by the main loop.
    const INBOX_CAPACITY: usize = 8;
    const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
    const HANDSHAKE_POLL: Duration = Duration::from_millis(50);

    pub struct WsTransport {
        client: Option<EspWebSocketClient<'static>>,
        inbox: Arc<Mutex<VecDeque<String>>>,
        open: Arc<AtomicBool>,
    }

    impl WsTransport {
        pub fn new() -> Self {
            Self {
                client: None,
                inbox: Arc::new(Mutex::new(VecDeque::with_capacity(INBOX_CAPACITY))),
                open: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl Default for WsTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ShadowTransport for WsTransport {
        fn open(&mut self, app_key: &str, device_id: &str) -> Result<(), TransportError> {
            self.close();
            let headers = format!("appkey:{}\r\ndeviceids:{}\r\nplatform:ESP32\r\n", app_key, device_id);
            let config = EspWebSocketClientConfig {
                headers: Some(&headers),
                ..Default::default()
            };

            let inbox = Arc::clone(&self.inbox);
            let open = Arc::clone(&self.open);
            let client = EspWebSocketClient::new(
                SHADOW_SERVER_URI,
                &config,
                Duration::from_secs(10),
                move |event| match event {
                    Ok(event) => match event.event_type {
                        WebSocketEventType::Connected => open.store(true, Ordering::Release),
                        WebSocketEventType::Disconnected | WebSocketEventType::Closed => {
                            open.store(false, Ordering::Release);
                        }
                        WebSocketEventType::Text(text) => {
                            if let Ok(mut q) = inbox.lock() {
                                if q.len() == INBOX_CAPACITY {
                                    q.pop_front();
                                }
                                q.push_back(text.to_owned());
                            }
                        }
                        _ => {}
                    },
                    Err(e) => warn!("ws: {:?}", e),
                },
            )
            .map_err(|_| TransportError::ConnectFailed)?;

            // The handshake completes on the client task; wait for it so the
            // caller sees a usable channel or an error.
            let mut waited = Duration::ZERO;
            while !self.open.load(Ordering::Acquire) {
                if waited >= HANDSHAKE_TIMEOUT {
                    warn!("ws: handshake timed out");
                    return Err(TransportError::ConnectFailed);
                }
                std::thread::sleep(HANDSHAKE_POLL);
                waited += HANDSHAKE_POLL;
            }

            self.client = Some(client);
            Ok(())
        }

        fn close(&mut self) {
            self.client = None;
            self.open.store(false, Ordering::Release);
        }

        fn is_open(&self) -> bool {
            self.client.is_some() && self.open.load(Ordering::Acquire)
        }

        fn send_text(&mut self, frame: &str) -> Result<(), TransportError> {
            let client = self.client.as_mut().ok_or(TransportError::Closed)?;
            client
                .send(FrameType::Text(false), frame.as_bytes())
                .map_err(|_| TransportError::WriteFailed)
        }

        fn poll_text(&mut self) -> Option<String> {
            self.inbox.lock().ok()?.pop_front()
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
