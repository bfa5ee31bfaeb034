//! Fuzz target: inbound shadow-service frames
//!
//! Feeds arbitrary text through `ShadowClient::handle` and checks:
//! - No panics under any input
//! - Nothing unsigned ever becomes a command
//!
//! cargo fuzz run fuzz_shadow_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use weathermon::adapters::shadow::{ShadowClient, ShadowTransport, TransportError};
use weathermon::adapters::time::Clock;
use weathermon::app::ports::{ShadowCredentials, ShadowPort};

struct OneShot {
    frame: Option<String>,
}

impl ShadowTransport for OneShot {
    fn open(&mut self, _app_key: &str, _device_id: &str) -> Result<(), TransportError> {
        Ok(())
    }
    fn close(&mut self) {}
    fn is_open(&self) -> bool {
        true
    }
    fn send_text(&mut self, _frame: &str) -> Result<(), TransportError> {
        Ok(())
    }
    fn poll_text(&mut self) -> Option<String> {
        self.frame.take()
    }
}

struct Frozen;

impl Clock for Frozen {
    fn now_ms(&self) -> u32 {
        0
    }
    fn unix_time_secs(&self) -> u64 {
        0
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let transport = OneShot {
        frame: Some(text.to_owned()),
    };
    let mut client = ShadowClient::new(transport, Frozen, "653846228332c2648adaa2a7");
    let _ = client.connect(&ShadowCredentials {
        app_key: "fuzz".into(),
        app_secret: "fuzz-secret".into(),
    });

    let commands = client.handle();
    assert!(commands.is_empty(), "unsigned frame accepted: {text}");
});
