//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: [`WifiStation`] wraps
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all targets**: credential validation, used before any radio work.
//!
//! ## Reconnection policy
//!
//! After a drop the station retries with exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s).  The shadow client has its own backoff on top.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl core::error::Error for WifiError {}

impl From<WifiError> for crate::error::CommsError {
    fn from(_: WifiError) -> Self {
        Self::WifiConnectFailed
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(WifiError::InvalidSsid);
    }
    Ok(())
}

/// Empty means an open network.
pub fn validate_password(password: &str) -> Result<(), WifiError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Station (device only)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use station::WifiStation;

#[cfg(target_os = "espidf")]
mod station {
    use anyhow::{Context, anyhow};
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::{info, warn};

    use super::{WifiError, validate_password, validate_ssid};
    use crate::interval::IntervalGate;

    const CONNECT_ATTEMPTS: u32 = 3;
    const BACKOFF_INITIAL_MS: u32 = 2_000;
    const BACKOFF_MAX_MS: u32 = 60_000;

    pub struct WifiStation {
        wifi: BlockingWifi<EspWifi<'static>>,
        backoff_ms: u32,
        retry: IntervalGate,
    }

    impl WifiStation {
        /// Configure the radio and join `ssid`, blocking until the netif is
        /// up or every attempt failed.
        pub fn connect(
            modem: Modem,
            sys_loop: EspSystemEventLoop,
            ssid: &str,
            password: &str,
        ) -> anyhow::Result<Self> {
            validate_ssid(ssid)?;
            validate_password(password)?;

            let esp_wifi = EspWifi::new(modem, sys_loop.clone(), None)?;
            let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;

            let auth_method = if password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPAWPA2Personal
            };
            wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: ssid.try_into().map_err(|_| anyhow!("wifi ssid too long"))?,
                password: password.try_into().map_err(|_| anyhow!("wifi password too long"))?,
                auth_method,
                ..Default::default()
            }))?;
            wifi.start()?;
            info!("WiFi started, connecting to `{}`", ssid);

            let mut station = Self {
                wifi,
                backoff_ms: BACKOFF_INITIAL_MS,
                retry: IntervalGate::new(BACKOFF_INITIAL_MS),
            };
            let mut joined = false;
            for attempt in 1..=CONNECT_ATTEMPTS {
                info!("WiFi connect attempt {}/{}", attempt, CONNECT_ATTEMPTS);
                if station.try_join() {
                    joined = true;
                    break;
                }
            }
            if !joined {
                return Err(WifiError::ConnectionFailed).context("WiFi join failed");
            }
            Ok(station)
        }

        fn try_join(&mut self) -> bool {
            match self.wifi.connect().and_then(|()| self.wifi.wait_netif_up()) {
                Ok(()) => {
                    if let Ok(ip) = self.wifi.wifi().sta_netif().get_ip_info() {
                        info!("WiFi connected, IP {}", ip.ip);
                    }
                    true
                }
                Err(e) => {
                    warn!("WiFi connect failed: {}", e);
                    false
                }
            }
        }

        pub fn is_connected(&self) -> bool {
            self.wifi.is_connected().unwrap_or(false)
        }

        /// Call every loop iteration; rejoins after a drop with backoff.
        pub fn maintain(&mut self, now_ms: u32) {
            if self.is_connected() {
                self.backoff_ms = BACKOFF_INITIAL_MS;
                return;
            }
            if !self.retry.is_due(now_ms) {
                return;
            }
            warn!("WiFi down, rejoining");
            if !self.try_join() {
                self.retry = IntervalGate::new(self.backoff_ms);
                self.retry.mark(now_ms);
                self.backoff_ms = self.backoff_ms.saturating_mul(2).min(BACKOFF_MAX_MS);
            }
        }
    }
}
