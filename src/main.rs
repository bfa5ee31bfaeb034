//! WeatherMonitor firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter        PanelAdapter        LogEventSink     │
//! │  (Climate+Rain+Actuator)(Keypad+Display)    (EventSink)      │
//! │  ShadowClient<Ws>       NvsConfigStore      WifiStation      │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            AppService (pure logic)                     │  │
//! │  │  samplers · decision engine · reporter · display       │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Credentials are baked in at build time from the `WIFI_SSID`,
//! `WIFI_PASS`, `APP_KEY` and `APP_SECRET` environment variables.

#![deny(unused_must_use)]

use std::thread;
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::gpio::IOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::sntp::EspSntp;
use log::{error, info, warn};

use weathermon::adapters::hardware::HardwareAdapter;
use weathermon::adapters::log_sink::LogEventSink;
use weathermon::adapters::nvs::NvsConfigStore;
use weathermon::adapters::shadow::{ShadowClient, WsTransport};
use weathermon::adapters::time::{Clock, MonotonicClock};
use weathermon::adapters::ui::PanelAdapter;
use weathermon::adapters::wifi::WifiStation;
use weathermon::app::ports::{ConfigError, ConfigPort, ShadowCredentials, ShadowPort};
use weathermon::app::service::AppService;
use weathermon::config::SystemConfig;
use weathermon::drivers::dht22::Dht22;
use weathermon::drivers::hw_init;
use weathermon::drivers::stepper::StepperDriver;
use weathermon::error::Error;
use weathermon::pins;

/// Main loop period.  Samplers and the display throttle themselves.
const LOOP_PERIOD: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WeatherMonitor v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    if let Err(e) = hw_init::init_peripherals() {
        halt(e.into());
    }
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;

    // ── 2. Config from NVS (or defaults) ──────────────────────
    let config = load_config();

    // ── 3. Board adapters ─────────────────────────────────────
    let dht = match Dht22::new(peripherals.pins.gpio4.downgrade()) {
        Ok(d) => d,
        Err(e) => {
            error!("DHT22 pin setup failed: {}", e);
            halt(Error::Init("climate sensor"));
        }
    };
    let mut hw = HardwareAdapter::new(dht, StepperDriver::on_board(), config.window_travel_steps);

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio23,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(pins::I2C_FREQ_HZ.Hz().into()),
    )?;
    let mut panel = PanelAdapter::new(i2c, pins::KEYPAD_I2C_ADDR, pins::DISPLAY_I2C_ADDR);
    if let Err(e) = panel.init() {
        halt(e);
    }

    // ── 4. Network ────────────────────────────────────────────
    let mut wifi = match WifiStation::connect(
        peripherals.modem,
        sys_loop,
        option_env!("WIFI_SSID").unwrap_or_default(),
        option_env!("WIFI_PASS").unwrap_or_default(),
    ) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("WiFi unavailable ({:#}), running offline", e);
            None
        }
    };
    // Wall clock for event timestamps.
    let _sntp = match EspSntp::new_default() {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("SNTP start failed: {}", e);
            None
        }
    };

    let mut shadow = ShadowClient::new(WsTransport::new(), MonotonicClock::new(), &config.device_id);
    let credentials = ShadowCredentials {
        app_key: option_env!("APP_KEY").unwrap_or_default().to_owned(),
        app_secret: option_env!("APP_SECRET").unwrap_or_default().to_owned(),
    };
    if let Err(e) = shadow.connect(&credentials) {
        warn!("Shadow connect failed ({}), will retry", e);
    }

    // ── 5. Application service ────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config, clock.now_ms());
    app.start(&mut hw, &mut shadow, &mut sink);

    // ── 6. Main loop ──────────────────────────────────────────
    info!("Entering main loop");
    loop {
        let now = clock.now_ms();
        if let Some(wifi) = wifi.as_mut() {
            wifi.maintain(now);
        }
        app.tick(now, &mut hw, &mut shadow, &mut panel, &mut sink);
        thread::sleep(LOOP_PERIOD);
    }
}

fn load_config() -> SystemConfig {
    let store = match NvsConfigStore::new() {
        Ok(s) => s,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            return SystemConfig::default();
        }
    };
    match store.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(ConfigError::NotFound) => {
            info!("No stored config, persisting defaults");
            let cfg = SystemConfig::default();
            if let Err(e) = store.save(&cfg) {
                warn!("Config save failed: {}", e);
            }
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    }
}

/// Fatal start-up error: log and park.
fn halt(e: Error) -> ! {
    error!("Fatal: {}, halting", e);
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
