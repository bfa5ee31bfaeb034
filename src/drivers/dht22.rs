//! DHT22 temperature / humidity sensor on a single open-drain GPIO.
//!
//! One bus transaction yields both values, and the part needs ~2 s between
//! transactions, so [`Dht22::read`] returns the pair and the hardware
//! adapter caches humidity for the following `read_humidity` call.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the protocol through `dht-sensor` on an
//! `esp-idf-hal` open-drain pin.
//! On host/test: returns values injected with [`sim_set_climate`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[cfg(target_os = "espidf")]
use dht_sensor::dht22;
#[cfg(target_os = "espidf")]
use esp_idf_hal::{
    delay::Ets,
    gpio::{AnyIOPin, InputOutput, PinDriver, Pull},
};
#[cfg(target_os = "espidf")]
use log::warn;

use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41B0_0000); // 22.0
#[cfg(not(target_os = "espidf"))]
static SIM_RH_BITS: AtomicU32 = AtomicU32::new(0x4248_0000); // 50.0
#[cfg(not(target_os = "espidf"))]
static SIM_FAIL: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_RH_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

/// Make subsequent reads fail (checksum / timeout).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_failing(failing: bool) {
    SIM_FAIL.store(failing, Ordering::Relaxed);
}

#[cfg(target_os = "espidf")]
pub struct Dht22 {
    pin: PinDriver<'static, AnyIOPin, InputOutput>,
    delay: Ets,
}

#[cfg(target_os = "espidf")]
impl Dht22 {
    pub fn new(pin: AnyIOPin) -> anyhow::Result<Self> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_high()?;
        Ok(Self { pin, delay: Ets })
    }

    /// `(temperature °C, relative humidity %)`.
    pub fn read(&mut self) -> Result<(f32, f32), SensorError> {
        if self.pin.set_high().is_err() {
            return Err(SensorError::GpioReadFailed);
        }
        match dht22::blocking::read(&mut self.delay, &mut self.pin) {
            Ok(r) => Ok((r.temperature, r.relative_humidity)),
            Err(err) => {
                warn!("DHT22 read on GPIO{} failed: {:?}", crate::pins::DHT_GPIO, err);
                Err(SensorError::ReadFailed)
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
pub struct Dht22 {
    _private: (),
}

#[cfg(not(target_os = "espidf"))]
impl Dht22 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self) -> Result<(f32, f32), SensorError> {
        if SIM_FAIL.load(Ordering::Relaxed) {
            return Err(SensorError::ReadFailed);
        }
        Ok((
            f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            f32::from_bits(SIM_RH_BITS.load(Ordering::Relaxed)),
        ))
    }
}
