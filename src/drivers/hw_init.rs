//! One-shot hardware peripheral initialization.
//!
//! Configures the rain ADC channel, GPIO directions and the LEDC timer for
//! the RGB LED using raw ESP-IDF sys calls. Called once from `main()` before
//! the loop starts.  On host every helper is a no-op.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::AdcInitFailed(_) => Self::Init("rain sensor ADC"),
            HwInitError::GpioConfigFailed(_) => Self::Init("GPIO"),
            HwInitError::LedcInitFailed(_) => Self::Init("status LED PWM"),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_gpio_outputs()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// GPIO 36 is ADC1 channel 0 on the ESP32.
pub const ADC1_CH_RAIN: u32 = 0;

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the init path or the main-loop read
/// path.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ADC1_CH_RAIN, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH0=rain, GPIO{})", pins::RAIN_ANALOG_GPIO);
    Ok(())
}

/// 12-bit raw reading, 0 on failure.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.clamp(0, 4095) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // The LM393 board drives its output push-pull; no pull needed.
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::RAIN_DIGITAL_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on a configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let mut output_pins = pins::STEPPER_COIL_GPIOS.to_vec();
    output_pins.push(pins::WINDOW_LED_GPIO);

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin was configured as an output in init_gpio_outputs().
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

/// Busy-wait; used between stepper phases.
#[cfg(target_os = "espidf")]
pub fn delay_ms(ms: u32) {
    esp_idf_hal::delay::Ets::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_ms(_ms: u32) {}

// ── LEDC PWM ─────────────────────────────────────────────────

pub const LEDC_CH_LED_R: u32 = 0;
pub const LEDC_CH_LED_G: u32 = 1;
pub const LEDC_CH_LED_B: u32 = 2;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::LED_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    let led_gpios = [
        (LEDC_CH_LED_R, pins::LED_R_GPIO),
        (LEDC_CH_LED_G, pins::LED_G_GPIO),
        (LEDC_CH_LED_B, pins::LED_B_GPIO),
    ];
    for (channel, gpio) in led_gpios {
        let ret = unsafe {
            ledc_channel_config(&ledc_channel_config_t {
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel,
                timer_sel: ledc_timer_t_LEDC_TIMER_0,
                gpio_num: gpio,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            })
        };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcInitFailed(ret));
        }
    }

    info!("hw_init: LEDC configured (rgb=CH0-2)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: channels configured in init_ledc(); main loop is the only writer.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u8) {}
