//! GPIO / peripheral pin assignments for the window monitor board
//! (ESP32 Huzzah32 Feather).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open-drain, external pull-up).
pub const DHT_GPIO: i32 = 4;

/// LM393 rain sensor analog output.  ADC1 channel 0 (GPIO 36 / SENSOR_VP).
pub const RAIN_ANALOG_GPIO: i32 = 36;
/// LM393 comparator output.  HIGH = dry, LOW = wet.
pub const RAIN_DIGITAL_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Window stepper (28BYJ-48 on a ULN2003 breakout, four coil inputs)
// ---------------------------------------------------------------------------

pub const STEPPER_IN1_GPIO: i32 = 2;
pub const STEPPER_IN2_GPIO: i32 = 15;
pub const STEPPER_IN3_GPIO: i32 = 16;
pub const STEPPER_IN4_GPIO: i32 = 19;

pub const STEPPER_COIL_GPIOS: [i32; 4] = [
    STEPPER_IN1_GPIO,
    STEPPER_IN2_GPIO,
    STEPPER_IN3_GPIO,
    STEPPER_IN4_GPIO,
];

/// Delay between half-steps.  The 28BYJ-48 stalls much below ~2 ms.
pub const STEPPER_STEP_DELAY_MS: u32 = 2;

// ---------------------------------------------------------------------------
// Status LEDs
// ---------------------------------------------------------------------------

/// Green "window open" LED.
pub const WINDOW_LED_GPIO: i32 = 21;

/// Discrete RGB temperature LED, one LEDC channel per colour.
pub const LED_R_GPIO: i32 = 25;
pub const LED_G_GPIO: i32 = 26;
pub const LED_B_GPIO: i32 = 27;

/// LEDC frequency for the RGB LED (1 kHz).
pub const LED_PWM_FREQ_HZ: u32 = 1_000;

// ---------------------------------------------------------------------------
// I²C bus (TCA8418 keypad, SH1107 OLED)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 23;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 400_000;

pub const KEYPAD_I2C_ADDR: u8 = 0x34;
pub const DISPLAY_I2C_ADDR: u8 = 0x3D;
