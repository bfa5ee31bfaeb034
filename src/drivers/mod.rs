//! Sensor, actuator and front-panel drivers, hardware initialisation.

pub mod dht22;
pub mod hw_init;
pub mod rain_sensor;
pub mod sh1107;
pub mod status_led;
pub mod stepper;
pub mod tca8418;
