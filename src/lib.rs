//! WeatherMonitor firmware library.
//!
//! Exposes the pure-logic modules for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; on the host the drivers fall back to simulation
//! stubs.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod decision;
pub mod display;
pub mod error;
pub mod interval;
pub mod keypad;
pub mod reporter;

pub mod adapters;
pub mod drivers;
pub mod pins;
pub mod sensors;
