//! Application core: domain logic, no direct I/O.
//!
//! This module ties the window-monitor components together: device state,
//! the per-iteration loop and command handling.  All interaction with
//! hardware and the network happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod state;
