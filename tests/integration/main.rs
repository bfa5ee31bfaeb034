//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the full control loop
//! against mock adapters.  All tests run on the host (x86_64) with no real
//! hardware required.

#![cfg(not(target_os = "espidf"))]

mod adapter_tests;
mod loop_tests;
mod mock_hw;
mod scenario_tests;
