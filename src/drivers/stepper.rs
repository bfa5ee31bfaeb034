//! Window stepper driver (28BYJ-48 + ULN2003, four coil inputs).
//!
//! Half-step sequencing.  Position is tracked in steps from the closed end
//! stop; the motor has no feedback, so the driver assumes it starts closed
//! (the service drives it closed at start-up, which is a no-op from 0).
//!
//! Moves are blocking: a full travel of 2048 steps at 2 ms takes about
//! 4 s, during which the loop is stalled.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: energises the coils via hw_init GPIO helpers.
//! On host/test: the GPIO and delay helpers are no-ops; only the
//! position bookkeeping runs.

use log::info;

use crate::drivers::hw_init;
use crate::pins;

/// Coil patterns for half-stepping, IN1..IN4.
const HALF_STEP: [[bool; 4]; 8] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

pub struct StepperDriver {
    coils: [i32; 4],
    step_delay_ms: u32,
    position: u16,
    phase: usize,
}

impl StepperDriver {
    pub fn new(coils: [i32; 4], step_delay_ms: u32) -> Self {
        Self {
            coils,
            step_delay_ms,
            position: 0,
            phase: 0,
        }
    }

    /// Driver on the board's coil pins.
    pub fn on_board() -> Self {
        Self::new(pins::STEPPER_COIL_GPIOS, pins::STEPPER_STEP_DELAY_MS)
    }

    /// Step until `position == target`, then de-energise the coils.
    /// Returns the number of steps taken.
    pub fn move_to(&mut self, target: u16) -> u16 {
        let start = self.position;
        while self.position != target {
            if self.position < target {
                self.phase = (self.phase + 1) % HALF_STEP.len();
                self.position += 1;
            } else {
                self.phase = (self.phase + HALF_STEP.len() - 1) % HALF_STEP.len();
                self.position -= 1;
            }
            self.energise(HALF_STEP[self.phase]);
            hw_init::delay_ms(self.step_delay_ms);
        }
        self.release();

        let steps = start.abs_diff(target);
        if steps > 0 {
            info!("Stepper: {} -> {} ({} steps)", start, target, steps);
        }
        steps
    }

    pub fn position(&self) -> u16 {
        self.position
    }

    /// Coils off; the gearbox holds the window.
    pub fn release(&mut self) {
        self.energise([false; 4]);
    }

    fn energise(&self, pattern: [bool; 4]) {
        for (&gpio, high) in self.coils.iter().zip(pattern) {
            hw_init::gpio_write(gpio, high);
        }
    }
}
