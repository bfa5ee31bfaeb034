//! TCA8418 keypad scan controller.
//!
//! Register-level driver over any `embedded_hal::i2c::I2c` bus.  The chip
//! scans the matrix itself and queues up to ten key events in a FIFO; the
//! firmware only polls the event count and pops events.

use embedded_hal::i2c::I2c;

const REG_CFG: u8 = 0x01;
const REG_INT_STAT: u8 = 0x02;
const REG_KEY_LCK_EC: u8 = 0x03;
const REG_KEY_EVENT_A: u8 = 0x04;
const REG_KP_GPIO1: u8 = 0x1D;
const REG_KP_GPIO2: u8 = 0x1E;
const REG_KP_GPIO3: u8 = 0x1F;

/// CFG: key-event interrupt enable.
const CFG_KE_IEN: u8 = 0x01;
/// INT_STAT: key-event interrupt flag (write 1 to clear).
const INT_K_INT: u8 = 0x01;
/// KEY_LCK_EC: event count lives in the low nibble.
const EVENT_COUNT_MASK: u8 = 0x0F;
/// Pops attempted while flushing at init; a count that never drops is a
/// wedged chip, not a full FIFO.
const MAX_FLUSH_EVENTS: usize = 16;

pub struct Tca8418 {
    addr: u8,
}

impl Tca8418 {
    pub const fn new(addr: u8) -> Self {
        Self { addr }
    }

    /// Put `rows` × `cols` of the ROW/COL pins into keypad-scan mode and
    /// flush anything queued from before the reset.
    pub fn init<I: I2c>(&self, bus: &mut I, rows: u8, cols: u8) -> Result<(), I::Error> {
        let row_mask = (1u16 << rows) - 1;
        let col_mask = (1u16 << cols) - 1;
        self.write_reg(bus, REG_KP_GPIO1, row_mask as u8)?;
        self.write_reg(bus, REG_KP_GPIO2, col_mask as u8)?;
        self.write_reg(bus, REG_KP_GPIO3, (col_mask >> 8) as u8)?;

        for _ in 0..MAX_FLUSH_EVENTS {
            if self.pending(bus)? == 0 {
                break;
            }
            self.pop_event(bus)?;
        }
        self.write_reg(bus, REG_INT_STAT, INT_K_INT)?;
        self.write_reg(bus, REG_CFG, CFG_KE_IEN)
    }

    /// Number of events waiting in the FIFO.
    pub fn pending<I: I2c>(&self, bus: &mut I) -> Result<u8, I::Error> {
        Ok(self.read_reg(bus, REG_KEY_LCK_EC)? & EVENT_COUNT_MASK)
    }

    /// Pop one raw event (bit 7 press flag, low bits key number).  Clears the
    /// interrupt flag once the FIFO is drained.
    pub fn pop_event<I: I2c>(&self, bus: &mut I) -> Result<u8, I::Error> {
        let event = self.read_reg(bus, REG_KEY_EVENT_A)?;
        if self.pending(bus)? == 0 {
            self.write_reg(bus, REG_INT_STAT, INT_K_INT)?;
        }
        Ok(event)
    }

    fn read_reg<I: I2c>(&self, bus: &mut I, reg: u8) -> Result<u8, I::Error> {
        let mut buf = [0u8; 1];
        bus.write_read(self.addr, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg<I: I2c>(&self, bus: &mut I, reg: u8, value: u8) -> Result<(), I::Error> {
        bus.write(self.addr, &[reg, value])
    }
}
