//! Front-panel adapter: TCA8418 keypad and SH1107 display sharing one I²C
//! bus.
//!
//! Implements [`KeypadPort`] and [`DisplayPort`] over any
//! `embedded_hal::i2c::I2c`; on the device that is the esp-idf-hal
//! `I2cDriver`.  A chip that does not answer at [`PanelAdapter::init`] is a
//! fatal start-up error; bus errors after that are logged and counted.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{DisplayPort, KeypadPort};
use crate::drivers::sh1107::Sh1107;
use crate::drivers::tca8418::Tca8418;
use crate::error::Error;
use crate::keypad;

pub struct PanelAdapter<I> {
    bus: I,
    keypad: Tca8418,
    display: Sh1107,
    bus_errors: u32,
}

impl<I: I2c> PanelAdapter<I> {
    pub fn new(bus: I, keypad_addr: u8, display_addr: u8) -> Self {
        Self {
            bus,
            keypad: Tca8418::new(keypad_addr),
            display: Sh1107::new(display_addr),
            bus_errors: 0,
        }
    }

    /// Configure the keypad controller, then the display.
    pub fn init(&mut self) -> Result<(), Error> {
        if let Err(e) = self
            .keypad
            .init(&mut self.bus, keypad::ROWS as u8, keypad::COLS as u8)
        {
            warn!("panel: keypad controller not responding ({:?})", e);
            return Err(Error::Init("keypad"));
        }
        if let Err(e) = self.display.init(&mut self.bus) {
            warn!("panel: display not responding ({:?})", e);
            return Err(Error::Init("display"));
        }
        Ok(())
    }

    pub fn bus_errors(&self) -> u32 {
        self.bus_errors
    }

    pub fn pixel(&self, x: u8, y: u8) -> bool {
        self.display.pixel(usize::from(x), usize::from(y))
    }

    fn record<T>(&mut self, result: Result<T, I::Error>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.bus_errors = self.bus_errors.wrapping_add(1);
                warn!("panel: I2C error {:?}", e);
                None
            }
        }
    }
}

impl<I: I2c> KeypadPort for PanelAdapter<I> {
    fn available(&mut self) -> bool {
        let pending = self.keypad.pending(&mut self.bus);
        self.record(pending).is_some_and(|n| n > 0)
    }

    /// 0 (no key) when the bus read fails.
    fn get_event(&mut self) -> u8 {
        let event = self.keypad.pop_event(&mut self.bus);
        self.record(event).unwrap_or(0)
    }
}

impl<I: I2c> DisplayPort for PanelAdapter<I> {
    fn clear(&mut self) {
        self.display.clear();
    }

    fn draw_pixel(&mut self, x: u8, y: u8) {
        self.display.set_pixel(usize::from(x), usize::from(y));
    }

    fn draw_vline(&mut self, x: u8, y: u8, height: u8) {
        self.display
            .vline(usize::from(x), usize::from(y), usize::from(height));
    }

    fn draw_hline(&mut self, x: u8, y: u8, width: u8) {
        self.display
            .hline(usize::from(x), usize::from(y), usize::from(width));
    }

    fn set_cursor(&mut self, x: u8, y: u8) {
        self.display.set_cursor(usize::from(x), usize::from(y));
    }

    fn print(&mut self, text: &str) {
        self.display.print(text);
    }

    fn write_glyph(&mut self, code: u8) {
        self.display.glyph(code);
    }

    fn flush(&mut self) {
        let result = self.display.flush(&mut self.bus);
        self.record(result);
    }
}
