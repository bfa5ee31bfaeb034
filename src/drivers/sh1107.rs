//! SH1107 monochrome OLED (128×64) with an in-RAM frame buffer.
//!
//! Drawing only touches the buffer; [`Sh1107::flush`] pushes it to the
//! panel page by page.  Text uses a 5×7 glyph set on a 6×8 cell with the
//! cursor at the glyph's top-left corner.

use embedded_hal::i2c::I2c;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Control byte: command stream / data stream.
const CTRL_CMD: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;

const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x51, // clock divide
    0x20, // page addressing
    0x81, 0x4F, // contrast
    0xAD, 0x8A, // DC-DC on
    0xA0, // segment remap
    0xC0, // COM scan direction
    0xDC, 0x00, // start line
    0xD3, 0x60, // display offset
    0xD9, 0x22, // pre-charge
    0xDB, 0x35, // VCOMH
    0xA8, 0x3F, // multiplex 64
    0xA4, // resume from RAM
    0xA6, // normal (not inverted)
    0xAF, // display on
];

pub struct Sh1107 {
    addr: u8,
    buffer: [u8; WIDTH * PAGES],
    cursor_x: usize,
    cursor_y: usize,
}

impl Sh1107 {
    pub const fn new(addr: u8) -> Self {
        Self {
            addr,
            buffer: [0; WIDTH * PAGES],
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn init<I: I2c>(&mut self, bus: &mut I) -> Result<(), I::Error> {
        for &cmd in INIT_SEQUENCE {
            bus.write(self.addr, &[CTRL_CMD, cmd])?;
        }
        self.clear();
        self.flush(bus)
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0);
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.buffer[(y / 8) * WIDTH + x] & (1 << (y % 8)) != 0
    }

    /// Out-of-range coordinates are clipped.
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        if x < WIDTH && y < HEIGHT {
            self.buffer[(y / 8) * WIDTH + x] |= 1 << (y % 8);
        }
    }

    pub fn vline(&mut self, x: usize, y: usize, height: usize) {
        for dy in 0..height {
            self.set_pixel(x, y + dy);
        }
    }

    pub fn hline(&mut self, x: usize, y: usize, width: usize) {
        for dx in 0..width {
            self.set_pixel(x + dx, y);
        }
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn print(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.cursor_x = 0;
                self.cursor_y += 8;
                continue;
            }
            let code = u8::try_from(ch).unwrap_or(b'?');
            self.glyph(code);
        }
    }

    /// Draw one glyph at the cursor and advance it by a cell.
    pub fn glyph(&mut self, code: u8) {
        let columns = glyph_columns(code);
        for (dx, bits) in columns.iter().enumerate() {
            for dy in 0..8 {
                if bits & (1 << dy) != 0 {
                    self.set_pixel(self.cursor_x + dx, self.cursor_y + dy);
                }
            }
        }
        self.cursor_x += 6;
    }

    pub fn flush<I: I2c>(&self, bus: &mut I) -> Result<(), I::Error> {
        let mut data = [0u8; WIDTH + 1];
        data[0] = CTRL_DATA;
        for (page, row) in self.buffer.chunks_exact(WIDTH).enumerate() {
            bus.write(self.addr, &[CTRL_CMD, 0xB0 | page as u8, 0x00, 0x10])?;
            data[1..].copy_from_slice(row);
            bus.write(self.addr, &data)?;
        }
        Ok(())
    }
}

const UP_ARROW: [u8; 5] = [0x04, 0x02, 0x7F, 0x02, 0x04];
const UNKNOWN: [u8; 5] = [0x02, 0x01, 0x59, 0x09, 0x06];

fn glyph_columns(code: u8) -> &'static [u8; 5] {
    match code {
        24 => &UP_ARROW,
        0x20..=0x7E => &FONT_5X7[usize::from(code - 0x20)],
        _ => &UNKNOWN,
    }
}

/// Printable ASCII 0x20..=0x7E, column-major, LSB at the top.
#[rustfmt::skip]
const FONT_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00],
    [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14],
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62],
    [0x36, 0x49, 0x56, 0x20, 0x50], [0x00, 0x08, 0x07, 0x03, 0x00],
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00],
    [0x2A, 0x1C, 0x7F, 0x1C, 0x2A], [0x08, 0x08, 0x3E, 0x08, 0x08],
    [0x00, 0x80, 0x70, 0x30, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08],
    [0x00, 0x00, 0x60, 0x60, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02],
    // 0-9
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00],
    [0x72, 0x49, 0x49, 0x49, 0x46], [0x21, 0x41, 0x49, 0x4D, 0x33],
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39],
    [0x3C, 0x4A, 0x49, 0x49, 0x31], [0x41, 0x21, 0x11, 0x09, 0x07],
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x46, 0x49, 0x49, 0x29, 0x1E],
    // : ; < = > ? @
    [0x00, 0x00, 0x14, 0x00, 0x00], [0x00, 0x40, 0x34, 0x00, 0x00],
    [0x00, 0x08, 0x14, 0x22, 0x41], [0x14, 0x14, 0x14, 0x14, 0x14],
    [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x59, 0x09, 0x06],
    [0x3E, 0x41, 0x5D, 0x59, 0x4E],
    // A-Z
    [0x7C, 0x12, 0x11, 0x12, 0x7C], [0x7F, 0x49, 0x49, 0x49, 0x36],
    [0x3E, 0x41, 0x41, 0x41, 0x22], [0x7F, 0x41, 0x41, 0x41, 0x3E],
    [0x7F, 0x49, 0x49, 0x49, 0x41], [0x7F, 0x09, 0x09, 0x09, 0x01],
    [0x3E, 0x41, 0x41, 0x51, 0x73], [0x7F, 0x08, 0x08, 0x08, 0x7F],
    [0x00, 0x41, 0x7F, 0x41, 0x00], [0x20, 0x40, 0x41, 0x3F, 0x01],
    [0x7F, 0x08, 0x14, 0x22, 0x41], [0x7F, 0x40, 0x40, 0x40, 0x40],
    [0x7F, 0x02, 0x1C, 0x02, 0x7F], [0x7F, 0x04, 0x08, 0x10, 0x7F],
    [0x3E, 0x41, 0x41, 0x41, 0x3E], [0x7F, 0x09, 0x09, 0x09, 0x06],
    [0x3E, 0x41, 0x51, 0x21, 0x5E], [0x7F, 0x09, 0x19, 0x29, 0x46],
    [0x26, 0x49, 0x49, 0x49, 0x32], [0x03, 0x01, 0x7F, 0x01, 0x03],
    [0x3F, 0x40, 0x40, 0x40, 0x3F], [0x1F, 0x20, 0x40, 0x20, 0x1F],
    [0x3F, 0x40, 0x38, 0x40, 0x3F], [0x63, 0x14, 0x08, 0x14, 0x63],
    [0x03, 0x04, 0x78, 0x04, 0x03], [0x61, 0x59, 0x49, 0x4D, 0x43],
    // [ \ ] ^ _ `
    [0x00, 0x7F, 0x41, 0x41, 0x41], [0x02, 0x04, 0x08, 0x10, 0x20],
    [0x00, 0x41, 0x41, 0x41, 0x7F], [0x04, 0x02, 0x01, 0x02, 0x04],
    [0x40, 0x40, 0x40, 0x40, 0x40], [0x00, 0x03, 0x07, 0x08, 0x00],
    // a-z
    [0x20, 0x54, 0x54, 0x78, 0x40], [0x7F, 0x28, 0x44, 0x44, 0x38],
    [0x38, 0x44, 0x44, 0x44, 0x28], [0x38, 0x44, 0x44, 0x28, 0x7F],
    [0x38, 0x54, 0x54, 0x54, 0x18], [0x00, 0x08, 0x7E, 0x09, 0x02],
    [0x18, 0xA4, 0xA4, 0x9C, 0x78], [0x7F, 0x08, 0x04, 0x04, 0x78],
    [0x00, 0x44, 0x7D, 0x40, 0x00], [0x20, 0x40, 0x40, 0x3D, 0x00],
    [0x7F, 0x10, 0x28, 0x44, 0x00], [0x00, 0x41, 0x7F, 0x40, 0x00],
    [0x7C, 0x04, 0x78, 0x04, 0x78], [0x7C, 0x08, 0x04, 0x04, 0x78],
    [0x38, 0x44, 0x44, 0x44, 0x38], [0xFC, 0x18, 0x24, 0x24, 0x18],
    [0x18, 0x24, 0x24, 0x18, 0xFC], [0x7C, 0x08, 0x04, 0x04, 0x08],
    [0x48, 0x54, 0x54, 0x54, 0x24], [0x04, 0x04, 0x3F, 0x44, 0x24],
    [0x3C, 0x40, 0x40, 0x20, 0x7C], [0x1C, 0x20, 0x40, 0x20, 0x1C],
    [0x3C, 0x40, 0x30, 0x40, 0x3C], [0x44, 0x28, 0x10, 0x28, 0x44],
    [0x4C, 0x90, 0x90, 0x90, 0x7C], [0x44, 0x64, 0x54, 0x4C, 0x44],
    // { | } ~
    [0x00, 0x08, 0x36, 0x41, 0x00], [0x00, 0x00, 0x77, 0x00, 0x00],
    [0x00, 0x41, 0x36, 0x08, 0x00], [0x02, 0x01, 0x02, 0x04, 0x02],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::tca8418::mock::MockBus;

    #[test]
    fn pixels_clip_at_the_edges() {
        let mut oled = Sh1107::new(0x3D);
        oled.set_pixel(127, 63);
        oled.set_pixel(128, 10);
        oled.set_pixel(10, 64);
        assert!(oled.pixel(127, 63));
        assert!(!oled.pixel(128, 10));
        oled.hline(120, 5, 20);
        assert!(oled.pixel(127, 5));
    }

    #[test]
    fn text_advances_one_cell_per_glyph() {
        let mut oled = Sh1107::new(0x3D);
        oled.set_cursor(0, 0);
        oled.print("-1");
        // '-' is a horizontal bar on row 3; '1' starts at x=6.
        assert!(oled.pixel(0, 3));
        assert!(oled.pixel(8, 6));
        assert!(!oled.pixel(5, 3));
    }

    #[test]
    fn flush_writes_every_page() {
        let mut bus = MockBus::default();
        let mut oled = Sh1107::new(0x3D);
        oled.set_pixel(0, 9);
        oled.flush(&mut bus).unwrap();
        let data: Vec<_> = bus
            .writes
            .iter()
            .filter(|(_, w)| w[0] == CTRL_DATA)
            .collect();
        assert_eq!(data.len(), PAGES);
        // y=9 lands in page 1, bit 1
        assert_eq!(data[1].1[1], 0x02);
    }
}
