//! Keypad event decoding (TCA8418 4×4 matrix).
//!
//! The controller reports key events as a single byte (datasheet table 1):
//! bit 7 is set on press and clear on release, and the low seven bits are a
//! 1-based key number `row * 10 + col + 1`.
//!
//! The board wires the matrix transposed relative to the controller's
//! numbering, so the symbol is looked up as `KEYMAP[col][row]`.

/// Matrix dimensions.
pub const ROWS: usize = 4;
pub const COLS: usize = 4;

/// Symbols printed on the keypad.
pub const KEYMAP: [[char; COLS]; ROWS] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// One decoded key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub row: u8,
    pub col: u8,
    pub symbol: char,
    pub pressed: bool,
}

/// Decode a raw controller event.  Returns `None` for key number 0 and for
/// positions outside the 4×4 matrix.
pub fn decode(code: u8) -> Option<KeyEvent> {
    let pressed = code & 0x80 != 0;
    let key = (code & 0x7F).checked_sub(1)?;
    let row = key / 10;
    let col = key % 10;
    if usize::from(row) >= ROWS || usize::from(col) >= COLS {
        return None;
    }
    Some(KeyEvent {
        row,
        col,
        symbol: KEYMAP[usize::from(col)][usize::from(row)],
        pressed,
    })
}

/// What a key press asks the device to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// `A`: scroll up.
    PreviousPage,
    /// `B`: scroll down.
    NextPage,
    /// `#`: flip the climate sensing toggle.
    ToggleSensing,
    /// Any other key.
    Unmapped(char),
}

impl KeyAction {
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            'A' => Self::PreviousPage,
            'B' => Self::NextPage,
            '#' => Self::ToggleSensing,
            other => Self::Unmapped(other),
        }
    }
}
