//! HD44780 instruction set.
//!
//! Every instruction is a single byte whose highest set bit selects the instruction, the bits below
//! it being the parameters. The flag constants are OR-ed into the instruction byte.

/// Clears DDRAM and sets the address counter to 0. Needs about 1.52 ms.
pub const CLEAR_DISPLAY: u8 = 0b00000001;
/// Sets the address counter to 0 and undoes any display shift. Needs about 1.52 ms.
pub const RETURN_HOME: u8 = 0b00000010;
/// Command: `000001IS`.
pub const ENTRY_MODE_SET: u8 = 0b00000100;
/// Command: `00001DCB`.
pub const DISPLAY_CONTROL: u8 = 0b00001000;
/// Command: `0001SR??`.
pub const CURSOR_SHIFT: u8 = 0b00010000;
/// Command: `001DNF??`.
pub const FUNCTION_SET: u8 = 0b00100000;
/// Command: `01AAAAAA`.
pub const SET_CGRAM_ADDRESS: u8 = 0b01000000;
/// Command: `1AAAAAAA`.
pub const SET_DDRAM_ADDRESS: u8 = 0b10000000;

// Entry mode flags
/// `I`: the address counter increments, text runs left to right.
pub const ENTRY_LEFT: u8 = 0b00000010;
/// `I` cleared: the address counter decrements, text runs right to left.
pub const ENTRY_RIGHT: u8 = 0b00000000;
/// `S`: the display shifts on every write (autoscroll).
pub const ENTRY_SHIFT_INCREMENT: u8 = 0b00000001;
pub const ENTRY_SHIFT_DECREMENT: u8 = 0b00000000;

// Display control flags
pub const DISPLAY_ON: u8 = 0b00000100;
pub const DISPLAY_OFF: u8 = 0b00000000;
pub const CURSOR_ON: u8 = 0b00000010;
pub const CURSOR_OFF: u8 = 0b00000000;
pub const BLINK_ON: u8 = 0b00000001;
pub const BLINK_OFF: u8 = 0b00000000;

// Cursor/display shift flags
pub const DISPLAY_MOVE: u8 = 0b00001000;
pub const CURSOR_MOVE: u8 = 0b00000000;
pub const MOVE_RIGHT: u8 = 0b00000100;
pub const MOVE_LEFT: u8 = 0b00000000;

// Function set flags
pub const EIGHT_BIT_MODE: u8 = 0b00010000;
pub const FOUR_BIT_MODE: u8 = 0b00000000;
/// Two-line mode. Four-line displays are two-line displays wrapped in half.
pub const TWO_LINE: u8 = 0b00001000;
pub const ONE_LINE: u8 = 0b00000000;
pub const DOTS_5X10: u8 = 0b00000100;
pub const DOTS_5X8: u8 = 0b00000000;

/// Direction of a cursor or display shift.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves towards lower addresses.
    Left,
    /// Moves towards higher addresses.
    Right,
}

/// Glyph height selected by the function set command.
///
/// 5x10 glyphs only work on single-line displays, the controller ignores the bit otherwise.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CharSize {
    #[default]
    Dots5x8,
    Dots5x10,
}

impl CharSize {
    /// Converts the glyph size to a mask byte for the function set command.
    pub fn to_mask(&self) -> u8 {
        match self {
            CharSize::Dots5x8 => DOTS_5X8,
            CharSize::Dots5x10 => DOTS_5X10,
        }
    }
}
