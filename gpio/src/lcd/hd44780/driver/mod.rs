//! Low-level HD44780 driver interface.
//!
//! See [HD44780Driver] for the command set and [GpioHD44780Driver] for the parallel GPIO bus
//! implementation. Higher-level text handling lives in [LiquidCrystal](super::LiquidCrystal).

mod gpio;

use crate::lcd::hd44780::command::*;
use crate::{GpioError, GpioResult};
pub use gpio::*;
use std::fmt::Debug;

/// The `HD44780Driver` trait composes the controller's instruction bytes.
///
/// Implementations only provide [HD44780Driver::send_command] and [HD44780Driver::send_data]; every
/// other method has a default built on top of those. The controller is write-only from here on, so
/// nothing in this trait reads the busy flag: implementations wait long enough after every transfer
/// instead.
pub trait HD44780Driver: Debug {
    /// Clears the display and sets the cursor to the home position.
    ///
    /// Command: `00000001`.
    /// The controller needs about 1.52 ms before it accepts the next instruction.
    fn clear_display(&mut self) -> GpioResult<()> {
        self.send_command(CLEAR_DISPLAY)
    }

    /// Sets the cursor to the home position and undoes any display shift.
    ///
    /// Command: `0000001?`.
    /// The controller needs about 1.52 ms before it accepts the next instruction.
    fn return_home(&mut self) -> GpioResult<()> {
        self.send_command(RETURN_HOME)
    }

    /// Sends the whole entry mode register.
    ///
    /// Command: `000001IS`.
    /// `I` is `1` when the address counter increments ([ENTRY_LEFT]).
    /// `S` is `1` when the display shifts on every write ([ENTRY_SHIFT_INCREMENT]).
    fn set_entry_mode(&mut self, flags: u8) -> GpioResult<()> {
        self.send_command(ENTRY_MODE_SET | (flags & 0b00000011))
    }

    /// Sends the whole display control register.
    ///
    /// Command: `00001DCB`.
    /// `D` turns the display on, `C` shows the cursor, `B` blinks the character at the cursor.
    fn set_display_control(&mut self, flags: u8) -> GpioResult<()> {
        self.send_command(DISPLAY_CONTROL | (flags & 0b00000111))
    }

    /// Moves the cursor or shifts the whole display by one character.
    ///
    /// Command: `0001DR??`.
    /// `D` is `1` for display shift, `0` for cursor move.
    /// `R` is `1` for right, `0` for left.
    fn cursor_shift(&mut self, display_shift: bool, direction: CursorDirection) -> GpioResult<()> {
        let mut command = CURSOR_SHIFT;
        if display_shift {
            command |= DISPLAY_MOVE;
        }
        if direction == CursorDirection::Right {
            command |= MOVE_RIGHT;
        }
        self.send_command(command)
    }

    /// Sends the whole function set register.
    ///
    /// Command: `001BNF??`.
    /// `B` is `1` for 8-bit data length, `N` for two lines, `F` for 5x10 glyphs.
    fn function_set(&mut self, flags: u8) -> GpioResult<()> {
        self.send_command(FUNCTION_SET | (flags & 0b00011100))
    }

    /// Sets the CGRAM address, where the custom glyph patterns are stored.
    ///
    /// The address is a 6-bit value: 8 glyphs of 8 rows each. If out of bounds, it will return
    /// [GpioError::InvalidArgument].
    fn set_cgram_address(&mut self, address: u8) -> GpioResult<()> {
        if address > 0b00111111 {
            return Err(GpioError::InvalidArgument);
        }
        self.send_command(SET_CGRAM_ADDRESS | address)
    }

    /// Sets the DDRAM address, which positions the cursor.
    ///
    /// The address is a 7-bit value. If out of bounds, it will return [GpioError::InvalidArgument].
    fn set_ddram_address(&mut self, address: u8) -> GpioResult<()> {
        if address > 0b01111111 {
            return Err(GpioError::InvalidArgument);
        }
        self.send_command(SET_DDRAM_ADDRESS | address)
    }

    /// Sends a command to the HD44780 controller.
    /// Sets the RS pin to 0 (command).
    fn send_command(&mut self, command: u8) -> GpioResult<()>;

    /// Sends data to the HD44780 controller.
    /// Sets the RS pin to 1 (data).
    fn send_data(&mut self, data: u8) -> GpioResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Sent(Vec<(bool, u8)>);

    impl HD44780Driver for Sent {
        fn send_command(&mut self, command: u8) -> GpioResult<()> {
            self.0.push((false, command));
            Ok(())
        }

        fn send_data(&mut self, data: u8) -> GpioResult<()> {
            self.0.push((true, data));
            Ok(())
        }
    }

    #[test]
    fn register_commands_keep_only_their_own_bits() {
        let mut driver = Sent::default();
        driver.set_entry_mode(0xFF).unwrap();
        driver.set_display_control(0xFF).unwrap();
        driver.function_set(0xFF).unwrap();
        assert_eq!(
            driver.0,
            vec![(false, 0b00000111), (false, 0b00001111), (false, 0b00111100)]
        );
    }

    #[test]
    fn cursor_shift_encodes_target_and_direction() {
        let mut driver = Sent::default();
        driver.cursor_shift(true, CursorDirection::Left).unwrap();
        driver.cursor_shift(true, CursorDirection::Right).unwrap();
        driver.cursor_shift(false, CursorDirection::Right).unwrap();
        assert_eq!(driver.0, vec![(false, 0x18), (false, 0x1C), (false, 0x14)]);
    }

    #[test]
    fn addresses_out_of_range_are_rejected() {
        let mut driver = Sent::default();
        assert_eq!(driver.set_cgram_address(0x40), Err(GpioError::InvalidArgument));
        assert_eq!(driver.set_ddram_address(0x80), Err(GpioError::InvalidArgument));
        assert!(driver.0.is_empty());

        driver.set_cgram_address(0x3F).unwrap();
        driver.set_ddram_address(0x67).unwrap();
        assert_eq!(driver.0, vec![(false, 0x7F), (false, 0xE7)]);
    }
}
