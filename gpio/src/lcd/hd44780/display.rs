use crate::delay::Delay;
use crate::lcd::hd44780::command::*;
use crate::lcd::hd44780::driver::{GpioHD44780Driver, HD44780Driver};
use crate::lcd::hd44780::{BusWidth, DisplayGeometry, LcdError, LcdResult, PinAssignment};
use crate::GpioDriver;
use log::{debug, info, trace, warn};
use std::fmt;

/// In-memory copies of the controller registers.
///
/// The controller cannot be read back, and every register is written as a whole byte, so these are
/// the only record of which bits are set.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ControllerState {
    /// Bus width, line count and glyph height. Written once by [LiquidCrystal::init].
    pub function_set: u8,
    /// Display, cursor and blink bits.
    pub display_control: u8,
    /// Text direction and autoscroll bits.
    pub entry_mode: u8,
}

/// A character LCD driven by an HD44780 over a parallel GPIO bus.
///
/// Tracks the cursor as a (column, row) pair and translates it into DDRAM addresses, wrapping text
/// onto the following row when it reaches the right edge.
///
/// [LiquidCrystal::init] has to be called once before anything else; until then every operation
/// returns [LcdError::NotInitialized].
#[derive(Debug)]
pub struct LiquidCrystal<G: GpioDriver, D: Delay> {
    bus: GpioHD44780Driver<G, D>,
    geometry: DisplayGeometry,
    row_offsets: [u8; 4],
    state: ControllerState,
    column: u8,
    row: u8,
    initialized: bool,
}

impl<G: GpioDriver, D: Delay> LiquidCrystal<G, D> {
    const POWER_ON_US: u32 = 50_000;
    const RESET_US: u32 = 4_500;
    const RESET_LAST_US: u32 = 150;
    const CLEAR_HOME_US: u32 = 2_000;

    pub fn new(pins: PinAssignment, geometry: DisplayGeometry, gpio: G, delay: D) -> Self {
        LiquidCrystal {
            bus: GpioHD44780Driver::new(pins, gpio, delay),
            geometry,
            row_offsets: geometry.row_offsets(),
            state: ControllerState::default(),
            column: 0,
            row: 0,
            initialized: false,
        }
    }

    /// Brings the controller up from an unknown power-on state.
    ///
    /// The controller may start in 8-bit or 4-bit mode, possibly halfway through a byte. Sending the
    /// function set three times with decreasing waits resynchronizes it, after which a 4-bit bus
    /// switches the controller over with a single `0010` nibble. The display is then turned on with
    /// the cursor hidden, cleared, and set to left-to-right text without autoscroll.
    pub fn init(&mut self, char_size: CharSize) -> LcdResult<()> {
        if self.initialized {
            warn!("Controller already initialized, running the bring-up again");
            self.initialized = false;
        }

        let bus_width = self.bus.bus_width();
        let mut function_set = FOUR_BIT_MODE | ONE_LINE | char_size.to_mask();
        if bus_width == BusWidth::EightBit {
            function_set |= EIGHT_BIT_MODE;
        }
        // 4-line displays are 2-line displays to the controller
        if self.geometry.height() > 1 {
            function_set |= TWO_LINE;
        }
        self.state.function_set = function_set;
        self.row_offsets = self.geometry.row_offsets();

        debug!(
            "Initializing {:?} on a {:?} bus, function set {:08b}",
            self.geometry, bus_width, function_set
        );

        self.bus.configure_pins()?;
        self.bus.delay_us(Self::POWER_ON_US);
        self.bus.idle_control_lines()?;

        let reset_waits = [Self::RESET_US, Self::RESET_US, Self::RESET_LAST_US];
        match bus_width {
            BusWidth::FourBit => {
                for wait in reset_waits {
                    self.bus.write_nibble(0x03)?;
                    self.bus.delay_us(wait);
                }
                self.bus.write_nibble(0x02)?;
            }
            BusWidth::EightBit => {
                for wait in reset_waits {
                    self.bus.function_set(function_set)?;
                    self.bus.delay_us(wait);
                }
            }
        }

        self.bus.function_set(function_set)?;

        self.state.display_control = DISPLAY_ON | CURSOR_OFF | BLINK_OFF;
        self.bus.set_display_control(self.state.display_control)?;
        self.bus.clear_display()?;
        self.bus.delay_us(Self::CLEAR_HOME_US);

        self.state.entry_mode = ENTRY_LEFT | ENTRY_SHIFT_DECREMENT;
        self.bus.set_entry_mode(self.state.entry_mode)?;

        self.column = 0;
        self.row = 0;
        self.initialized = true;
        info!("{:?} LCD initialized.", self.geometry);
        Ok(())
    }

    fn ensure_initialized(&self) -> LcdResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(LcdError::NotInitialized)
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    pub fn width(&self) -> u8 {
        self.geometry.width()
    }

    pub fn height(&self) -> u8 {
        self.geometry.height()
    }

    pub fn bus_width(&self) -> BusWidth {
        self.bus.bus_width()
    }

    pub fn row_offsets(&self) -> [u8; 4] {
        self.row_offsets
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The logical cursor as (column, row).
    pub fn cursor_position(&self) -> (u8, u8) {
        (self.column, self.row)
    }

    /// Gives the GPIO and delay back.
    pub fn release(self) -> (G, D) {
        self.bus.release()
    }

    /// Clears the display.
    ///
    /// The logical cursor is kept: the next [Self::print] continues where the previous one stopped.
    /// Call [Self::set_cursor] to start over at (0, 0).
    pub fn clear(&mut self) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.bus.clear_display()?;
        self.bus.delay_us(Self::CLEAR_HOME_US);
        Ok(())
    }

    /// Undoes scrolling and moves the controller's address counter to 0, keeping the display
    /// contents. Like [Self::clear], the logical cursor is kept.
    pub fn home(&mut self) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.bus.return_home()?;
        self.bus.delay_us(Self::CLEAR_HOME_US);
        Ok(())
    }

    fn clamp(&self, column: u8, row: u8) -> (u8, u8) {
        // Clamps to the boundary itself: (width, height) stays addressable one past the last cell
        (column.min(self.width()), row.min(self.height()))
    }

    /// DDRAM address of the cell at (column, row), clamped the same way as [Self::set_cursor].
    pub fn ddram_address(&self, column: u8, row: u8) -> u8 {
        let (column, row) = self.clamp(column, row);
        let last = self.row_offsets.len() - 1;
        column + self.row_offsets[(row as usize).min(last)]
    }

    /// Moves the cursor to (column, row).
    ///
    /// Out-of-range values are clamped to `width` and `height`, not to the last cell.
    pub fn set_cursor(&mut self, column: u8, row: u8) -> LcdResult<()> {
        self.ensure_initialized()?;

        let (clamped_column, clamped_row) = self.clamp(column, row);
        if (clamped_column, clamped_row) != (column, row) {
            debug!(
                "Cursor ({}, {}) clamped to ({}, {})",
                column, row, clamped_column, clamped_row
            );
        }

        self.column = clamped_column;
        self.row = clamped_row;
        let address = self.ddram_address(clamped_column, clamped_row);
        self.bus.set_ddram_address(address)?;
        Ok(())
    }

    /// Advances the cursor by one column.
    ///
    /// At the right edge the column wraps to 0 and, unless `same_line` is set, the row advances,
    /// wrapping from the last row to the first. The controller is only told about the new position
    /// when a wrap happens, otherwise its own address counter has already moved.
    pub fn move_cursor(&mut self, same_line: bool) -> LcdResult<()> {
        self.ensure_initialized()?;

        self.column = self.column.saturating_add(1);
        if self.column >= self.width() {
            self.column = 0;

            if !same_line {
                self.row += 1;
                if self.row >= self.height() {
                    self.row = 0;
                }
            }

            self.set_cursor(self.column, self.row)?;
        }
        Ok(())
    }

    fn glyph_for(c: char) -> u8 {
        if c.is_ascii() {
            c as u8
        } else {
            warn!("Non-ASCII character: {}", c);
            b'?'
        }
    }

    fn print_with(&mut self, text: &str, same_line: bool) -> LcdResult<()> {
        self.set_cursor(self.column, self.row)?;

        for c in text.chars() {
            self.bus.send_data(Self::glyph_for(c))?;
            self.move_cursor(same_line)?;
        }

        // Resync in case the controller's address counter went its own way
        self.set_cursor(self.column, self.row)
    }

    /// Prints text at the cursor, wrapping onto the next row at the right edge.
    ///
    /// Non-ASCII characters are printed as `?`.
    pub fn print(&mut self, text: &str) -> LcdResult<()> {
        self.print_with(text, false)
    }

    /// Prints text at the cursor without ever leaving the current row: past the right edge the text
    /// continues over column 0 of the same row.
    pub fn print_in_line(&mut self, text: &str) -> LcdResult<()> {
        self.print_with(text, true)
    }

    /// Prints a single glyph code, e.g. a custom character slot `0..=7`.
    ///
    /// The column advances by one without wrapping.
    pub fn print_glyph(&mut self, code: u8) -> LcdResult<()> {
        self.set_cursor(self.column, self.row)?;
        self.bus.send_data(code)?;
        self.column = self.column.saturating_add(1);
        self.set_cursor(self.column, self.row)
    }

    /// Prints glyph codes one by one with [Self::print_glyph], stopping at the first `0`.
    pub fn print_glyphs(&mut self, codes: &[u8]) -> LcdResult<()> {
        for &code in codes.iter().take_while(|&&code| code != 0) {
            self.print_glyph(code)?;
        }
        Ok(())
    }

    /// Same as [Self::print_glyphs], but takes the buffer and frees it once written.
    pub fn print_glyphs_owned(&mut self, codes: Vec<u8>) -> LcdResult<()> {
        self.print_glyphs(&codes)
    }

    fn update_display_control(&mut self, flag: u8, on: bool) -> LcdResult<()> {
        self.ensure_initialized()?;
        if on {
            self.state.display_control |= flag;
        } else {
            self.state.display_control &= !flag;
        }
        trace!("Display control: {:03b}", self.state.display_control);
        self.bus.set_display_control(self.state.display_control)?;
        Ok(())
    }

    fn update_entry_mode(&mut self, flag: u8, on: bool) -> LcdResult<()> {
        self.ensure_initialized()?;
        if on {
            self.state.entry_mode |= flag;
        } else {
            self.state.entry_mode &= !flag;
        }
        trace!("Entry mode: {:02b}", self.state.entry_mode);
        self.bus.set_entry_mode(self.state.entry_mode)?;
        Ok(())
    }

    /// Turns the display off. DDRAM keeps its contents.
    pub fn no_display(&mut self) -> LcdResult<()> {
        self.update_display_control(DISPLAY_ON, false)
    }

    pub fn display(&mut self) -> LcdResult<()> {
        self.update_display_control(DISPLAY_ON, true)
    }

    pub fn no_cursor(&mut self) -> LcdResult<()> {
        self.update_display_control(CURSOR_ON, false)
    }

    /// Shows the underline cursor.
    pub fn cursor(&mut self) -> LcdResult<()> {
        self.update_display_control(CURSOR_ON, true)
    }

    pub fn no_blink(&mut self) -> LcdResult<()> {
        self.update_display_control(BLINK_ON, false)
    }

    /// Blinks the whole character cell at the cursor.
    pub fn blink(&mut self) -> LcdResult<()> {
        self.update_display_control(BLINK_ON, true)
    }

    /// Shifts the whole display one character to the left without changing DDRAM.
    pub fn scroll_display_left(&mut self) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.bus.cursor_shift(true, CursorDirection::Left)?;
        Ok(())
    }

    /// Shifts the whole display one character to the right without changing DDRAM.
    pub fn scroll_display_right(&mut self) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.bus.cursor_shift(true, CursorDirection::Right)?;
        Ok(())
    }

    pub fn left_to_right(&mut self) -> LcdResult<()> {
        self.update_entry_mode(ENTRY_LEFT, true)
    }

    pub fn right_to_left(&mut self) -> LcdResult<()> {
        self.update_entry_mode(ENTRY_LEFT, false)
    }

    /// Makes the display shift on every written character, so the cursor seems to stand still.
    pub fn autoscroll(&mut self) -> LcdResult<()> {
        self.update_entry_mode(ENTRY_SHIFT_INCREMENT, true)
    }

    pub fn no_autoscroll(&mut self) -> LcdResult<()> {
        self.update_entry_mode(ENTRY_SHIFT_INCREMENT, false)
    }

    /// Uploads a custom 5x8 glyph into one of the 8 CGRAM slots, one byte per row, top row first.
    ///
    /// `location` is taken modulo 8. Print the glyph with [Self::print_glyph] using the slot number.
    pub fn create_char(&mut self, location: u8, charmap: &[u8; 8]) -> LcdResult<()> {
        self.ensure_initialized()?;
        let location = location & 0x7;
        self.bus.set_cgram_address(location << 3)?;
        for &row in charmap {
            self.bus.send_data(row)?;
        }
        Ok(())
    }

    /// Sends a raw instruction byte. The in-memory registers and cursor are not updated.
    pub fn command(&mut self, value: u8) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.bus.send_command(value)?;
        Ok(())
    }

    /// Sends a raw data byte at the controller's current address. The cursor is not updated.
    pub fn write(&mut self, value: u8) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.bus.send_data(value)?;
        Ok(())
    }
}

impl<G: GpioDriver, D: Delay> fmt::Write for LiquidCrystal<G, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s).map_err(|_| fmt::Error)
    }
}
