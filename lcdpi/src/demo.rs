use std::thread::sleep;
use std::time::Duration;
use lcdpi_gpio::delay::Delay;
use lcdpi_gpio::lcd::hd44780::{LcdResult, LiquidCrystal};
use lcdpi_gpio::GpioDriver;
use log::{info, warn};
use time::OffsetDateTime;

/// A small bell, slot 0.
const BELL: [u8; 8] = [
    0b00100,
    0b01110,
    0b01110,
    0b01110,
    0b11111,
    0b00000,
    0b00100,
    0b00000,
];

/// Shows off text wrapping, scrolling, the cursor attributes and a custom glyph.
///
/// `pause` is how long every step stays on screen.
pub fn run<G: GpioDriver, D: Delay>(lcd: &mut LiquidCrystal<G, D>, pause: Duration) -> LcdResult<()> {
    info!("Text");
    lcd.print("Hello World!")?;
    lcd.set_cursor(4, 1)?;
    lcd.print("Testing Library!")?;
    // Runs off the right edge onto the next row
    lcd.set_cursor(18, 2)?;
    lcd.print("Testing new line")?;
    sleep(pause);
    lcd.clear()?;

    info!("Scrolling");
    lcd.set_cursor(0, 0)?;
    lcd.print("Scroll left!!")?;
    lcd.scroll_display_left()?;
    sleep(pause);
    lcd.scroll_display_right()?;

    lcd.set_cursor(0, 0)?;
    lcd.clear()?;
    lcd.print("Scroll Right!!")?;
    lcd.scroll_display_right()?;
    sleep(pause);
    lcd.scroll_display_left()?;
    sleep(pause);
    lcd.clear()?;

    info!("Blink & cursor");
    lcd.set_cursor(0, 0)?;
    lcd.blink()?;
    sleep(pause);
    lcd.no_blink()?;
    sleep(pause);
    lcd.cursor()?;
    sleep(pause);
    lcd.no_cursor()?;
    sleep(pause);
    lcd.clear()?;

    info!("Custom glyph");
    lcd.create_char(0, &BELL)?;
    lcd.set_cursor(0, 0)?;
    lcd.print_glyph(0)?;
    lcd.print(" Ding")?;
    lcd.set_cursor(0, 1)?;
    print_time(lcd)?;
    sleep(pause);
    lcd.clear()?;

    // clear keeps the logical cursor
    lcd.set_cursor(0, 0)?;
    lcd.print("Test finished!")?;
    Ok(())
}

fn print_time<G: GpioDriver, D: Delay>(lcd: &mut LiquidCrystal<G, D>) -> LcdResult<()> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|err| {
        warn!("Local offset unavailable ({}), showing UTC", err);
        OffsetDateTime::now_utc()
    });

    let text = format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second());
    lcd.print(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcdpi_gpio::lcd::hd44780::{CharSize, DisplayGeometry, PinAssignment};
    use lcdpi_gpio::mock::BusRecorder;

    #[test]
    fn demo_ends_with_the_final_message() {
        let recorder = BusRecorder::new();
        let mut lcd = LiquidCrystal::new(
            PinAssignment::four_bit(17, 16, [21, 20, 19, 18]),
            DisplayGeometry::W20xH04,
            recorder.gpio(),
            recorder.delay(),
        );
        lcd.init(CharSize::Dots5x8).unwrap();

        run(&mut lcd, Duration::ZERO).unwrap();

        assert_eq!(lcd.cursor_position(), (14, 0));
        let transfers = recorder.transfers(17, 16, &[21, 20, 19, 18]);
        let tail: Vec<(bool, u8)> = transfers[transfers.len() - 16..]
            .iter()
            .map(|t| (t.rs, t.value))
            .collect();

        // The final message starts over at (0, 0) even though clear keeps the cursor
        let mut expected = vec![(false, 0x80)];
        expected.extend(b"Test finished!".iter().map(|&c| (true, c)));
        expected.push((false, 0x80 | 14));
        assert_eq!(tail, expected);
    }
}
