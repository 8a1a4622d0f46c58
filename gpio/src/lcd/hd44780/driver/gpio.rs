use crate::delay::Delay;
use crate::lcd::hd44780::driver::HD44780Driver;
use crate::lcd::hd44780::{BusWidth, PinAssignment};
use crate::{GpioDriver, GpioResult};
use log::trace;

/// GpioHD44780Driver drives an HD44780 controller over a parallel 4-bit or 8-bit GPIO bus.
///
/// Every transfer puts the value on the data lines and then pulses E: low for 1 µs, high for 1 µs,
/// then low again followed by 100 µs for the controller to execute the instruction. That covers every
/// instruction except clear display and return home, which need an extra wait by the caller.
#[derive(Debug)]
pub struct GpioHD44780Driver<G: GpioDriver, D: Delay> {
    pins: PinAssignment,
    bus_width: BusWidth,
    gpio: G,
    delay: D,
}

impl<G: GpioDriver, D: Delay> GpioHD44780Driver<G, D> {
    const ENABLE_PULSE_US: u32 = 1;
    const EXECUTION_US: u32 = 100;

    /// Creates the driver. Nothing is written to the pins until [Self::configure_pins].
    pub fn new(pins: PinAssignment, gpio: G, delay: D) -> Self {
        GpioHD44780Driver {
            bus_width: pins.bus_width(),
            pins,
            gpio,
            delay,
        }
    }

    pub fn pins(&self) -> &PinAssignment {
        &self.pins
    }

    pub fn bus_width(&self) -> BusWidth {
        self.bus_width
    }

    /// Gives the GPIO and delay back.
    pub fn release(self) -> (G, D) {
        (self.gpio, self.delay)
    }

    /// Configures RS, E and the wired data lines as outputs. On a 4-bit bus only D4..D7 are touched.
    pub fn configure_pins(&mut self) -> GpioResult<()> {
        self.gpio.configure_output(self.pins.register_select)?;
        self.gpio.configure_output(self.pins.enable)?;

        let first = match self.bus_width {
            BusWidth::FourBit => 4,
            BusWidth::EightBit => 0,
        };
        for &pin in &self.pins.data_lines()[first..] {
            self.gpio.configure_output(pin)?;
        }
        Ok(())
    }

    /// Drives RS and E low.
    pub fn idle_control_lines(&mut self) -> GpioResult<()> {
        self.gpio.write(self.pins.register_select, false)?;
        self.gpio.write(self.pins.enable, false)?;
        Ok(())
    }

    pub fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn pulse_enable(&mut self) -> GpioResult<()> {
        self.gpio.write(self.pins.enable, false)?;
        self.delay.delay_us(Self::ENABLE_PULSE_US);
        self.gpio.write(self.pins.enable, true)?;
        self.delay.delay_us(Self::ENABLE_PULSE_US);
        self.gpio.write(self.pins.enable, false)?;
        self.delay.delay_us(Self::EXECUTION_US);
        Ok(())
    }

    /// Drives bits 0..3 of `value` onto D4..D7 and latches them.
    pub fn write_nibble(&mut self, value: u8) -> GpioResult<()> {
        trace!("Writing nibble: {:04b}", value & 0x0F);
        let lines = self.pins.data_lines();
        for (bit, &pin) in lines[4..].iter().enumerate() {
            self.gpio.write(pin, (value >> bit) & 1 != 0)?;
        }
        self.pulse_enable()
    }

    /// Drives bits 0..7 of `value` onto D0..D7 and latches them.
    pub fn write_byte(&mut self, value: u8) -> GpioResult<()> {
        trace!("Writing byte: {:08b}", value);
        let lines = self.pins.data_lines();
        for (bit, &pin) in lines.iter().enumerate() {
            self.gpio.write(pin, (value >> bit) & 1 != 0)?;
        }
        self.pulse_enable()
    }

    fn send(&mut self, data: u8, rs: bool) -> GpioResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        self.gpio.write(self.pins.register_select, rs)?;

        match self.bus_width {
            BusWidth::EightBit => self.write_byte(data),
            BusWidth::FourBit => {
                self.write_nibble(data >> 4)?;
                self.write_nibble(data & 0x0F)
            }
        }
    }
}

impl<G: GpioDriver, D: Delay> HD44780Driver for GpioHD44780Driver<G, D> {
    fn send_command(&mut self, command: u8) -> GpioResult<()> {
        self.send(command, false)
    }

    fn send_data(&mut self, data: u8) -> GpioResult<()> {
        self.send(data, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusEvent, BusRecorder, RecordingDelay, RecordingGpio};
    use BusEvent::{Delay as Wait, Write};

    const RS: usize = 17;
    const E: usize = 16;

    fn driver(pins: PinAssignment) -> (BusRecorder, GpioHD44780Driver<RecordingGpio, RecordingDelay>) {
        let recorder = BusRecorder::new();
        let mut driver = GpioHD44780Driver::new(pins, recorder.gpio(), recorder.delay());
        driver.configure_pins().unwrap();
        recorder.clear();
        (recorder, driver)
    }

    #[test]
    fn four_bit_bus_configures_only_the_upper_lines() {
        let recorder = BusRecorder::new();
        let mut driver = GpioHD44780Driver::new(
            PinAssignment::four_bit(RS, E, [21, 20, 19, 18]),
            recorder.gpio(),
            recorder.delay(),
        );
        driver.configure_pins().unwrap();
        assert_eq!(
            recorder.events(),
            [RS, E, 21, 20, 19, 18].map(BusEvent::Configure).to_vec()
        );
    }

    #[test]
    fn nibble_is_driven_lsb_first_then_latched() {
        let (recorder, mut driver) = driver(PinAssignment::four_bit(RS, E, [21, 20, 19, 18]));
        driver.write_nibble(0b1010).unwrap();
        assert_eq!(
            recorder.events(),
            vec![
                Write { pin: 21, level: false },
                Write { pin: 20, level: true },
                Write { pin: 19, level: false },
                Write { pin: 18, level: true },
                Write { pin: E, level: false },
                Wait(1),
                Write { pin: E, level: true },
                Wait(1),
                Write { pin: E, level: false },
                Wait(100),
            ]
        );
    }

    #[test]
    fn four_bit_send_splits_high_nibble_first() {
        let (recorder, mut driver) = driver(PinAssignment::four_bit(RS, E, [21, 20, 19, 18]));
        driver.send_data(b'A').unwrap();

        assert_eq!(recorder.events()[0], Write { pin: RS, level: true });
        let nibbles: Vec<u8> = recorder
            .latched(RS, E, &[21, 20, 19, 18])
            .iter()
            .map(|latched| latched.value)
            .collect();
        assert_eq!(nibbles, vec![0x4, 0x1]);
    }

    #[test]
    fn eight_bit_send_is_one_transfer() {
        let data = [2, 3, 4, 5, 6, 7, 8, 9];
        let (recorder, mut driver) = driver(PinAssignment::eight_bit(RS, E, data));
        driver.send_command(0x38).unwrap();

        let latched = recorder.latched(RS, E, &data);
        assert_eq!(latched.len(), 1);
        assert!(!latched[0].rs);
        assert_eq!(latched[0].value, 0x38);
        assert_eq!(recorder.delays(), vec![1, 1, 100]);
    }
}
