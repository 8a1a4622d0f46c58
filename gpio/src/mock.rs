//! Recording GPIO and delay doubles.
//!
//! A [BusRecorder] hands out a [RecordingGpio] and a [RecordingDelay] that append to one shared,
//! ordered event log, so pin writes and the waits between them can be checked together. Nothing is
//! driven on real hardware.
use crate::delay::Delay;
use crate::{GpioDriver, GpioError, GpioResult};
use bitvec::vec::BitVec;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A single recorded bus event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BusEvent {
    /// The pin was configured as an output.
    Configure(usize),
    /// The pin was driven to the given level.
    Write { pin: usize, level: bool },
    /// The bus waited for the given amount of microseconds.
    Delay(u32),
}

/// A value latched by the controller on a falling edge of the enable line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Latched {
    /// Level of the register-select line, `false` for commands and `true` for data.
    pub rs: bool,
    /// Data lines read LSb first.
    pub value: u8,
}

#[derive(Clone, Debug, Default)]
pub struct BusRecorder {
    events: Rc<RefCell<Vec<BusEvent>>>,
}

impl BusRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a GPIO driver recording into this log.
    pub fn gpio(&self) -> RecordingGpio {
        RecordingGpio {
            recorder: self.clone(),
            outputs: BitVec::repeat(false, RecordingGpio::PIN_COUNT),
        }
    }

    /// Creates a delay recording into this log. It returns immediately.
    pub fn delay(&self) -> RecordingDelay {
        RecordingDelay {
            recorder: self.clone(),
        }
    }

    fn push(&self, event: BusEvent) {
        self.events.borrow_mut().push(event);
    }

    /// Gets a copy of all events recorded so far.
    pub fn events(&self) -> Vec<BusEvent> {
        self.events.borrow().clone()
    }

    /// Forgets all events recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Gets all recorded delays in microseconds, in order.
    pub fn delays(&self) -> Vec<u32> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                BusEvent::Delay(us) => Some(*us),
                _ => None,
            })
            .collect()
    }

    /// Sums all recorded delays.
    pub fn total_delay_us(&self) -> u64 {
        self.delays().iter().map(|&us| us as u64).sum()
    }

    /// Replays the pin writes and returns every value latched on a falling edge of `enable`.
    ///
    /// `data` lists the data lines LSb first, so pass the 4 upper lines for a 4-bit bus and get one
    /// entry per nibble. Lines never written read as low.
    pub fn latched(&self, rs: usize, enable: usize, data: &[usize]) -> Vec<Latched> {
        let mut levels: HashMap<usize, bool> = HashMap::new();
        let mut latched = Vec::new();

        for event in self.events.borrow().iter() {
            let BusEvent::Write { pin, level } = *event else {
                continue;
            };

            let previous = levels.insert(pin, level).unwrap_or(false);

            if pin == enable && previous && !level {
                let mut value = 0u8;
                for (i, data_pin) in data.iter().enumerate() {
                    if levels.get(data_pin).copied().unwrap_or(false) {
                        value |= 1 << i;
                    }
                }
                latched.push(Latched {
                    rs: levels.get(&rs).copied().unwrap_or(false),
                    value,
                });
            }
        }

        latched
    }

    /// Like [Self::latched], but joins nibble pairs back into bytes when `data` has 4 lines.
    ///
    /// Pairing starts at the first recorded nibble. From power-on that works out: the four reset
    /// nibbles `3 3 3 2` read as `0x33 0x32`.
    pub fn transfers(&self, rs: usize, enable: usize, data: &[usize]) -> Vec<Latched> {
        let latched = self.latched(rs, enable, data);
        if data.len() != 4 {
            return latched;
        }

        latched
            .chunks(2)
            .map(|pair| match pair {
                [high, low] => Latched {
                    rs: high.rs,
                    value: (high.value << 4) | low.value,
                },
                // A trailing half byte stays a nibble
                _ => pair[0],
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct RecordingGpio {
    recorder: BusRecorder,
    outputs: BitVec,
}

impl RecordingGpio {
    const PIN_COUNT: usize = 64;
}

impl GpioDriver for RecordingGpio {
    fn count(&self) -> GpioResult<usize> {
        Ok(Self::PIN_COUNT)
    }

    fn configure_output(&mut self, pin: usize) -> GpioResult<()> {
        if pin >= Self::PIN_COUNT {
            return Err(GpioError::InvalidArgument);
        }
        self.outputs.set(pin, true);
        self.recorder.push(BusEvent::Configure(pin));
        Ok(())
    }

    fn write(&mut self, pin: usize, level: bool) -> GpioResult<()> {
        if pin >= Self::PIN_COUNT || !self.outputs[pin] {
            return Err(GpioError::NotOutput(pin));
        }
        self.recorder.push(BusEvent::Write { pin, level });
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingDelay {
    recorder: BusRecorder,
}

impl Delay for RecordingDelay {
    fn delay_us(&mut self, us: u32) {
        self.recorder.push(BusEvent::Delay(us));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_to_unconfigured_pins_are_rejected() {
        let recorder = BusRecorder::new();
        let mut gpio = recorder.gpio();

        assert_eq!(gpio.write(3, true), Err(GpioError::NotOutput(3)));
        gpio.configure_output(3).unwrap();
        assert_eq!(gpio.write(3, true), Ok(()));
        assert_eq!(
            recorder.events(),
            vec![BusEvent::Configure(3), BusEvent::Write { pin: 3, level: true }]
        );
    }

    #[test]
    fn gpio_and_delay_share_one_log() {
        let recorder = BusRecorder::new();
        let mut gpio = recorder.gpio();
        let mut delay = recorder.delay();

        gpio.configure_output(1).unwrap();
        delay.delay_us(5);
        delay.delay_ms(2);

        assert_eq!(
            recorder.events(),
            vec![BusEvent::Configure(1), BusEvent::Delay(5), BusEvent::Delay(2000)]
        );
        assert_eq!(recorder.total_delay_us(), 2005);

        recorder.clear();
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn latches_on_the_falling_edge_only() {
        let recorder = BusRecorder::new();
        let mut gpio = recorder.gpio();
        for pin in [1, 2, 10, 11] {
            gpio.configure_output(pin).unwrap();
        }

        // rs = 1, e = 2, data = [10, 11]
        gpio.write(1, true).unwrap();
        gpio.write(10, true).unwrap();
        gpio.write(2, true).unwrap();
        // Changing data while E is high must not matter before the falling edge
        gpio.write(11, true).unwrap();
        gpio.write(2, false).unwrap();
        // A second low write is not an edge
        gpio.write(2, false).unwrap();

        assert_eq!(
            recorder.latched(1, 2, &[10, 11]),
            vec![Latched { rs: true, value: 0b11 }]
        );
    }

    #[test]
    fn nibbles_join_into_bytes_high_first() {
        let recorder = BusRecorder::new();
        let mut gpio = recorder.gpio();
        let (rs, e, data) = (1, 2, [10, 11, 12, 13]);
        for pin in [rs, e].into_iter().chain(data) {
            gpio.configure_output(pin).unwrap();
        }

        gpio.write(rs, true).unwrap();
        for nibble in [0x4u8, 0x1] {
            for (bit, &pin) in data.iter().enumerate() {
                gpio.write(pin, (nibble >> bit) & 1 != 0).unwrap();
            }
            gpio.write(e, true).unwrap();
            gpio.write(e, false).unwrap();
        }

        assert_eq!(recorder.latched(rs, e, &data).len(), 2);
        assert_eq!(
            recorder.transfers(rs, e, &data),
            vec![Latched { rs: true, value: b'A' }]
        );
    }
}
