//! GpiodDriver implementation for driving GPIO pins through the Linux GPIO character device.
use crate::{GpioDriver, GpioError, GpioResult};
use log::trace;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

/// GpiodDriver is a GPIO driver that uses the gpiod library to manage GPIO pins.
///
/// Every configured pin holds its own requested line for as long as the driver lives; the kernel
/// releases the lines when the driver is dropped.
pub struct GpiodDriver {
    chip: gpiod::Chip,
    outputs: HashMap<usize, gpiod::Lines<gpiod::Output>>,
}

impl GpiodDriver {
    pub fn new(chip: gpiod::Chip) -> Self {
        Self {
            chip,
            outputs: HashMap::new(),
        }
    }

    /// Opens the chip at the given path, e.g. `/dev/gpiochip0`.
    pub fn open(path: &str) -> GpioResult<Self> {
        Ok(Self::new(gpiod::Chip::new(path)?))
    }
}

impl Debug for GpiodDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpiodDriver({})", self.chip.name())
    }
}

impl GpioDriver for GpiodDriver {
    fn count(&self) -> GpioResult<usize> {
        Ok(self.chip.num_lines() as usize)
    }

    fn configure_output(&mut self, pin: usize) -> GpioResult<()> {
        if pin >= self.count()? {
            return Err(GpioError::InvalidArgument);
        }

        if self.outputs.contains_key(&pin) {
            return Ok(());
        }

        let line = self.chip.request_lines(
            gpiod::Options::output([pin as u32])
                .consumer(env!("CARGO_PKG_NAME")),
        )?;
        trace!("{:?}[{}] requested as output", self, pin);
        self.outputs.insert(pin, line);
        Ok(())
    }

    fn write(&mut self, pin: usize, level: bool) -> GpioResult<()> {
        let line = self.outputs.get(&pin).ok_or(GpioError::NotOutput(pin))?;
        line.set_values([level])?;
        Ok(())
    }
}
