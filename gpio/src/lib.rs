pub mod delay;
pub mod gpiod;
pub mod lcd;
pub mod mock;
pub mod raw;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("pin already in use")]
    AlreadyInUse,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("the feature is not supported on this backend")]
    NotSupported,
    #[error("pin {0} is not configured as an output")]
    NotOutput(usize),
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        GpioError::Io(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

/// Output-only access to the GPIO pins of a chip, addressed by pin number.
///
/// This is all the LCD driver needs from the platform: it never reads a line back.
pub trait GpioDriver: Debug {
    /// Gets the amount of GPIO pins available.
    fn count(&self) -> GpioResult<usize>;

    /// Sets the GPIO pin function to output.
    ///
    /// Configuring a pin that is already an output of this driver is a no-op.
    fn configure_output(&mut self, pin: usize) -> GpioResult<()>;

    /// Drives the GPIO pin high (`true`) or low (`false`).
    ///
    /// # Errors
    /// - `GpioError::NotOutput` if the pin was not configured with [GpioDriver::configure_output].
    fn write(&mut self, pin: usize, level: bool) -> GpioResult<()>;
}

impl<T: GpioDriver + ?Sized> GpioDriver for &mut T {
    fn count(&self) -> GpioResult<usize> {
        (**self).count()
    }

    fn configure_output(&mut self, pin: usize) -> GpioResult<()> {
        (**self).configure_output(pin)
    }

    fn write(&mut self, pin: usize, level: bool) -> GpioResult<()> {
        (**self).write(pin, level)
    }
}

impl<T: GpioDriver + ?Sized> GpioDriver for Box<T> {
    fn count(&self) -> GpioResult<usize> {
        (**self).count()
    }

    fn configure_output(&mut self, pin: usize) -> GpioResult<()> {
        (**self).configure_output(pin)
    }

    fn write(&mut self, pin: usize, level: bool) -> GpioResult<()> {
        (**self).write(pin, level)
    }
}
