//! HD44780 character LCD module.
//!
//! The controller is driven write-only over a parallel bus: R/W is tied to ground, so the busy flag
//! is never polled and every instruction is followed by a fixed wait instead.
//!
//! - [command] has the instruction bytes and their flags.
//! - [driver] sends single instructions and data bytes over GPIO.
//! - [LiquidCrystal] keeps the controller's registers and the cursor in memory and offers text output
//!   on top of it.
//!
//! # Sources
//!
//! - Hitachi, [“HD44780U (LCD-II) Dot Matrix Liquid Crystal Display Controller/Driver,”](https://www.sparkfun.com/datasheets/LCD/HD44780.pdf)
//!   ADE-207-272(Z), 1998.

pub mod command;
pub mod driver;
mod display;
mod geometry;
mod pins;

pub use command::{CharSize, CursorDirection};
use crate::GpioError;
pub use display::*;
pub use geometry::*;
pub use pins::*;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),
    #[error("the controller has not been initialized")]
    NotInitialized,
}

pub type LcdResult<T> = Result<T, LcdError>;
