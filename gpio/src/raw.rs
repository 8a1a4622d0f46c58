//! Memory-mapped GPIO driver for the BCM283x/BCM2711 GPIO block.
//!
//! Needs read/write access to `/dev/gpiomem` (usually granted to the `gpio` group) or to `/dev/mem`
//! (root).
use crate::{GpioDriver, GpioError, GpioResult};
use bitvec::vec::BitVec;
use log::trace;
use memmap2::{MmapOptions, MmapRaw};
use std::fmt::{Debug, Formatter};
use std::fs::OpenOptions;

/// Pin function values of the `GPFSELn` registers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum PinFunction {
    Input = 0b000,
    Output = 0b001,
}

pub struct RawGpioDriver {
    mmap: MmapRaw,
    output_pins: BitVec,
}

impl RawGpioDriver {
    // 0x7e200000 is the bus address, the ARM physical address differs per SoC
    // #[cfg(target_pointer_width = "64")]
    // const GPIO_BASE: u32 = 0xFE200000;
    const GPIO_BASE: u32 = 0x3F200000;

    const PIN_COUNT: usize = 58;

    /// `/dev/gpiomem` maps the GPIO block at offset 0.
    fn create(path: &str, offset: u64) -> GpioResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)?;

        let mmap = MmapOptions::new()
            .offset(offset)
            .len(4096)
            .map_raw(&file)?;

        Ok(RawGpioDriver {
            mmap,
            output_pins: BitVec::repeat(false, Self::PIN_COUNT),
        })
    }

    pub fn new_gpiomem() -> GpioResult<Self> {
        Self::create("/dev/gpiomem", 0)
    }

    pub fn new_mem() -> GpioResult<Self> {
        Self::create("/dev/mem", Self::GPIO_BASE as u64)
    }

    fn check_index(pin_index: usize) -> GpioResult<()> {
        if pin_index >= Self::PIN_COUNT {
            return Err(GpioError::InvalidArgument);
        }
        Ok(())
    }

    pub fn raw_set_pin_function(&self, pin_index: usize, function: PinFunction) -> GpioResult<()> {
        Self::check_index(pin_index)?;

        let mmap = self.mmap.as_mut_ptr() as *mut u32;
        // GPFSELn register
        let register_ptr = unsafe { mmap.add(pin_index / 10) };
        let shift = (pin_index % 10) * 3;

        let mut register_value = unsafe { register_ptr.read_volatile() };
        register_value &= !(0b111 << shift); // Clear the bits for this pin
        register_value |= (function as u32) << shift;
        unsafe { register_ptr.write_volatile(register_value) };

        trace!("Set pin function: pin_index={} function={:?}", pin_index, function);

        Ok(())
    }

    pub(crate) fn raw_set_pin_output(&self, pin_index: usize, high: bool) -> GpioResult<()> {
        Self::check_index(pin_index)?;

        let mmap = self.mmap.as_mut_ptr() as *mut u32;
        // GPSETn/GPCLRn register
        let register_ptr = unsafe { mmap.add(if high { 0x1c / 4 } else { 0x28 / 4 } + pin_index / 32) };
        let shift = pin_index % 32;

        unsafe { register_ptr.write_volatile(1 << shift) };

        Ok(())
    }

    pub(crate) fn raw_reset(&self, pin_index: usize) -> GpioResult<()> {
        self.raw_set_pin_output(pin_index, false)?;
        self.raw_set_pin_function(pin_index, PinFunction::Input)?;
        Ok(())
    }
}

impl Debug for RawGpioDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawGpioDriver({:?})", self.mmap.as_ptr().addr())
    }
}

impl GpioDriver for RawGpioDriver {
    fn count(&self) -> GpioResult<usize> {
        Ok(Self::PIN_COUNT)
    }

    fn configure_output(&mut self, pin: usize) -> GpioResult<()> {
        Self::check_index(pin)?;

        if self.output_pins[pin] {
            return Ok(());
        }

        self.raw_set_pin_output(pin, false)?;
        self.raw_set_pin_function(pin, PinFunction::Output)?;
        self.output_pins.set(pin, true);
        Ok(())
    }

    fn write(&mut self, pin: usize, level: bool) -> GpioResult<()> {
        Self::check_index(pin)?;

        if !self.output_pins[pin] {
            return Err(GpioError::NotOutput(pin));
        }

        self.raw_set_pin_output(pin, level)
    }
}

impl Drop for RawGpioDriver {
    fn drop(&mut self) {
        for pin_index in self.output_pins.iter_ones() {
            _ = self.raw_reset(pin_index); // Back to input
        }
    }
}
