//! Blocking delays used for bus timing.

use std::fmt::Debug;
use std::thread::sleep;
use std::time::Duration;

/// A monotonic blocking delay with microsecond resolution.
pub trait Delay: Debug {
    /// Blocks the calling thread for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);

    /// Blocks the calling thread for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32) {
        self.delay_us(ms.saturating_mul(1000));
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// [Delay] backed by [std::thread::sleep].
///
/// The OS scheduler may oversleep, never undersleep, which is all the controller timing asks for.
#[derive(Copy, Clone, Debug, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_us(&mut self, us: u32) {
        sleep(Duration::from_micros(us as u64));
    }
}
