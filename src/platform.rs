//! Host capabilities consumed by the runtime: a monotonic clock and a
//! digital input reader.
//!
//! Both are injected through a [`Platform`] rather than read from ambient
//! globals, so tests can drive time and pin levels deterministically with
//! [`FakeClock`] and [`FakePins`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time source.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn millis(&self) -> u64;

    /// Microseconds since the same origin.
    fn micros(&self) -> u64;
}

/// Digital input source.
pub trait Pins {
    /// Level of `pin` (`true` = high).
    fn read(&self, pin: u8) -> bool;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    micros: Rc<Cell<u64>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_millis(&self, ms: u64) {
        self.advance_micros(ms * 1_000);
    }

    pub fn advance_micros(&self, us: u64) {
        self.micros.set(self.micros.get() + us);
    }

    pub fn set_millis(&self, ms: u64) {
        self.micros.set(ms * 1_000);
    }
}

impl Clock for FakeClock {
    fn millis(&self) -> u64 {
        self.micros.get() / 1_000
    }

    fn micros(&self) -> u64 {
        self.micros.get()
    }
}

/// Manually driven pin levels for pins 0..32. Clones share the same levels.
#[derive(Debug, Clone, Default)]
pub struct FakePins {
    levels: Rc<Cell<u32>>,
}

impl FakePins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, pin: u8, high: bool) {
        if pin >= 32 {
            return;
        }
        let mask = 1u32 << pin;
        let levels = self.levels.get();
        self.levels
            .set(if high { levels | mask } else { levels & !mask });
    }
}

impl Pins for FakePins {
    fn read(&self, pin: u8) -> bool {
        pin < 32 && self.levels.get() & (1u32 << pin) != 0
    }
}

/// Input source with every pin low.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPins;

impl Pins for NoPins {
    fn read(&self, _pin: u8) -> bool {
        false
    }
}

/// The capabilities handed to every machine.
pub struct Platform {
    clock: Box<dyn Clock>,
    pins: Box<dyn Pins>,
}

impl Platform {
    pub fn new(clock: impl Clock + 'static, pins: impl Pins + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            pins: Box::new(pins),
        }
    }

    /// System clock, all pins low.
    pub fn system() -> Self {
        Self::new(SystemClock::new(), NoPins)
    }

    pub fn millis(&self) -> u64 {
        self.clock.millis()
    }

    pub fn micros(&self) -> u64 {
        self.clock.micros()
    }

    pub fn read(&self, pin: u8) -> bool {
        self.pins.read(pin)
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("millis", &self.millis())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_clones_share_time() {
        let clock = FakeClock::new();
        let platform = Platform::new(clock.clone(), NoPins);

        clock.advance_millis(5);
        clock.advance_micros(250);

        assert_eq!(platform.millis(), 5);
        assert_eq!(platform.micros(), 5_250);
    }

    #[test]
    fn fake_pins_track_levels() {
        let pins = FakePins::new();
        let platform = Platform::new(FakeClock::new(), pins.clone());

        pins.set(3, true);
        assert!(platform.read(3));
        assert!(!platform.read(4));

        pins.set(3, false);
        assert!(!platform.read(3));
    }

    #[test]
    fn fake_pins_ignore_out_of_range() {
        let pins = FakePins::new();
        pins.set(40, true);
        assert!(!pins.read(40));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.micros();
        let b = clock.micros();
        assert!(b >= a);
    }
}
