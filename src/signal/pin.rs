use crate::machine::Context;

/// Edge detector over up to 32 digital inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinChange {
    levels: u32,
}

impl PinChange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `pin` changed level since the previous call for that pin.
    /// Every pin starts out remembered as low. Pins above 31 never report
    /// a change.
    pub fn change(&mut self, cx: &Context<'_>, pin: u8) -> bool {
        if pin >= 32 {
            return false;
        }
        let mask = 1u32 << pin;
        let high = cx.read_pin(pin);
        if (self.levels & mask != 0) != high {
            self.levels ^= mask;
            return true;
        }
        false
    }

    /// Last level seen for `pin`.
    pub fn level(&self, pin: u8) -> bool {
        pin < 32 && self.levels & (1u32 << pin) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Scope;
    use crate::platform::{FakeClock, FakePins, Platform};

    #[test]
    fn reports_each_edge_once() {
        let pins = FakePins::new();
        let platform = Platform::new(FakeClock::new(), pins.clone());
        let mut scope = Scope::new(&platform);
        let cx = Context::new(&mut scope, None, 0, None);
        let mut detector = PinChange::new();

        assert!(!detector.change(&cx, 4));
        pins.set(4, true);
        assert!(detector.change(&cx, 4));
        assert!(!detector.change(&cx, 4));
        assert!(detector.level(4));
        pins.set(4, false);
        assert!(detector.change(&cx, 4));
        assert!(!detector.level(4));
    }

    #[test]
    fn pins_are_tracked_independently() {
        let pins = FakePins::new();
        let platform = Platform::new(FakeClock::new(), pins.clone());
        let mut scope = Scope::new(&platform);
        let cx = Context::new(&mut scope, None, 0, None);
        let mut detector = PinChange::new();

        pins.set(1, true);
        pins.set(31, true);
        assert!(detector.change(&cx, 31));
        assert!(detector.change(&cx, 1));
        assert!(!detector.change(&cx, 2));
        assert!(!detector.change(&cx, 40));
    }
}
