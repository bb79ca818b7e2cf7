//! Countdown timers measured from the moment the running state was entered.

use crate::machine::Context;

/// Millisecond timer. Expires once the machine has spent at least the set
/// duration in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerMillis {
    value: u32,
}

impl TimerMillis {
    /// Disarmed; never expires.
    pub const OFF: u32 = u32::MAX;

    pub const fn new(ms: u32) -> Self {
        Self { value: ms }
    }

    pub fn set(&mut self, ms: u32) {
        self.value = ms;
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_off(&self) -> bool {
        self.value == Self::OFF
    }

    pub fn expired(&self, cx: &Context<'_>) -> bool {
        !self.is_off() && cx.millis().wrapping_sub(cx.state_millis()) >= u64::from(self.value)
    }
}

impl Default for TimerMillis {
    fn default() -> Self {
        Self::new(Self::OFF)
    }
}

/// Microsecond timer. Only full machines record a microsecond entry
/// timestamp; under a tiny machine it never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerMicros {
    value: u32,
}

impl TimerMicros {
    pub const OFF: u32 = u32::MAX;

    pub const fn new(us: u32) -> Self {
        Self { value: us }
    }

    pub fn set(&mut self, us: u32) {
        self.value = us;
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_off(&self) -> bool {
        self.value == Self::OFF
    }

    pub fn expired(&self, cx: &Context<'_>) -> bool {
        if self.is_off() {
            return false;
        }
        match cx.state_micros() {
            Some(entered) => cx.micros().wrapping_sub(entered) >= u64::from(self.value),
            None => false,
        }
    }
}

impl Default for TimerMicros {
    fn default() -> Self {
        Self::new(Self::OFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Scope;
    use crate::platform::{FakeClock, NoPins, Platform};

    fn fixture() -> (FakeClock, Platform) {
        let clock = FakeClock::new();
        let platform = Platform::new(clock.clone(), NoPins);
        (clock, platform)
    }

    #[test]
    fn millis_timer_expires_after_duration_in_state() {
        let (clock, platform) = fixture();
        clock.set_millis(1_000);
        let mut scope = Scope::new(&platform);
        let timer = TimerMillis::new(250);

        clock.set_millis(1_249);
        let cx = Context::new(&mut scope, Some(0), 1_000, Some(1_000_000));
        assert!(!timer.expired(&cx));

        clock.set_millis(1_250);
        assert!(timer.expired(&cx));
    }

    #[test]
    fn off_timers_never_expire() {
        let (clock, platform) = fixture();
        let mut scope = Scope::new(&platform);
        clock.set_millis(u64::from(u32::MAX) * 2);
        let cx = Context::new(&mut scope, Some(0), 0, Some(0));

        assert!(!TimerMillis::default().expired(&cx));
        assert!(!TimerMicros::default().expired(&cx));
        assert!(TimerMillis::default().is_off());
    }

    #[test]
    fn zero_timer_expires_immediately() {
        let (_clock, platform) = fixture();
        let mut scope = Scope::new(&platform);
        let cx = Context::new(&mut scope, Some(0), 0, Some(0));

        assert!(TimerMillis::new(0).expired(&cx));
        assert!(TimerMicros::new(0).expired(&cx));
    }

    #[test]
    fn micros_timer_needs_a_micro_timestamp() {
        let (clock, platform) = fixture();
        let mut scope = Scope::new(&platform);
        clock.advance_micros(600);
        let mut timer = TimerMicros::default();
        timer.set(500);

        let full = Context::new(&mut scope, Some(0), 0, Some(0));
        assert!(timer.expired(&full));
        drop(full);

        let tiny = Context::new(&mut scope, Some(0), 0, None);
        assert!(!timer.expired(&tiny));
    }
}
