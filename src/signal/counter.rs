/// Saturating countdown, typically armed on state entry and decremented
/// once per repetition.
///
/// ```rust
/// use automata::signal::Counter;
///
/// let mut repeats = Counter::new(2);
/// assert_eq!(repeats.decrement(), 1);
/// assert_eq!(repeats.decrement(), 0);
/// assert_eq!(repeats.decrement(), 0);
/// assert!(repeats.expired());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    value: u16,
}

impl Counter {
    /// Disarmed; never expires and ignores decrements.
    pub const OFF: u16 = u16::MAX;

    pub const fn new(value: u16) -> Self {
        Self { value }
    }

    pub fn set(&mut self, value: u16) {
        self.value = value;
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    /// Count down by one, stopping at zero. Returns the new value, or 0 for
    /// a disarmed counter.
    pub fn decrement(&mut self) -> u16 {
        if self.value == Self::OFF || self.value == 0 {
            return 0;
        }
        self.value -= 1;
        self.value
    }

    pub fn expired(&self) -> bool {
        self.value == 0
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(Self::OFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_counter_is_inert() {
        let mut counter = Counter::default();
        assert_eq!(counter.decrement(), 0);
        assert_eq!(counter.value(), Counter::OFF);
        assert!(!counter.expired());
    }

    #[test]
    fn set_rearms() {
        let mut counter = Counter::new(0);
        assert!(counter.expired());
        counter.set(3);
        assert!(!counter.expired());
        assert_eq!(counter.decrement(), 2);
    }
}
