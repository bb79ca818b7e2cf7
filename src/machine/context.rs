//! What an automaton's hooks can see while they run.

use crate::core::StateId;
use crate::factory::Inventory;
use crate::platform::Platform;

/// Environment a machine is driven in: the platform, and the factory
/// inventory when the machine is cycled by a factory.
pub struct Scope<'a> {
    pub(crate) platform: &'a Platform,
    pub(crate) inventory: Option<&'a mut Inventory>,
}

impl<'a> Scope<'a> {
    /// Scope for a machine driven by hand, outside any factory.
    pub fn new(platform: &'a Platform) -> Self {
        Self {
            platform,
            inventory: None,
        }
    }

    pub(crate) fn with_inventory(platform: &'a Platform, inventory: &'a mut Inventory) -> Self {
        Self {
            platform,
            inventory: Some(inventory),
        }
    }

    pub fn platform(&self) -> &Platform {
        self.platform
    }
}

/// Per-hook view handed to [`Automaton`](super::Automaton) callbacks.
pub struct Context<'a> {
    pub(crate) platform: &'a Platform,
    pub(crate) inventory: Option<&'a mut Inventory>,
    pub(crate) state: Option<StateId>,
    pub(crate) entered_ms: u64,
    pub(crate) entered_us: Option<u64>,
    pub(crate) goto: Option<StateId>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        scope: &'a mut Scope<'_>,
        state: Option<StateId>,
        entered_ms: u64,
        entered_us: Option<u64>,
    ) -> Self {
        Self {
            platform: scope.platform,
            inventory: scope.inventory.as_deref_mut(),
            state,
            entered_ms,
            entered_us,
            goto: None,
        }
    }

    /// Current clock reading in milliseconds.
    pub fn millis(&self) -> u64 {
        self.platform.millis()
    }

    /// Current clock reading in microseconds.
    pub fn micros(&self) -> u64 {
        self.platform.micros()
    }

    /// Level of a digital input.
    pub fn read_pin(&self, pin: u8) -> bool {
        self.platform.read(pin)
    }

    /// State the machine is in (`None` before the first transition commits).
    pub fn state(&self) -> Option<StateId> {
        self.state
    }

    /// Millisecond timestamp of the last state entry.
    pub fn state_millis(&self) -> u64 {
        self.entered_ms
    }

    /// Microsecond timestamp of the last state entry; tiny machines do not
    /// keep one.
    pub fn state_micros(&self) -> Option<u64> {
        self.entered_us
    }

    /// Arm a transition of the running machine to `state`, as if
    /// `Machine::set_state` had been called once this hook returns.
    pub fn set_state(&mut self, state: StateId) {
        self.goto = Some(state);
    }

    /// The inventory of the factory driving this machine, if any.
    pub fn inventory(&mut self) -> Option<&mut Inventory> {
        self.inventory.as_deref_mut()
    }

    pub fn platform(&self) -> &'a Platform {
        self.platform
    }
}
