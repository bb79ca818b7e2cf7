//! The registry and cooperative scheduler.
//!
//! A [`Factory`] owns the platform and an [`Inventory`] of machines. Each
//! full machine sits in one of five priority tiers; a scheduling pass walks
//! the tiers in a fixed, weighted interleave so that tier 1 is serviced most
//! often and tier 0 never. Tiny machines are cycled several times per pass
//! regardless of tier.
//!
//! ```rust
//! use automata::core::{EventId, TransitionTable, NONE};
//! use automata::factory::Factory;
//! use automata::machine::{Action, Automaton, Context, Machine};
//! use automata::platform::Platform;
//! use std::rc::Rc;
//!
//! struct Idle;
//!
//! impl Automaton for Idle {
//!     fn event(&mut self, _cx: &mut Context<'_>, _id: EventId) -> bool {
//!         false
//!     }
//!     fn action(&mut self, _cx: &mut Context<'_>, _action: Action) {}
//! }
//!
//! // one state, one event, no actions
//! let table = Rc::new(TransitionTable::from_rows(&[[NONE, NONE, NONE, NONE, NONE]], 1).unwrap());
//!
//! let mut factory = Factory::new(Platform::system());
//! let mut machine = Machine::new("IDLE", Idle);
//! machine.begin(table).set_label("idle1");
//! let id = factory.add(machine);
//!
//! factory.cycle();
//! assert_eq!(factory.find("idle1"), Some(id));
//! assert_eq!(factory.state("idle1"), 0);
//! ```

mod config;
mod error;
mod inventory;
mod label;

pub use config::{FactoryConfig, ScheduleStep};
pub use error::ConfigError;
pub use inventory::{Inventory, MachineId, TinyId};
pub use label::LabelPattern;

use crate::core::EventId;
use crate::machine::{Machine, TinyMachine};
use crate::platform::Platform;

/// Number of priority tiers.
pub const TIERS: usize = 5;

#[derive(Debug)]
pub struct Factory {
    platform: Platform,
    inventory: Inventory,
}

impl Factory {
    pub fn new(platform: Platform) -> Self {
        Self::with_config(platform, FactoryConfig::default())
    }

    /// Factory with a custom schedule or retry budget. Call
    /// [`FactoryConfig::validate`] first if the config came from outside;
    /// out-of-range tiers in the schedule are skipped at run time.
    pub fn with_config(platform: Platform, config: FactoryConfig) -> Self {
        Self {
            platform,
            inventory: Inventory::new(config),
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn config(&self) -> &FactoryConfig {
        self.inventory.config()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn add(&mut self, machine: Machine) -> MachineId {
        self.inventory.add(machine)
    }

    pub fn add_tiny(&mut self, machine: TinyMachine) -> TinyId {
        self.inventory.add_tiny(machine)
    }

    pub fn find(&self, label: &str) -> Option<MachineId> {
        self.inventory.find(label)
    }

    /// Trigger `event` on every machine the label selector matches; see
    /// [`LabelPattern`]. Returns how many were reached.
    pub fn trigger(&mut self, label: &str, event: EventId) -> usize {
        self.inventory.trigger(&self.platform, label, event)
    }

    /// Summed state of every machine the label selector matches.
    pub fn state(&self, label: &str) -> i32 {
        self.inventory.state(label)
    }

    pub fn trigger_machine(&mut self, id: MachineId, event: EventId) -> bool {
        self.inventory.trigger_machine(&self.platform, id, event)
    }

    pub fn trigger_tiny(&mut self, id: TinyId, event: EventId) -> bool {
        self.inventory.trigger_tiny(&self.platform, id, event)
    }

    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        self.inventory.machine(id)
    }

    pub fn machine_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        self.inventory.machine_mut(id)
    }

    pub fn tiny(&self, id: TinyId) -> Option<&TinyMachine> {
        self.inventory.tiny(id)
    }

    pub fn tiny_mut(&mut self, id: TinyId) -> Option<&mut TinyMachine> {
        self.inventory.tiny_mut(id)
    }

    pub fn calibrate(&mut self) {
        self.inventory.calibrate();
    }

    pub fn run(&mut self, tier: u8) {
        self.inventory.run(&self.platform, tier);
    }

    pub fn run_tiny(&mut self) {
        self.inventory.run_tiny(&self.platform);
    }

    /// One full scheduling pass.
    pub fn cycle(&mut self) {
        self.inventory.pass(&self.platform);
    }

    /// Repeat scheduling passes until `ms` milliseconds have elapsed; always
    /// at least one.
    pub fn cycle_for(&mut self, ms: u64) {
        let start = self.platform.millis();
        loop {
            self.inventory.pass(&self.platform);
            if self.platform.millis().wrapping_sub(start) >= ms {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inventory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    pub fn is_stale(&self) -> bool {
        self.inventory.is_stale()
    }
}
