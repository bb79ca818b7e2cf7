//! Machine arena with inventory and priority-tier links.

use super::{FactoryConfig, LabelPattern, ScheduleStep, TIERS};
use crate::core::EventId;
use crate::machine::{Machine, Scope, TinyMachine};
use crate::platform::Platform;

/// Handle to a full machine owned by an [`Inventory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineId(usize);

/// Handle to a tiny machine owned by an [`Inventory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TinyId(usize);

#[derive(Debug)]
struct MachineEntry {
    /// Empty while the machine is being driven.
    slot: Option<Machine>,
    inventory_next: Option<usize>,
    priority_next: Option<usize>,
}

#[derive(Debug)]
struct TinyEntry {
    slot: Option<TinyMachine>,
    next: Option<usize>,
}

/// Owner of every machine a factory schedules.
///
/// Machines live in arena slots and are linked into the inventory list most
/// recently added first. The five priority tiers are a second set of links
/// over the same slots, rebuilt by [`calibrate`](Self::calibrate) whenever
/// they go stale.
///
/// A machine is moved out of its slot for as long as it is cycled or
/// triggered. Lookups, label broadcasts and handle triggers that reach it in
/// that window see a vacant slot and pass it by.
#[derive(Debug)]
pub struct Inventory {
    machines: Vec<MachineEntry>,
    tinies: Vec<TinyEntry>,
    inventory_root: Option<usize>,
    tiny_root: Option<usize>,
    priority_root: [Option<usize>; TIERS],
    stale: bool,
    config: FactoryConfig,
}

impl Inventory {
    pub fn new(config: FactoryConfig) -> Self {
        Self {
            machines: Vec::new(),
            tinies: Vec::new(),
            inventory_root: None,
            tiny_root: None,
            priority_root: [None; TIERS],
            stale: false,
            config,
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Take ownership of `machine` and mark the tiers stale.
    pub fn add(&mut self, mut machine: Machine) -> MachineId {
        machine.set_retries(self.config.trigger_retries);
        let index = self.machines.len();
        self.machines.push(MachineEntry {
            slot: Some(machine),
            inventory_next: self.inventory_root,
            priority_next: None,
        });
        self.inventory_root = Some(index);
        self.stale = true;
        MachineId(index)
    }

    pub fn add_tiny(&mut self, mut machine: TinyMachine) -> TinyId {
        machine.set_retries(self.config.trigger_retries);
        let index = self.tinies.len();
        self.tinies.push(TinyEntry {
            slot: Some(machine),
            next: self.tiny_root,
        });
        self.tiny_root = Some(index);
        TinyId(index)
    }

    /// Number of registered machines, full and tiny.
    pub fn len(&self) -> usize {
        self.machines.len() + self.tinies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn machine_len(&self) -> usize {
        self.machines.len()
    }

    pub fn tiny_len(&self) -> usize {
        self.tinies.len()
    }

    /// Whether the tier index must be rebuilt before the next pass.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(id.0)?.slot.as_ref()
    }

    pub fn machine_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        self.machines.get_mut(id.0)?.slot.as_mut()
    }

    pub fn tiny(&self, id: TinyId) -> Option<&TinyMachine> {
        self.tinies.get(id.0)?.slot.as_ref()
    }

    pub fn tiny_mut(&mut self, id: TinyId) -> Option<&mut TinyMachine> {
        self.tinies.get_mut(id.0)?.slot.as_mut()
    }

    /// Full machines in inventory order, most recently added first.
    pub fn ids(&self) -> impl Iterator<Item = MachineId> + '_ {
        std::iter::successors(self.inventory_root, |&i| self.machines[i].inventory_next)
            .map(MachineId)
    }

    /// Machines currently indexed under `tier`, in walk order.
    pub fn tier(&self, tier: u8) -> impl Iterator<Item = MachineId> + '_ {
        let root = self.priority_root.get(usize::from(tier)).copied().flatten();
        std::iter::successors(root, |&i| self.machines[i].priority_next).map(MachineId)
    }

    /// First machine whose instance label is exactly `label`.
    pub fn find(&self, label: &str) -> Option<MachineId> {
        self.ids()
            .find(|&id| self.machine(id).is_some_and(|m| m.label() == label))
    }

    /// Trigger `event` on every machine matching the label selector, in
    /// inventory order. Returns how many machines were reached.
    pub fn trigger(&mut self, platform: &Platform, label: &str, event: EventId) -> usize {
        let pattern = LabelPattern::parse(label);
        let mut reached = 0;
        let mut cursor = self.inventory_root;
        while let Some(index) = cursor {
            let selected = self.machines[index]
                .slot
                .as_ref()
                .is_some_and(|m| pattern.matches(m));
            if selected {
                self.with_machine(platform, index, |m, scope| m.trigger(scope, event));
                reached += 1;
            }
            cursor = self.machines[index].inventory_next;
        }
        tracing::trace!(label, event, reached, "label trigger");
        reached
    }

    /// Sum of `state_value()` over every machine matching the label
    /// selector; 0 when nothing matches.
    pub fn state(&self, label: &str) -> i32 {
        let pattern = LabelPattern::parse(label);
        self.ids()
            .filter_map(|id| self.machine(id))
            .filter(|m| pattern.matches(m))
            .map(Machine::state_value)
            .sum()
    }

    /// Trigger `event` on one machine. `false` when the event was dropped or
    /// the machine is unavailable.
    pub fn trigger_machine(&mut self, platform: &Platform, id: MachineId, event: EventId) -> bool {
        self.with_machine(platform, id.0, |m, scope| m.trigger(scope, event))
            .unwrap_or(false)
    }

    pub fn trigger_tiny(&mut self, platform: &Platform, id: TinyId, event: EventId) -> bool {
        self.with_tiny(platform, id.0, |m, scope| m.trigger(scope, event))
            .unwrap_or(false)
    }

    /// Rebuild the tier lists from the inventory.
    ///
    /// A machine out of its slot at this moment cannot be placed, so the
    /// index stays stale and is rebuilt again before the next pass.
    pub fn calibrate(&mut self) {
        self.priority_root = [None; TIERS];
        let mut complete = true;
        let mut cursor = self.inventory_root;
        while let Some(index) = cursor {
            let entry = &mut self.machines[index];
            match entry.slot.as_ref().map(Machine::priority) {
                Some(priority) if usize::from(priority) < TIERS => {
                    let tier = usize::from(priority);
                    entry.priority_next = self.priority_root[tier];
                    self.priority_root[tier] = Some(index);
                }
                Some(priority) => {
                    tracing::warn!(
                        label = entry.slot.as_ref().map(Machine::label),
                        priority,
                        "priority outside every tier, machine will not be scheduled"
                    );
                }
                None => complete = false,
            }
            cursor = entry.inventory_next;
        }
        self.stale = !complete;
        tracing::trace!(machines = self.machines.len(), "tiers calibrated");
    }

    /// Walk one tier. Tiers 1 to 4 cycle every awake machine; tier 0 only
    /// looks for machines whose priority moved.
    pub fn run(&mut self, platform: &Platform, tier: u8) {
        let Some(&root) = self.priority_root.get(usize::from(tier)) else {
            tracing::warn!(tier, "no such tier");
            return;
        };
        let mut cursor = root;
        while let Some(index) = cursor {
            let runnable = self.machines[index]
                .slot
                .as_ref()
                .is_some_and(|m| !m.is_asleep() && !m.is_cycling());
            if tier > 0 && runnable {
                self.with_machine(platform, index, |m, scope| m.cycle(scope));
            }
            let entry = &self.machines[index];
            if entry.slot.as_ref().is_some_and(|m| m.priority() != tier) {
                self.stale = true;
            }
            cursor = entry.priority_next;
        }
    }

    /// Cycle every awake tiny machine once.
    pub fn run_tiny(&mut self, platform: &Platform) {
        let mut cursor = self.tiny_root;
        while let Some(index) = cursor {
            let runnable = self.tinies[index]
                .slot
                .as_ref()
                .is_some_and(|m| !m.is_asleep() && !m.is_cycling());
            if runnable {
                self.with_tiny(platform, index, |m, scope| m.cycle(scope));
            }
            cursor = self.tinies[index].next;
        }
    }

    /// One scheduling pass: recalibrate if stale, then walk the configured
    /// schedule.
    pub fn pass(&mut self, platform: &Platform) {
        if self.stale {
            self.calibrate();
        }
        for step in 0..self.config.schedule.len() {
            match self.config.schedule[step] {
                ScheduleStep::Tiny => self.run_tiny(platform),
                ScheduleStep::Tier(tier) => self.run(platform, tier),
            }
        }
    }

    fn with_machine<R>(
        &mut self,
        platform: &Platform,
        index: usize,
        f: impl FnOnce(&mut Machine, &mut Scope<'_>) -> R,
    ) -> Option<R> {
        let mut machine = self.machines.get_mut(index)?.slot.take()?;
        let result = f(&mut machine, &mut Scope::with_inventory(platform, self));
        self.machines[index].slot = Some(machine);
        Some(result)
    }

    fn with_tiny<R>(
        &mut self,
        platform: &Platform,
        index: usize,
        f: impl FnOnce(&mut TinyMachine, &mut Scope<'_>) -> R,
    ) -> Option<R> {
        let mut machine = self.tinies.get_mut(index)?.slot.take()?;
        let result = f(&mut machine, &mut Scope::with_inventory(platform, self));
        self.tinies[index].slot = Some(machine);
        Some(result)
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(FactoryConfig::default())
    }
}
