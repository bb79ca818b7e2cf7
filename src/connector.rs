//! Configurable signal targets.
//!
//! A [`Connector`] is how an automaton wires one of its outputs: to a
//! callback, to a specific machine, or to every machine answering to a label.
//! `push` fires the target, `pull` reads a value back from it. The logical
//! and relational operator codes are stored alongside for the owning
//! automaton to interpret; the connector itself never looks at them.

use crate::core::EventId;
use crate::factory::{MachineId, TinyId};
use crate::machine::Context;

/// Callback signature: receives the configured index, returns a value for
/// `pull`.
pub type Callback = Box<dyn FnMut(i32) -> i32>;

/// What a connector fires.
pub enum Target {
    Callback { callback: Callback, index: i32 },
    Machine { id: MachineId, event: EventId },
    Tiny { id: TinyId, event: EventId },
    /// A label selector, see [`LabelPattern`](crate::factory::LabelPattern).
    Label { label: String, event: EventId },
}

impl Target {
    pub fn mode(&self) -> Mode {
        match self {
            Target::Callback { .. } => Mode::Callback,
            Target::Machine { .. } => Mode::Machine,
            Target::Tiny { .. } => Mode::Tiny,
            Target::Label { .. } => Mode::Label,
        }
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Callback { index, .. } => f
                .debug_struct("Callback")
                .field("index", index)
                .finish_non_exhaustive(),
            Target::Machine { id, event } => f
                .debug_struct("Machine")
                .field("id", id)
                .field("event", event)
                .finish(),
            Target::Tiny { id, event } => f
                .debug_struct("Tiny")
                .field("id", id)
                .field("event", event)
                .finish(),
            Target::Label { label, event } => f
                .debug_struct("Label")
                .field("label", label)
                .field("event", event)
                .finish(),
        }
    }
}

/// Target kind, numbered as in the packed control byte of classic
/// connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Null = 0,
    Callback = 1,
    Machine = 2,
    Tiny = 3,
    Label = 4,
}

#[derive(Debug, Default)]
pub struct Connector {
    target: Option<Target>,
    log_op: u8,
    rel_op: u8,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the target. `log_op` keeps its low 2 bits and `rel_op` its
    /// low 3 bits.
    pub fn set(&mut self, target: Target, log_op: u8, rel_op: u8) -> &mut Self {
        self.target = Some(target);
        self.log_op = log_op & 0b11;
        self.rel_op = rel_op & 0b111;
        self
    }

    pub fn set_callback(
        &mut self,
        callback: impl FnMut(i32) -> i32 + 'static,
        index: i32,
    ) -> &mut Self {
        self.set(
            Target::Callback {
                callback: Box::new(callback),
                index,
            },
            0,
            0,
        )
    }

    pub fn set_machine(&mut self, id: MachineId, event: EventId) -> &mut Self {
        self.set(Target::Machine { id, event }, 0, 0)
    }

    pub fn set_tiny(&mut self, id: TinyId, event: EventId) -> &mut Self {
        self.set(Target::Tiny { id, event }, 0, 0)
    }

    pub fn set_label(&mut self, label: impl Into<String>, event: EventId) -> &mut Self {
        self.set(
            Target::Label {
                label: label.into(),
                event,
            },
            0,
            0,
        )
    }

    pub fn clear(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.target.as_ref().map_or(Mode::Null, Target::mode)
    }

    pub fn log_op(&self) -> u8 {
        self.log_op
    }

    pub fn rel_op(&self) -> u8 {
        self.rel_op
    }

    /// Fire the target.
    ///
    /// A callback runs unless `suppress_callback` is set, and the result is
    /// whether it ran. Machine and tiny targets are triggered through the
    /// context's inventory and always report `true`. A label target reports
    /// whether an inventory was available to broadcast through. An unset
    /// connector does nothing and reports `true`, like any non-callback kind.
    pub fn push(&mut self, cx: &mut Context<'_>, suppress_callback: bool) -> bool {
        let platform = cx.platform();
        match self.target.as_mut() {
            None => true,
            Some(Target::Callback { callback, index }) => {
                if !suppress_callback {
                    callback(*index);
                }
                !suppress_callback
            }
            Some(Target::Machine { id, event }) => {
                if let Some(inventory) = cx.inventory() {
                    inventory.trigger_machine(platform, *id, *event);
                }
                true
            }
            Some(Target::Tiny { id, event }) => {
                if let Some(inventory) = cx.inventory() {
                    inventory.trigger_tiny(platform, *id, *event);
                }
                true
            }
            Some(Target::Label { label, event }) => match cx.inventory() {
                Some(inventory) => {
                    inventory.trigger(platform, label, *event);
                    true
                }
                None => false,
            },
        }
    }

    /// Read a value from the target: the callback's result, the target
    /// machine's state (`-1` before it has entered one), or the summed state
    /// of every labelled match. `default` when unset or when the target
    /// cannot be reached.
    pub fn pull(&mut self, cx: &mut Context<'_>, default: i32) -> i32 {
        match self.target.as_mut() {
            None => default,
            Some(Target::Callback { callback, index }) => callback(*index),
            Some(Target::Machine { id, .. }) => cx
                .inventory()
                .and_then(|inventory| inventory.machine(*id))
                .map_or(default, |m| m.state_value()),
            Some(Target::Tiny { id, .. }) => cx
                .inventory()
                .and_then(|inventory| inventory.tiny(*id))
                .map_or(default, |m| m.state_value()),
            Some(Target::Label { label, .. }) => cx
                .inventory()
                .map_or(default, |inventory| inventory.state(label)),
        }
    }
}
