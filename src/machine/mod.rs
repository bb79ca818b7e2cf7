//! The table interpreter.
//!
//! A machine pairs a [`TransitionTable`](crate::core::TransitionTable) with
//! an [`Automaton`], the small set of hooks that give the table meaning:
//! event predicates and action handlers.
//!
//! - [`Machine`]: full interpreter with labels, priority, tracing and
//!   microsecond timestamps
//! - [`TinyMachine`]: the same contract without labels, tracing, loop
//!   counter or priority

mod context;
mod full;
#[cfg(test)]
pub(crate) mod recorder;
mod tiny;

pub use context::{Context, Scope};
pub use full::{Machine, DEFAULT_PRIORITY};
pub use tiny::TinyMachine;

use crate::core::{ActionId, EventId, LoopSlot, StateId, TransitionTable};
use std::rc::Rc;

/// Attempts `trigger` makes to reach a state that accepts the event.
pub const TRIGGER_RETRIES: u8 = 8;

/// Action handed to [`Automaton::action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A transition is about to commit; fired before the old state's on-exit.
    Switch,
    /// An on-enter, on-loop or on-exit action from the table.
    Run(ActionId),
}

/// Behaviour of one kind of automaton.
///
/// # Example
///
/// ```rust
/// use automata::core::EventId;
/// use automata::machine::{Action, Automaton, Context};
///
/// const EVT_BUTTON: EventId = 0;
/// const ACT_ON: u16 = 0;
///
/// struct Lamp {
///     pin: u8,
///     lit: bool,
/// }
///
/// impl Automaton for Lamp {
///     fn event(&mut self, cx: &mut Context<'_>, id: EventId) -> bool {
///         id == EVT_BUTTON && cx.read_pin(self.pin)
///     }
///
///     fn action(&mut self, _cx: &mut Context<'_>, action: Action) {
///         if action == Action::Run(ACT_ON) {
///             self.lit = true;
///         }
///     }
/// }
/// ```
pub trait Automaton {
    /// Whether event `id` holds during this cycle.
    ///
    /// Called once per declared event column with a target, in column order,
    /// until one matches. Keep it fast and free of side effects.
    fn event(&mut self, cx: &mut Context<'_>, id: EventId) -> bool;

    /// Perform the side effects of `action`.
    fn action(&mut self, cx: &mut Context<'_>, action: Action);
}

/// The pieces of an interpreter that [`run_cycle`] and [`deliver`] drive.
pub(crate) trait Interpreter {
    /// Claim the machine for one cycle and hand back its table. `None` while
    /// asleep, already cycling or before `begin`.
    fn claim(&mut self) -> Option<Rc<TransitionTable>>;
    fn release(&mut self);
    fn current_state(&self) -> Option<StateId>;
    fn armed_state(&self) -> Option<StateId>;
    /// Runs between the switch action and the old state's on-exit.
    fn switching(&mut self, _scope: &Scope<'_>, _table: &TransitionTable, _next: StateId) {}
    /// Make `next` current and stamp its entry time.
    fn commit(&mut self, scope: &Scope<'_>, next: StateId);
    fn set_asleep(&mut self, asleep: bool);
    fn act(&mut self, scope: &mut Scope<'_>, action: Action);
    fn holds(&mut self, scope: &mut Scope<'_>, event: EventId) -> bool;
    /// Arm `target` after `column` matched, consuming any injected event.
    fn take(&mut self, target: StateId, column: EventId);

    fn step(&mut self, scope: &mut Scope<'_>);
    fn wake(&mut self) {
        self.set_asleep(false);
    }
    /// Whether the current state declares a transition for `event`.
    fn accepts(&self, event: EventId) -> bool;
    fn pending(&self) -> Option<EventId>;
    fn inject(&mut self, event: EventId);
    fn retries(&self) -> u8;
}

/// One scheduling quantum: commit an armed transition (switch, on-exit,
/// enter, on-enter), run the on-loop action, then arm the first event
/// column that holds, falling back to ELSE.
pub(crate) fn run_cycle<M: Interpreter>(machine: &mut M, scope: &mut Scope<'_>) {
    let Some(table) = machine.claim() else {
        return;
    };

    if let Some(next) = machine.armed_state() {
        machine.act(scope, Action::Switch);
        machine.switching(scope, &table, next);
        if let Some(exit) = machine.current_state().and_then(|s| table.on_exit(s)) {
            machine.act(scope, Action::Run(exit));
        }
        machine.commit(scope, next);
        if let Some(enter) = table.on_enter(next) {
            machine.act(scope, Action::Run(enter));
        }
        machine.set_asleep(table.on_loop(next) == LoopSlot::Sleep);
    }

    if let Some(state) = machine.current_state() {
        if let LoopSlot::Action(id) = table.on_loop(state) {
            machine.act(scope, Action::Run(id));
        }
        let else_column = table.else_column();
        for column in 0..=else_column {
            let Some(target) = table.target(state, column) else {
                continue;
            };
            if column == else_column
                || machine.holds(scope, column)
                || machine.pending() == Some(column)
            {
                machine.take(target, column);
                break;
            }
        }
    }

    machine.release();
}

/// Pump `machine` until it rests in a state that accepts `event`, then inject
/// the event and cycle twice: once to take the transition, once to commit it.
///
/// Returns `false` when no accepting state was reached within the retry
/// budget; the event is dropped.
pub(crate) fn deliver<M: Interpreter>(
    machine: &mut M,
    scope: &mut Scope<'_>,
    event: EventId,
) -> bool {
    let mut remaining = machine.retries().max(1);
    let accepted = loop {
        machine.wake();
        machine.step(scope);
        let accepts = machine.accepts(event);
        remaining -= 1;
        if remaining == 0 || (accepts && machine.pending().is_none()) {
            break accepts;
        }
    };

    if !accepted {
        tracing::warn!(event, "injected event dropped, no accepting state reached");
        return false;
    }

    machine.inject(event);
    machine.wake();
    machine.step(scope);
    machine.wake();
    machine.step(scope);
    true
}
