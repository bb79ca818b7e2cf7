//! Full machine interpreter.

use super::{
    deliver, run_cycle, Action, Automaton, Context, Interpreter, Scope, TRIGGER_RETRIES,
};
use crate::core::{EventId, StateId, Symbols, TransitionTable};
use crate::trace::{TraceRecord, TraceSink};
use std::borrow::Cow;
use std::rc::Rc;

/// Tier a machine is scheduled in after `begin`.
pub const DEFAULT_PRIORITY: u8 = 1;

struct Tracer {
    sink: Box<dyn TraceSink>,
    symbols: Symbols,
}

/// One automaton instance bound to a transition table.
///
/// A new machine has no current state and a pending transition to state 0,
/// so its first cycle enters state 0.
///
/// # Example
///
/// ```rust
/// use automata::core::{EventId, TransitionTable, NONE};
/// use automata::machine::{Action, Automaton, Context, Machine, Scope};
/// use automata::platform::Platform;
/// use std::rc::Rc;
///
/// struct Blinker;
///
/// impl Automaton for Blinker {
///     fn event(&mut self, _cx: &mut Context<'_>, _id: EventId) -> bool {
///         false
///     }
///     fn action(&mut self, _cx: &mut Context<'_>, _action: Action) {}
/// }
///
/// // Two states flipping on ELSE every cycle.
/// let table = TransitionTable::from_rows(&[
///     [NONE, NONE, NONE, 1],
///     [NONE, NONE, NONE, 0],
/// ], 0).unwrap();
///
/// let platform = Platform::system();
/// let mut machine = Machine::new("BLINK", Blinker);
/// machine.begin(Rc::new(table));
///
/// let mut scope = Scope::new(&platform);
/// machine.cycle(&mut scope); // enter 0, arm 0 -> 1
/// machine.cycle(&mut scope); // commit 1
/// assert_eq!(machine.state(), Some(1));
/// ```
pub struct Machine {
    behavior: Box<dyn Automaton>,
    table: Option<Rc<TransitionTable>>,
    current: Option<StateId>,
    next: Option<StateId>,
    asleep: bool,
    cycling: bool,
    state_millis: u64,
    state_micros: u64,
    cycles: u32,
    last_event: Option<EventId>,
    pending_event: Option<EventId>,
    priority: u8,
    label: Option<Cow<'static, str>>,
    class_label: Cow<'static, str>,
    tracer: Option<Tracer>,
    retries: u8,
}

impl Machine {
    pub fn new(class_label: impl Into<Cow<'static, str>>, behavior: impl Automaton + 'static) -> Self {
        Self {
            behavior: Box::new(behavior),
            table: None,
            current: None,
            next: Some(0),
            asleep: false,
            cycling: false,
            state_millis: 0,
            state_micros: 0,
            cycles: 0,
            last_event: None,
            pending_event: None,
            priority: DEFAULT_PRIORITY,
            label: None,
            class_label: class_label.into(),
            tracer: None,
            retries: TRIGGER_RETRIES,
        }
    }

    /// Bind the transition table. Resets the priority to
    /// [`DEFAULT_PRIORITY`], defaults the instance label to the class label
    /// and wakes the machine.
    pub fn begin(&mut self, table: Rc<TransitionTable>) -> &mut Self {
        self.table = Some(table);
        self.priority = DEFAULT_PRIORITY;
        if self.label.is_none() {
            self.label = Some(self.class_label.clone());
        }
        self.asleep = false;
        self
    }

    /// Run one scheduling quantum. A no-op while asleep, while already
    /// cycling, or before `begin`.
    pub fn cycle(&mut self, scope: &mut Scope<'_>) {
        run_cycle(self, scope);
    }

    /// Keep cycling until `ms` milliseconds have passed on the platform
    /// clock. Cycles at least once.
    pub fn cycle_for(&mut self, scope: &mut Scope<'_>, ms: u64) {
        let start = scope.platform.millis();
        loop {
            self.cycle(scope);
            if scope.platform.millis().wrapping_sub(start) >= ms {
                break;
            }
        }
    }

    /// Inject `event`, pumping the machine forward until it rests in a state
    /// that accepts it. Returns `false` if the event was dropped.
    pub fn trigger(&mut self, scope: &mut Scope<'_>, event: EventId) -> bool {
        deliver(self, scope, event)
    }

    /// Arm a transition to `state` and wake the machine. Ids outside the
    /// bound table are ignored.
    pub fn set_state(&mut self, state: StateId) -> &mut Self {
        if let Some(table) = &self.table {
            if state >= table.states() {
                tracing::warn!(
                    machine = %self.label(),
                    state,
                    states = table.states(),
                    "ignoring transition to unknown state"
                );
                return self;
            }
        }
        self.next = Some(state);
        self.last_event = None;
        self.asleep = false;
        self
    }

    /// Current state, `None` before the first transition commits.
    pub fn state(&self) -> Option<StateId> {
        self.current
    }

    /// Current state as a plain integer, `-1` for none. This is what label
    /// aggregation and connector pulls sum up.
    pub fn state_value(&self) -> i32 {
        self.current.map_or(-1, |s| s as i32)
    }

    /// Pending transition target, if any.
    pub fn next_state(&self) -> Option<StateId> {
        self.next
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    pub fn set_sleep(&mut self, asleep: bool) -> &mut Self {
        self.asleep = asleep;
        self
    }

    pub fn is_cycling(&self) -> bool {
        self.cycling
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Change the service tier. A factory notices the change on its next
    /// pass and re-indexes its tiers on the pass after.
    pub fn set_priority(&mut self, priority: u8) -> &mut Self {
        self.priority = priority;
        self
    }

    /// Instance label; the class label until one is set.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&*self.class_label)
    }

    pub fn set_label(&mut self, label: impl Into<Cow<'static, str>>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn class_label(&self) -> &str {
        &self.class_label
    }

    /// Cycles run since the last transition committed.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Event column that armed the last transition (`events()` for ELSE).
    pub fn last_event(&self) -> Option<EventId> {
        self.last_event
    }

    /// Event injected by `trigger` and not yet consumed.
    pub fn pending_event(&self) -> Option<EventId> {
        self.pending_event
    }

    pub fn state_millis(&self) -> u64 {
        self.state_millis
    }

    pub fn state_micros(&self) -> u64 {
        self.state_micros
    }

    pub fn table(&self) -> Option<&TransitionTable> {
        self.table.as_deref()
    }

    pub fn retries(&self) -> u8 {
        self.retries
    }

    /// Attempts `trigger` makes before dropping an event.
    pub fn set_retries(&mut self, retries: u8) -> &mut Self {
        self.retries = retries.max(1);
        self
    }

    /// Report every committed transition to `sink`, naming states and events
    /// through `symbols`.
    pub fn set_trace(&mut self, sink: impl TraceSink + 'static, symbols: Symbols) -> &mut Self {
        self.tracer = Some(Tracer {
            sink: Box::new(sink),
            symbols,
        });
        self
    }

    pub fn clear_trace(&mut self) -> &mut Self {
        self.tracer = None;
        self
    }

    fn context<'s>(&self, scope: &'s mut Scope<'_>) -> Context<'s> {
        Context::new(
            scope,
            self.current,
            self.state_millis,
            Some(self.state_micros),
        )
    }

    fn emit_trace(&mut self, scope: &Scope<'_>, table: &TransitionTable, next: StateId) {
        let Some(tracer) = self.tracer.as_mut() else {
            return;
        };
        let events = table.events();
        let machine = self.label.as_deref().unwrap_or(&*self.class_label);
        let record = TraceRecord {
            machine,
            from: tracer.symbols.state(self.current, events),
            to: tracer.symbols.state(Some(next), events),
            event: tracer.symbols.event(self.last_event),
            elapsed_ms: scope.platform.millis().wrapping_sub(self.state_millis),
            cycles: self.cycles,
        };
        tracer.sink.record(&record);
    }
}

impl Interpreter for Machine {
    fn claim(&mut self) -> Option<Rc<TransitionTable>> {
        if self.asleep || self.cycling {
            return None;
        }
        let table = self.table.clone()?;
        self.cycles = self.cycles.wrapping_add(1);
        self.cycling = true;
        Some(table)
    }

    fn release(&mut self) {
        self.cycling = false;
    }

    fn current_state(&self) -> Option<StateId> {
        self.current
    }

    fn armed_state(&self) -> Option<StateId> {
        self.next
    }

    fn switching(&mut self, scope: &Scope<'_>, table: &TransitionTable, next: StateId) {
        self.emit_trace(scope, table, next);
    }

    fn commit(&mut self, scope: &Scope<'_>, next: StateId) {
        self.current = Some(next);
        self.next = None;
        self.state_millis = scope.platform.millis();
        self.state_micros = scope.platform.micros();
        self.cycles = 0;
    }

    fn set_asleep(&mut self, asleep: bool) {
        self.asleep = asleep;
    }

    fn act(&mut self, scope: &mut Scope<'_>, action: Action) {
        let mut cx = self.context(scope);
        self.behavior.action(&mut cx, action);
        if let Some(state) = cx.goto {
            self.set_state(state);
        }
    }

    fn holds(&mut self, scope: &mut Scope<'_>, event: EventId) -> bool {
        let mut cx = self.context(scope);
        let holds = self.behavior.event(&mut cx, event);
        if let Some(state) = cx.goto {
            self.set_state(state);
        }
        holds
    }

    fn take(&mut self, target: StateId, column: EventId) {
        self.set_state(target);
        self.last_event = Some(column);
        self.pending_event = None;
    }

    fn step(&mut self, scope: &mut Scope<'_>) {
        self.cycle(scope);
    }

    fn accepts(&self, event: EventId) -> bool {
        match (&self.table, self.current) {
            (Some(table), Some(state)) => table.transition(state, event).is_some(),
            _ => false,
        }
    }

    fn pending(&self) -> Option<EventId> {
        self.pending_event
    }

    fn inject(&mut self, event: EventId) {
        self.pending_event = Some(event);
    }

    fn retries(&self) -> u8 {
        self.retries
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("label", &self.label())
            .field("class_label", &self.class_label)
            .field("current", &self.current)
            .field("next", &self.next)
            .field("asleep", &self.asleep)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
