//! Reduced interpreter for memory-constrained automata.

use super::{
    deliver, run_cycle, Action, Automaton, Context, Interpreter, Scope, TRIGGER_RETRIES,
};
use crate::core::{EventId, StateId, TransitionTable};
use std::rc::Rc;

/// Same table contract as [`Machine`](super::Machine) without labels,
/// tracing, the microsecond timestamp, the loop counter or a priority.
/// A factory services every tiny machine on every tiny pass.
pub struct TinyMachine {
    behavior: Box<dyn Automaton>,
    table: Option<Rc<TransitionTable>>,
    current: Option<StateId>,
    next: Option<StateId>,
    asleep: bool,
    cycling: bool,
    state_millis: u64,
    pending_event: Option<EventId>,
    retries: u8,
}

impl TinyMachine {
    pub fn new(behavior: impl Automaton + 'static) -> Self {
        Self {
            behavior: Box::new(behavior),
            table: None,
            current: None,
            next: Some(0),
            asleep: false,
            cycling: false,
            state_millis: 0,
            pending_event: None,
            retries: TRIGGER_RETRIES,
        }
    }

    pub fn begin(&mut self, table: Rc<TransitionTable>) -> &mut Self {
        self.table = Some(table);
        self.asleep = false;
        self
    }

    pub fn cycle(&mut self, scope: &mut Scope<'_>) {
        run_cycle(self, scope);
    }

    pub fn cycle_for(&mut self, scope: &mut Scope<'_>, ms: u64) {
        let start = scope.platform.millis();
        loop {
            self.cycle(scope);
            if scope.platform.millis().wrapping_sub(start) >= ms {
                break;
            }
        }
    }

    pub fn trigger(&mut self, scope: &mut Scope<'_>, event: EventId) -> bool {
        deliver(self, scope, event)
    }

    pub fn set_state(&mut self, state: StateId) -> &mut Self {
        if self.table.as_ref().is_some_and(|t| state >= t.states()) {
            tracing::warn!(state, "ignoring transition to unknown state");
            return self;
        }
        self.next = Some(state);
        self.asleep = false;
        self
    }

    pub fn state(&self) -> Option<StateId> {
        self.current
    }

    pub fn state_value(&self) -> i32 {
        self.current.map_or(-1, |s| s as i32)
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

    pub fn state_millis(&self) -> u64 {
        self.state_millis
    }

    pub fn set_retries(&mut self, retries: u8) -> &mut Self {
        self.retries = retries.max(1);
        self
    }
}

impl Interpreter for TinyMachine {
    fn claim(&mut self) -> Option<Rc<TransitionTable>> {
        if self.asleep || self.cycling {
            return None;
        }
        let table = self.table.clone()?;
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

    fn commit(&mut self, scope: &Scope<'_>, next: StateId) {
        self.current = Some(next);
        self.next = None;
        self.state_millis = scope.platform.millis();
    }

    fn set_asleep(&mut self, asleep: bool) {
        self.asleep = asleep;
    }

    fn act(&mut self, scope: &mut Scope<'_>, action: Action) {
        let mut cx = Context::new(scope, self.current, self.state_millis, None);
        self.behavior.action(&mut cx, action);
        if let Some(state) = cx.goto {
            self.set_state(state);
        }
    }

    fn holds(&mut self, scope: &mut Scope<'_>, event: EventId) -> bool {
        let mut cx = Context::new(scope, self.current, self.state_millis, None);
        let holds = self.behavior.event(&mut cx, event);
        if let Some(state) = cx.goto {
            self.set_state(state);
        }
        holds
    }

    fn take(&mut self, target: StateId, _column: EventId) {
        self.set_state(target);
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

impl std::fmt::Debug for TinyMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TinyMachine")
            .field("current", &self.current)
            .field("next", &self.next)
            .field("asleep", &self.asleep)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Slot, NONE, SLEEP};
    use crate::machine::recorder::Recorder;
    use crate::platform::{FakeClock, NoPins, Platform};

    const OFF: Slot = 0;
    const ON: Slot = 1;

    const EVT_TOGGLE: EventId = 0;

    fn table() -> Rc<TransitionTable> {
        #[rustfmt::skip]
        let rows = [
            /*           ON_ENTER  ON_LOOP  ON_EXIT  EVT_TOGGLE  ELSE */
            /* OFF */ [NONE,     SLEEP,   NONE,    ON,         NONE],
            /* ON  */ [0,        1,       2,       OFF,        NONE],
        ];
        Rc::new(TransitionTable::from_rows(&rows, 1).unwrap())
    }

    fn platform() -> Platform {
        Platform::new(FakeClock::new(), NoPins)
    }

    #[test]
    fn enters_initial_state_and_sleeps() {
        let platform = platform();
        let mut scope = Scope::new(&platform);
        let recorder = Recorder::default();
        let mut m = TinyMachine::new(recorder.clone());
        m.begin(table());

        m.cycle(&mut scope);
        assert_eq!(m.state(), Some(OFF as usize));
        assert!(m.is_asleep());

        let polls = recorder.polls();
        m.cycle(&mut scope);
        assert_eq!(recorder.polls(), polls);
    }

    #[test]
    fn predicate_drives_transition() {
        let platform = platform();
        let mut scope = Scope::new(&platform);
        let recorder = Recorder::default();
        recorder.hold(EVT_TOGGLE, true);
        let mut m = TinyMachine::new(recorder.clone());
        m.begin(table());

        m.cycle(&mut scope);
        m.cycle(&mut scope);

        assert_eq!(m.state(), Some(ON as usize));
        assert!(!m.is_asleep());
        assert_eq!(
            recorder.actions(),
            vec![
                Action::Switch,
                Action::Switch,
                Action::Run(0),
                Action::Run(1)
            ]
        );
    }

    #[test]
    fn trigger_delivers_to_sleeping_machine() {
        let platform = platform();
        let mut scope = Scope::new(&platform);
        let mut m = TinyMachine::new(Recorder::default());
        m.begin(table());
        m.cycle(&mut scope);

        assert!(m.trigger(&mut scope, EVT_TOGGLE));
        assert_eq!(m.state(), Some(ON as usize));

        assert!(m.trigger(&mut scope, EVT_TOGGLE));
        assert_eq!(m.state(), Some(OFF as usize));
        assert_eq!(m.state_value(), 0);
    }

    #[test]
    fn unknown_event_is_dropped() {
        let platform = platform();
        let mut scope = Scope::new(&platform);
        let mut m = TinyMachine::new(Recorder::default());
        m.begin(table());

        assert!(!m.trigger(&mut scope, 5));
        assert_eq!(m.state(), Some(OFF as usize));
    }

    struct MicrosSpy {
        seen: Rc<std::cell::Cell<Option<Option<u64>>>>,
    }

    impl Automaton for MicrosSpy {
        fn event(&mut self, _cx: &mut Context<'_>, _id: EventId) -> bool {
            false
        }

        fn action(&mut self, cx: &mut Context<'_>, _action: Action) {
            self.seen.set(Some(cx.state_micros()));
        }
    }

    #[test]
    fn hooks_see_no_microsecond_timestamp() {
        let platform = platform();
        let mut scope = Scope::new(&platform);
        let seen = Rc::new(std::cell::Cell::new(None));
        let mut m = TinyMachine::new(MicrosSpy { seen: seen.clone() });
        m.begin(table());

        m.cycle(&mut scope);
        assert_eq!(seen.get(), Some(None));
    }
}
