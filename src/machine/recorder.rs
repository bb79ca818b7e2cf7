//! Recording automaton shared by the unit tests.

use super::{Action, Automaton, Context};
use crate::core::EventId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Events hold according to a shared bitmask; every poll and action is
/// recorded. Clones share all state.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    holding: Rc<Cell<u32>>,
    polls: Rc<Cell<u32>>,
    actions: Rc<RefCell<Vec<Action>>>,
}

impl Recorder {
    pub(crate) fn hold(&self, event: EventId, on: bool) {
        let mask = 1u32 << event;
        let holding = self.holding.get();
        self.holding
            .set(if on { holding | mask } else { holding & !mask });
    }

    pub(crate) fn polls(&self) -> u32 {
        self.polls.get()
    }

    pub(crate) fn actions(&self) -> Vec<Action> {
        self.actions.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.actions.borrow_mut().clear();
        self.polls.set(0);
    }
}

impl Automaton for Recorder {
    fn event(&mut self, _cx: &mut Context<'_>, id: EventId) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.holding.get() & (1u32 << id) != 0
    }

    fn action(&mut self, _cx: &mut Context<'_>, action: Action) {
        self.actions.borrow_mut().push(action);
    }
}
