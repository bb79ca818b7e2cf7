//! A pulse detector: reports a LOW -> HIGH pulse on a digital pin that
//! stays high for at least a minimum number of milliseconds.

#![allow(dead_code)]

use automata::connector::Connector;
use automata::core::{ActionId, EventId, Slot, Symbols, TableError, TransitionTable, NONE};
use automata::machine::{Action, Automaton, Context, Machine};
use automata::signal::TimerMillis;
use std::rc::Rc;

pub const IDLE: Slot = 0;
pub const WAIT: Slot = 1;
pub const PULSE: Slot = 2;

pub const EVT_TIMER: EventId = 0;
pub const EVT_HIGH: EventId = 1;
pub const EVT_LOW: EventId = 2;
const EVENTS: usize = 3;

pub const ACT_PULSE: ActionId = 0;

pub const SYMBOLS: &str = "EVT_TIMER\0EVT_HIGH\0EVT_LOW\0ELSE\0IDLE\0WAIT\0PULSE\0";

pub fn table() -> Result<TransitionTable, TableError> {
    #[rustfmt::skip]
    let rows = [
        /*             ON_ENTER  ON_LOOP  ON_EXIT  EVT_TIMER  EVT_HIGH  EVT_LOW  ELSE */
        /* IDLE  */ [NONE,     NONE,    NONE,    NONE,      WAIT,     NONE,    NONE],
        /* WAIT  */ [NONE,     NONE,    NONE,    PULSE,     NONE,     IDLE,    NONE],
        /* PULSE */ [0,        NONE,    NONE,    NONE,      NONE,     IDLE,    NONE],
    ];
    TransitionTable::from_rows(&rows, EVENTS)
}

pub struct Pulse {
    pin: u8,
    timer: TimerMillis,
    on_pulse: Connector,
}

impl Pulse {
    pub fn new(pin: u8, minimum_ms: u32, on_pulse: Connector) -> Self {
        Self {
            pin,
            timer: TimerMillis::new(minimum_ms),
            on_pulse,
        }
    }

    /// A detector machine bound to `table`, labelled `label`.
    pub fn machine(self, table: Rc<TransitionTable>, label: &'static str) -> Machine {
        let mut machine = Machine::new("PULSE", self);
        machine.begin(table).set_label(label);
        machine
    }
}

impl Automaton for Pulse {
    fn event(&mut self, cx: &mut Context<'_>, id: EventId) -> bool {
        match id {
            EVT_TIMER => self.timer.expired(cx),
            EVT_HIGH => cx.read_pin(self.pin),
            EVT_LOW => !cx.read_pin(self.pin),
            _ => false,
        }
    }

    fn action(&mut self, cx: &mut Context<'_>, action: Action) {
        if action == Action::Run(ACT_PULSE) {
            self.on_pulse.push(cx, false);
        }
    }
}

pub fn symbols() -> Symbols {
    Symbols::new(SYMBOLS)
}
