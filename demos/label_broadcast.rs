//! Label Broadcast
//!
//! This example wires one detector to a group of lamps by class label.
//!
//! Key concepts:
//! - Label selectors (`.CLASS`, `prefix*`)
//! - Summed state queries across matching machines
//! - Machines triggering each other from inside a scheduling pass
//!
//! Run with: cargo run --example label_broadcast

mod pulse;

use automata::connector::Connector;
use automata::core::{EventId, Slot, TransitionTable, NONE};
use automata::factory::Factory;
use automata::machine::{Action, Automaton, Context, Machine};
use automata::platform::{FakeClock, FakePins, Platform};
use pulse::Pulse;
use std::rc::Rc;

const OFF: Slot = 0;
const ON: Slot = 1;
const EVT_TOGGLE: EventId = 0;

const SWITCH: u8 = 7;

/// A lamp that only changes state when triggered.
struct Lamp;

impl Automaton for Lamp {
    fn event(&mut self, _cx: &mut Context<'_>, _id: EventId) -> bool {
        false
    }

    fn action(&mut self, _cx: &mut Context<'_>, _action: Action) {}
}

fn main() {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    #[rustfmt::skip]
    let lamp_rows = [
        /*           ON_ENTER  ON_LOOP  ON_EXIT  EVT_TOGGLE  ELSE */
        /* OFF */ [NONE,     NONE,    NONE,    ON,         NONE],
        /* ON  */ [NONE,     NONE,    NONE,    OFF,        NONE],
    ];
    let lamp_table = Rc::new(TransitionTable::from_rows(&lamp_rows, 1).expect("lamp table"));

    let clock = FakeClock::new();
    let pins = FakePins::new();
    let mut factory = Factory::new(Platform::new(clock.clone(), pins.clone()));

    for label in ["hall1", "hall2", "porch"] {
        let mut lamp = Machine::new("LAMP", Lamp);
        lamp.begin(lamp_table.clone()).set_label(label);
        factory.add(lamp);
    }

    let mut to_lamps = Connector::new();
    to_lamps.set_label(".LAMP", EVT_TOGGLE);
    let table = Rc::new(pulse::table().expect("pulse table"));
    factory.add(Pulse::new(SWITCH, 10, to_lamps).machine(table, "switch"));

    factory.cycle();
    println!("lamps on: {}", factory.state(".LAMP"));

    pins.set(SWITCH, true);
    factory.cycle();
    clock.advance_millis(10);
    factory.cycle();
    pins.set(SWITCH, false);
    factory.cycle();
    println!("lamps on after switch pulse: {}", factory.state(".LAMP"));

    factory.trigger("hall*", EVT_TOGGLE);
    println!("hall lamps on: {}", factory.state("hall*"));
    println!("porch lamp on: {}", factory.state("porch"));
}
