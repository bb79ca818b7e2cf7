//! Pulse Detector
//!
//! This example debounces a simulated button with a pulse detector machine.
//!
//! Key concepts:
//! - A transition table driven by pin and timer events
//! - A callback connector fired from an on-enter action
//! - Transition tracing through `tracing`
//!
//! Run with: RUST_LOG=debug cargo run --example pulse_detector

mod pulse;

use automata::connector::Connector;
use automata::factory::Factory;
use automata::platform::{FakeClock, FakePins, Platform};
use automata::trace::LogSink;
use pulse::Pulse;
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

const BUTTON: u8 = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let clock = FakeClock::new();
    let pins = FakePins::new();
    let mut factory = Factory::new(Platform::new(clock.clone(), pins.clone()));

    let presses = Rc::new(Cell::new(0));
    let counter = presses.clone();
    let mut on_pulse = Connector::new();
    on_pulse.set_callback(
        move |_| {
            counter.set(counter.get() + 1);
            0
        },
        0,
    );

    let table = Rc::new(pulse::table().expect("pulse table is well formed"));
    let mut button = Pulse::new(BUTTON, 20, on_pulse).machine(table, "button");
    button.set_trace(LogSink, pulse::symbols());
    factory.add(button);

    // (level, milliseconds held)
    let signal = [
        (true, 5),
        (false, 30),
        (true, 50),
        (false, 10),
        (true, 21),
        (false, 40),
    ];
    for (high, ms) in signal {
        pins.set(BUTTON, high);
        for _ in 0..ms {
            factory.cycle();
            clock.advance_millis(1);
        }
    }

    println!("presses detected: {}", presses.get());
}
