//! Property-based tests for the table interpreter and scheduler.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use automata::core::{row_width, EventId, Slot, TableError, TransitionTable, NONE};
use automata::factory::{Factory, FactoryConfig, LabelPattern, ScheduleStep};
use automata::machine::{Action, Automaton, Context, Machine, Scope};
use automata::platform::{FakeClock, NoPins, Platform};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

/// Events hold according to a fixed bitmask; polls are counted.
#[derive(Clone, Default)]
struct Mask {
    holding: u32,
    polls: Rc<Cell<u32>>,
}

impl Automaton for Mask {
    fn event(&mut self, _cx: &mut Context<'_>, id: EventId) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.holding & (1 << id) != 0
    }

    fn action(&mut self, _cx: &mut Context<'_>, _action: Action) {}
}

/// State 0 fans out: event k leads to state k + 1, ELSE to state E + 1.
/// Every other state is inert.
fn fan_out(events: usize) -> Rc<TransitionTable> {
    let states = events + 2;
    let mut rows = vec![vec![NONE; row_width(events)]; states];
    for event in 0..events {
        rows[0][3 + event] = (event + 1) as Slot;
    }
    rows[0][3 + events] = (events + 1) as Slot;
    Rc::new(TransitionTable::from_rows(&rows, events).unwrap())
}

/// One state whose only event loops back to itself and never holds, so
/// every cycle polls exactly once.
fn ticker() -> Rc<TransitionTable> {
    Rc::new(TransitionTable::from_rows(&[[NONE, NONE, NONE, 0, NONE]], 1).unwrap())
}

fn platform() -> Platform {
    Platform::new(FakeClock::new(), NoPins)
}

prop_compose! {
    fn arbitrary_label()(label in "[a-c]{0,4}") -> String {
        label
    }
}

proptest! {
    #[test]
    fn first_holding_event_wins(events in 1usize..10, holding in any::<u32>()) {
        let holding = holding & ((1u32 << events) - 1);
        let platform = platform();
        let mut scope = Scope::new(&platform);
        let mut machine = Machine::new("FAN", Mask { holding, ..Mask::default() });
        machine.begin(fan_out(events));

        machine.cycle(&mut scope);
        machine.cycle(&mut scope);

        let expected = if holding == 0 {
            events
        } else {
            holding.trailing_zeros() as usize
        };
        prop_assert_eq!(machine.last_event(), Some(expected));
        prop_assert_eq!(machine.state(), Some(expected + 1));
    }

    #[test]
    fn else_is_taken_only_when_nothing_holds(events in 1usize..10) {
        let platform = platform();
        let mut scope = Scope::new(&platform);
        let mask = Mask::default();
        let polls = mask.polls.clone();
        let mut machine = Machine::new("FAN", mask);
        machine.begin(fan_out(events));

        machine.cycle(&mut scope);
        prop_assert_eq!(machine.next_state(), Some(events + 1));
        prop_assert_eq!(polls.get() as usize, events);
    }

    #[test]
    fn rows_must_match_declared_width(
        events in 0usize..6,
        lengths in prop::collection::vec(0usize..12, 1..6),
    ) {
        let rows: Vec<Vec<Slot>> = lengths.iter().map(|&n| vec![NONE; n]).collect();
        let result = TransitionTable::from_rows(&rows, events);
        let well_formed = lengths.iter().all(|&n| n == events + 4);

        prop_assert_eq!(result.is_ok(), well_formed);
        if let Ok(table) = result {
            prop_assert_eq!(table.states(), lengths.len());
            prop_assert_eq!(table.width(), events + 4);
        }
    }

    #[test]
    fn every_bad_row_is_reported(events in 0usize..4, bad in 2usize..6) {
        let mut rows = vec![vec![NONE; events + 4]; bad + 1];
        for row in rows.iter_mut().skip(1) {
            row.push(NONE);
        }
        match TransitionTable::from_rows(&rows, events) {
            Err(TableError::Invalid(errors)) => prop_assert_eq!(errors.len(), bad),
            other => prop_assert!(false, "expected accumulated errors, got {:?}", other),
        }
    }

    #[test]
    fn prefix_selector_matches_by_prefix(prefix in arbitrary_label(), label in arbitrary_label()) {
        let selector = format!("{prefix}*");
        let pattern = LabelPattern::parse(&selector);
        prop_assert_eq!(pattern.matches_text(&label), label.starts_with(&prefix));

        let exact = LabelPattern::parse(&prefix);
        prop_assert_eq!(exact.matches_text(&label), label == prefix);
    }

    #[test]
    fn tiers_are_serviced_by_schedule_weight(passes in 1usize..20) {
        let mut factory = Factory::new(platform());
        let mut polls = Vec::new();
        for tier in 0..5u8 {
            let mask = Mask::default();
            polls.push(mask.polls.clone());
            let mut machine = Machine::new("TICK", mask);
            machine.begin(ticker()).set_priority(tier);
            factory.add(machine);
        }

        for _ in 0..passes {
            factory.cycle();
        }

        let config = FactoryConfig::default();
        for tier in 1..5u8 {
            let expected = config.visits(ScheduleStep::Tier(tier)) * passes;
            prop_assert_eq!(polls[usize::from(tier)].get() as usize, expected);
        }
        prop_assert_eq!(polls[0].get(), 0);
        prop_assert!(polls[1].get() > polls[4].get());
        prop_assert!(polls[4].get() > polls[0].get());
    }

    #[test]
    fn undeliverable_trigger_leaves_machine_alone(retries in 1u8..12, events in 1usize..6) {
        let platform = platform();
        let mut scope = Scope::new(&platform);
        let mut machine = Machine::new("FAN", Mask::default());
        machine.begin(fan_out(events)).set_retries(retries);
        machine.cycle(&mut scope);
        machine.cycle(&mut scope);
        let state = machine.state();
        prop_assert_eq!(state, Some(events + 1));

        // The ELSE state is inert and declares nothing.
        prop_assert!(!machine.trigger(&mut scope, 0));
        prop_assert_eq!(machine.state(), state);
        prop_assert_eq!(machine.pending_event(), None);
    }
}
