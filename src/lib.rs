//! Automata: table-driven state machines for cooperative, event-reactive
//! control code.
//!
//! An automaton is a compact transition table plus a pair of hooks. The
//! interpreter runs the table one cycle at a time; a factory owns many
//! machines and interleaves them on a single thread by priority tier.
//!
//! # Core Concepts
//!
//! - **Transition table**: one fixed-width row per state holding the
//!   on-enter, on-loop and on-exit actions, one target per event and a
//!   catch-all ELSE target
//! - **Automaton**: the hooks that say whether an event holds and perform
//!   actions
//! - **Machine**: an automaton bound to a table, cycled by hand or by a
//!   [`Factory`](factory::Factory)
//! - **Trigger**: injection of an event into a machine, retried until the
//!   machine sits in a state that accepts it
//!
//! # Example
//!
//! ```rust
//! use automata::core::{EventId, Slot, TransitionTable, NONE};
//! use automata::machine::{Action, Automaton, Context, Machine, Scope};
//! use automata::platform::{FakeClock, NoPins, Platform};
//! use automata::signal::TimerMillis;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! const OFF: Slot = 0;
//! const ON: Slot = 1;
//! const EVT_TIMER: EventId = 0;
//! const ACT_OFF: u16 = 0;
//! const ACT_ON: u16 = 1;
//!
//! struct Blink {
//!     timer: TimerMillis,
//!     lit: Rc<Cell<bool>>,
//! }
//!
//! impl Automaton for Blink {
//!     fn event(&mut self, cx: &mut Context<'_>, id: EventId) -> bool {
//!         id == EVT_TIMER && self.timer.expired(cx)
//!     }
//!
//!     fn action(&mut self, _cx: &mut Context<'_>, action: Action) {
//!         match action {
//!             Action::Run(ACT_OFF) => self.lit.set(false),
//!             Action::Run(ACT_ON) => self.lit.set(true),
//!             _ => {}
//!         }
//!     }
//! }
//!
//! #[rustfmt::skip]
//! let table = TransitionTable::from_rows(&[
//!     /*        ON_ENTER  ON_LOOP  ON_EXIT  EVT_TIMER  ELSE */
//!     /* OFF */ [0,        NONE,    NONE,    ON,        NONE],
//!     /* ON  */ [1,        NONE,    NONE,    OFF,       NONE],
//! ], 1).unwrap();
//!
//! let clock = FakeClock::new();
//! let platform = Platform::new(clock.clone(), NoPins);
//! let mut scope = Scope::new(&platform);
//!
//! let lit = Rc::new(Cell::new(false));
//! let mut led = Machine::new("BLINK", Blink { timer: TimerMillis::new(100), lit: lit.clone() });
//! led.begin(Rc::new(table));
//!
//! led.cycle(&mut scope);
//! assert_eq!(led.state(), Some(OFF as usize));
//!
//! clock.advance_millis(100);
//! led.cycle(&mut scope);
//! led.cycle(&mut scope);
//! assert_eq!(led.state(), Some(ON as usize));
//! assert!(lit.get());
//! ```

pub mod connector;
pub mod core;
pub mod factory;
pub mod machine;
pub mod platform;
pub mod signal;
pub mod trace;

// Re-export commonly used types
pub use connector::Connector;
pub use crate::core::{TableError, TransitionTable};
pub use factory::{Factory, FactoryConfig, MachineId, TinyId};
pub use machine::{Action, Automaton, Context, Machine, Scope, TinyMachine};
pub use platform::Platform;
