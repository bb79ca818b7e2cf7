//! Timing and input helpers for use inside automaton hooks.
//!
//! All of them are plain values an automaton embeds in its own struct and
//! consults from `event`/`action` with the [`Context`](crate::machine::Context)
//! it was handed.

mod counter;
mod pin;
mod timer;

pub use counter::Counter;
pub use pin::PinChange;
pub use timer::{TimerMicros, TimerMillis};
