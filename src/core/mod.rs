//! Core table model.
//!
//! This module contains the immutable data an automaton is specified by:
//! - The transition table and its slot encoding
//! - Symbol tables for diagnostic names
//! - Table validation errors
//!
//! Nothing in here has runtime state; tables are bound once and shared
//! read-only by every machine that uses them.

mod error;
mod symbols;
mod table;

pub use error::TableError;
pub use symbols::{map_symbol, Symbols, NONE_SYMBOL};
pub use table::{
    row_width, ActionId, EventId, LoopSlot, Slot, StateId, TransitionTable, FIXED_SLOTS, NONE,
    ON_ENTER, ON_EXIT, ON_LOOP, SLEEP,
};
