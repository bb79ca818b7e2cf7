//! Transition table errors.

use thiserror::Error;

/// Errors detected while binding or decoding a transition table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Transition table has no states")]
    Empty,

    #[error("Row {row} has {found} slots, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}, column {column}: target state {target} out of range ({states} states)")]
    StateOutOfRange {
        row: usize,
        column: usize,
        target: i16,
        states: usize,
    },

    #[error("Row {row}, column {column}: invalid action slot {value}")]
    BadActionSlot { row: usize, column: usize, value: i16 },

    #[error("Row {row}: invalid on-loop slot {value}")]
    BadLoopSlot { row: usize, value: i16 },

    /// More than one violation was found; all of them are listed.
    #[error("Transition table has {} violations", .0.len())]
    Invalid(Vec<TableError>),

    #[error("Table encoding failed: {0}")]
    Encoding(String),
}
