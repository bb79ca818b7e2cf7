//! Transition tables.
//!
//! A table is a row-major grid with one row per state. Every row has the
//! same layout:
//!
//! ```text
//! [on-enter, on-loop, on-exit, event 0, ..., event N-1, ELSE]
//! ```
//!
//! The first three slots hold action identifiers, the remaining slots hold
//! target state indices. [`NONE`] means "nothing here" in any slot, and the
//! on-loop slot may also hold [`SLEEP`].

use super::error::TableError;
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Raw table cell.
pub type Slot = i16;

/// Index of a state (a row of the table).
pub type StateId = usize;

/// Index of a declared event. The ELSE column has index `events()`.
pub type EventId = usize;

/// Identifier handed to the action hook.
pub type ActionId = u16;

/// Empty slot: no action, or no transition for this event.
pub const NONE: Slot = -1;

/// On-loop marker: stop auto-cycling until woken.
pub const SLEEP: Slot = -2;

/// Column of the on-enter action.
pub const ON_ENTER: usize = 0;
/// Column of the on-loop action.
pub const ON_LOOP: usize = 1;
/// Column of the on-exit action.
pub const ON_EXIT: usize = 2;
/// Number of fixed action columns preceding the event columns.
pub const FIXED_SLOTS: usize = 3;

/// Decoded on-loop slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSlot {
    /// No loop action declared.
    Idle,
    /// Entering this state puts the machine to sleep.
    Sleep,
    /// Run this action on every cycle spent in the state.
    Action(ActionId),
}

/// Validated, immutable transition table.
///
/// Row width is fixed at construction time from the number of declared
/// events and checked against every row.
///
/// # Example
///
/// ```rust
/// use automata::core::{TransitionTable, NONE, SLEEP};
///
/// //                     ON_ENTER  ON_LOOP  ON_EXIT  EVT_GO  ELSE
/// let table = TransitionTable::from_rows(&[
///     [NONE, SLEEP, NONE, 1, NONE], // IDLE
///     [0, NONE, NONE, NONE, 0],     // BUSY
/// ], 1).unwrap();
///
/// assert_eq!(table.width(), 5);
/// assert_eq!(table.states(), 2);
/// assert_eq!(table.transition(0, 0), Some(1));
/// assert_eq!(table.else_target(1), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct TransitionTable {
    slots: Vec<Slot>,
    events: usize,
}

#[derive(Deserialize)]
struct RawTable {
    slots: Vec<Slot>,
    events: usize,
}

impl TryFrom<RawTable> for TransitionTable {
    type Error = TableError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        TransitionTable::new(raw.slots, raw.events)
    }
}

/// Row width for a table declaring `events` events.
pub const fn row_width(events: usize) -> usize {
    FIXED_SLOTS + events + 1
}

impl TransitionTable {
    /// Bind a flattened table declaring `events` events.
    pub fn new(slots: impl Into<Vec<Slot>>, events: usize) -> Result<Self, TableError> {
        let slots = slots.into();
        let width = row_width(events);
        let mut checks: Vec<Validation<(), NonEmptyVec<TableError>>> = Vec::new();

        if slots.len() % width != 0 {
            checks.push(Validation::fail(TableError::RowWidth {
                row: slots.len() / width,
                expected: width,
                found: slots.len() % width,
            }));
        }
        checks.push(validate_rows(&slots, events));

        into_result(Validation::all_vec(checks).map(|_| ()))?;
        Ok(Self { slots, events })
    }

    /// Bind a table given as one slice per state.
    pub fn from_rows<R: AsRef<[Slot]>>(rows: &[R], events: usize) -> Result<Self, TableError> {
        let width = row_width(events);
        let mut checks: Vec<Validation<(), NonEmptyVec<TableError>>> = Vec::new();
        for (row, cells) in rows.iter().enumerate() {
            let found = cells.as_ref().len();
            if found != width {
                checks.push(Validation::fail(TableError::RowWidth {
                    row,
                    expected: width,
                    found,
                }));
            }
        }
        if rows.is_empty() {
            checks.push(Validation::fail(TableError::Empty));
        }
        if !checks.is_empty() {
            into_result(Validation::all_vec(checks).map(|_| ()))?;
        }

        let slots: Vec<Slot> = rows
            .iter()
            .flat_map(|cells| cells.as_ref().iter().copied())
            .collect();
        Self::new(slots, events)
    }

    /// Decode a table produced by [`TransitionTable::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TableError> {
        bincode::deserialize(bytes).map_err(|e| match *e {
            bincode::ErrorKind::Custom(msg) => TableError::Encoding(msg),
            other => TableError::Encoding(other.to_string()),
        })
    }

    /// Compact binary encoding of this table.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TableError> {
        bincode::serialize(self).map_err(|e| TableError::Encoding(e.to_string()))
    }

    /// Number of declared events (the ELSE column excluded).
    pub fn events(&self) -> usize {
        self.events
    }

    /// Slots per row.
    pub fn width(&self) -> usize {
        row_width(self.events)
    }

    /// Number of states (rows).
    pub fn states(&self) -> usize {
        self.slots.len() / self.width()
    }

    /// Column index of the ELSE slot, relative to the first event column.
    pub fn else_column(&self) -> EventId {
        self.events
    }

    /// The raw row of `state`.
    pub fn row(&self, state: StateId) -> Option<&[Slot]> {
        let width = self.width();
        let start = state.checked_mul(width)?;
        let end = start.checked_add(width)?;
        self.slots.get(start..end)
    }

    fn slot(&self, state: StateId, column: usize) -> Slot {
        match self.row(state).and_then(|row| row.get(column)) {
            Some(&slot) => slot,
            None => {
                tracing::warn!(state, column, "transition table index out of range");
                NONE
            }
        }
    }

    /// On-enter action of `state`.
    pub fn on_enter(&self, state: StateId) -> Option<ActionId> {
        action(self.slot(state, ON_ENTER))
    }

    /// On-exit action of `state`.
    pub fn on_exit(&self, state: StateId) -> Option<ActionId> {
        action(self.slot(state, ON_EXIT))
    }

    /// On-loop slot of `state`.
    pub fn on_loop(&self, state: StateId) -> LoopSlot {
        match self.slot(state, ON_LOOP) {
            SLEEP => LoopSlot::Sleep,
            slot => action(slot).map_or(LoopSlot::Idle, LoopSlot::Action),
        }
    }

    /// Target for event column `column` of `state`, where `column == events()`
    /// addresses the ELSE slot.
    pub fn target(&self, state: StateId, column: EventId) -> Option<StateId> {
        if column > self.events {
            return None;
        }
        let slot = self.slot(state, FIXED_SLOTS + column);
        usize::try_from(slot).ok()
    }

    /// Target for a declared event of `state`.
    pub fn transition(&self, state: StateId, event: EventId) -> Option<StateId> {
        if event >= self.events {
            return None;
        }
        self.target(state, event)
    }

    /// Target of the ELSE slot of `state`.
    pub fn else_target(&self, state: StateId) -> Option<StateId> {
        self.target(state, self.events)
    }
}

fn action(slot: Slot) -> Option<ActionId> {
    ActionId::try_from(slot).ok()
}

fn validate_rows(slots: &[Slot], events: usize) -> Validation<(), NonEmptyVec<TableError>> {
    let width = row_width(events);
    let states = slots.len() / width;
    let mut checks: Vec<Validation<(), NonEmptyVec<TableError>>> = Vec::new();

    if states == 0 {
        checks.push(Validation::fail(TableError::Empty));
    }

    for (row, cells) in slots.chunks_exact(width).enumerate() {
        for column in [ON_ENTER, ON_EXIT] {
            if cells[column] < NONE {
                checks.push(Validation::fail(TableError::BadActionSlot {
                    row,
                    column,
                    value: cells[column],
                }));
            }
        }
        if cells[ON_LOOP] < SLEEP {
            checks.push(Validation::fail(TableError::BadLoopSlot {
                row,
                value: cells[ON_LOOP],
            }));
        }
        for (column, &target) in cells.iter().enumerate().skip(FIXED_SLOTS) {
            let in_range = target == NONE || (target >= 0 && (target as usize) < states);
            if !in_range {
                checks.push(Validation::fail(TableError::StateOutOfRange {
                    row,
                    column,
                    target,
                    states,
                }));
            }
        }
    }

    if checks.is_empty() {
        return Validation::success(());
    }
    Validation::all_vec(checks).map(|_| ())
}

fn into_result(validation: Validation<(), NonEmptyVec<TableError>>) -> Result<(), TableError> {
    match validation {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => {
            let mut errors: Vec<TableError> = errors
                .iter()
                .cloned()
                .flat_map(|e| match e {
                    TableError::Invalid(inner) => inner,
                    other => vec![other],
                })
                .collect();
            if errors.len() == 1 {
                Err(errors.remove(0))
            } else {
                Err(TableError::Invalid(errors))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Slot = 0;
    const BUSY: Slot = 1;

    fn two_state() -> TransitionTable {
        TransitionTable::from_rows(
            &[
                [NONE, SLEEP, NONE, BUSY, NONE, NONE],
                [3, 4, 5, NONE, IDLE, IDLE],
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn width_counts_fixed_events_and_else() {
        let table = two_state();
        assert_eq!(table.width(), 6);
        assert_eq!(table.events(), 2);
        assert_eq!(table.states(), 2);
        assert_eq!(table.else_column(), 2);
    }

    #[test]
    fn accessors_decode_slots() {
        let table = two_state();
        assert_eq!(table.on_enter(0), None);
        assert_eq!(table.on_loop(0), LoopSlot::Sleep);
        assert_eq!(table.on_enter(1), Some(3));
        assert_eq!(table.on_loop(1), LoopSlot::Action(4));
        assert_eq!(table.on_exit(1), Some(5));
        assert_eq!(table.transition(0, 0), Some(1));
        assert_eq!(table.transition(0, 1), None);
        assert_eq!(table.else_target(1), Some(0));
    }

    #[test]
    fn transition_ignores_else_column() {
        let table = two_state();
        assert_eq!(table.transition(1, 2), None);
        assert_eq!(table.target(1, 2), Some(0));
        assert_eq!(table.target(1, 3), None);
    }

    #[test]
    fn out_of_range_state_reads_as_none() {
        let table = two_state();
        assert_eq!(table.row(9), None);
        assert_eq!(table.on_enter(9), None);
        assert_eq!(table.on_loop(9), LoopSlot::Idle);
        assert_eq!(table.else_target(9), None);
    }

    #[test]
    fn huge_state_index_reads_as_none() {
        let table = two_state();
        let state = usize::MAX / table.width();
        assert_eq!(table.row(state), None);
        assert_eq!(table.on_enter(state), None);
        assert_eq!(table.on_exit(state), None);
        assert_eq!(table.on_loop(state), LoopSlot::Idle);
        assert_eq!(table.target(state, 0), None);
        assert_eq!(table.row(usize::MAX), None);
    }

    #[test]
    fn rejects_short_row() {
        let result = TransitionTable::from_rows(&[vec![NONE, NONE, NONE, NONE]], 1);
        assert_eq!(
            result,
            Err(TableError::RowWidth {
                row: 0,
                expected: 5,
                found: 4
            })
        );
    }

    #[test]
    fn rejects_ragged_flat_table() {
        let result = TransitionTable::new(vec![NONE; 7], 1);
        assert!(matches!(
            result,
            Err(TableError::RowWidth {
                row: 1,
                expected: 5,
                found: 2
            })
        ));
    }

    #[test]
    fn rejects_empty_table() {
        let rows: [[Slot; 4]; 0] = [];
        assert_eq!(TransitionTable::from_rows(&rows, 0), Err(TableError::Empty));
        assert_eq!(TransitionTable::new(Vec::<Slot>::new(), 0), Err(TableError::Empty));
    }

    #[test]
    fn accumulates_all_violations() {
        let result = TransitionTable::from_rows(&[[SLEEP, -5, NONE, 7, NONE]], 1);
        match result {
            Err(TableError::Invalid(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TableError::BadActionSlot { column: 0, .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TableError::BadLoopSlot { value: -5, .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TableError::StateOutOfRange { target: 7, .. })));
            }
            other => panic!("expected accumulated violations, got {other:?}"),
        }
    }

    #[test]
    fn binary_encoding_round_trips() {
        let table = two_state();
        let bytes = table.to_bytes().unwrap();
        assert_eq!(TransitionTable::from_bytes(&bytes).unwrap(), table);
    }

    #[test]
    fn decoding_revalidates() {
        let bogus = RawTableOut {
            slots: vec![NONE, NONE, NONE, 4, NONE],
            events: 1,
        };
        let bytes = bincode::serialize(&bogus).unwrap();
        assert!(matches!(
            TransitionTable::from_bytes(&bytes),
            Err(TableError::Encoding(_))
        ));
    }

    #[test]
    fn json_deserialization_revalidates() {
        let ok: TransitionTable =
            serde_json::from_str(r#"{"slots":[-1,-2,-1,0,-1],"events":1}"#).unwrap();
        assert_eq!(ok.states(), 1);

        let bad = serde_json::from_str::<TransitionTable>(r#"{"slots":[-1,-2,-1],"events":1}"#);
        assert!(bad.is_err());
    }

    #[derive(Serialize)]
    struct RawTableOut {
        slots: Vec<Slot>,
        events: usize,
    }
}
