//! Human-readable names for events and states, used only for tracing.

use super::table::{EventId, StateId};
use std::borrow::Cow;

/// Name returned for the "no value" index.
pub const NONE_SYMBOL: &str = "*NONE*";

/// Look up the `id`-th name in a NUL-delimited name table.
///
/// `None` (the "no value" index) and indices past the end of the table map
/// to [`NONE_SYMBOL`].
///
/// ```rust
/// use automata::core::map_symbol;
///
/// let names = "EVT_ON\0EVT_OFF\0ELSE\0IDLE\0RUN";
/// assert_eq!(map_symbol(Some(1), names), "EVT_OFF");
/// assert_eq!(map_symbol(None, names), "*NONE*");
/// ```
pub fn map_symbol(id: Option<usize>, map: &str) -> &str {
    id.and_then(|id| map.split('\0').nth(id))
        .unwrap_or(NONE_SYMBOL)
}

/// Symbol table of an automaton: the event names (declared events followed by
/// `ELSE`), then the state names, all NUL-delimited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols {
    map: Cow<'static, str>,
}

impl Symbols {
    pub fn new(map: impl Into<Cow<'static, str>>) -> Self {
        Self { map: map.into() }
    }

    /// Name at ordinal `id`.
    pub fn name(&self, id: Option<usize>) -> &str {
        map_symbol(id, &self.map)
    }

    /// Name of an event column (`events` addresses `ELSE`).
    pub fn event(&self, event: Option<EventId>) -> &str {
        self.name(event)
    }

    /// Name of a state in a table declaring `events` events.
    pub fn state(&self, state: Option<StateId>, events: usize) -> &str {
        self.name(state.map(|s| s + events + 1))
    }
}
