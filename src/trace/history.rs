//! Recorded transition history.
//!
//! Owned, timestamped copies of trace records, kept in commit order and
//! serializable for offline inspection.

use super::TraceRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One committed transition.
///
/// # Example
///
/// ```rust
/// use automata::trace::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     machine: "pump".to_string(),
///     from: "IDLE".to_string(),
///     to: "RUN".to_string(),
///     event: "EVT_START".to_string(),
///     elapsed_ms: 120,
///     cycles: 14,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "RUN");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Instance label of the machine
    pub machine: String,
    /// State being left
    pub from: String,
    /// State being entered
    pub to: String,
    /// Event that fired the transition
    pub event: String,
    /// Milliseconds spent in the state being left
    pub elapsed_ms: u64,
    /// Cycles spent in the state being left
    pub cycles: u32,
    /// Wall-clock time the transition committed
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    pub fn from_trace(record: &TraceRecord<'_>, timestamp: DateTime<Utc>) -> Self {
        Self {
            machine: record.machine.to_string(),
            from: record.from.to_string(),
            to: record.to.to_string(),
            event: record.event.to_string(),
            elapsed_ms: record.elapsed_ms,
            cycles: record.cycles,
            timestamp,
        }
    }
}

/// Ordered history of transitions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TraceHistory {
    records: Vec<TransitionRecord>,
}

impl TraceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition.
    pub fn record(&mut self, record: TransitionRecord) {
        self.records.push(record);
    }

    /// State names traversed: the first `from`, then every `to`.
    ///
    /// ```rust
    /// use automata::trace::{TraceHistory, TransitionRecord};
    /// use chrono::Utc;
    ///
    /// let step = |from: &str, to: &str| TransitionRecord {
    ///     machine: "m".to_string(),
    ///     from: from.to_string(),
    ///     to: to.to_string(),
    ///     event: "ELSE".to_string(),
    ///     elapsed_ms: 0,
    ///     cycles: 0,
    ///     timestamp: Utc::now(),
    /// };
    ///
    /// let mut history = TraceHistory::new();
    /// history.record(step("A", "B"));
    /// history.record(step("B", "C"));
    /// assert_eq!(history.get_path(), vec!["A", "B", "C"]);
    /// ```
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Wall-clock time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
