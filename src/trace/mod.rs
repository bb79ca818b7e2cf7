//! Diagnostic transition tracing.
//!
//! A full [`Machine`](crate::machine::Machine) with a trace sink attached
//! reports every committed transition as a [`TraceRecord`], with state and
//! event names resolved through its [`Symbols`](crate::core::Symbols).

mod history;

pub use history::{TraceHistory, TransitionRecord};

use chrono::Utc;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// One committed transition, borrowed from the machine that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord<'a> {
    pub machine: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub event: &'a str,
    pub elapsed_ms: u64,
    pub cycles: u32,
}

/// Destination for trace records.
pub trait TraceSink {
    fn record(&mut self, record: &TraceRecord<'_>);
}

impl<F> TraceSink for F
where
    F: FnMut(&TraceRecord<'_>),
{
    fn record(&mut self, record: &TraceRecord<'_>) {
        self(record)
    }
}

/// Emits each transition as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&mut self, record: &TraceRecord<'_>) {
        tracing::debug!(
            machine = record.machine,
            from = record.from,
            to = record.to,
            event = record.event,
            elapsed_ms = record.elapsed_ms,
            cycles = record.cycles,
            "transition"
        );
    }
}

/// Writes one line per transition to a byte stream.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for WriterSink<W> {
    fn record(&mut self, record: &TraceRecord<'_>) {
        let written = writeln!(
            self.writer,
            "{} {} -> {} on {} ({} ms, {} cycles)",
            record.machine, record.from, record.to, record.event, record.elapsed_ms, record.cycles
        );
        if let Err(e) = written {
            tracing::warn!(error = %e, "trace write failed");
        }
    }
}

/// Collects records into a shared [`TraceHistory`]. Clones share the history.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    history: Rc<RefCell<TraceHistory>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn history(&self) -> TraceHistory {
        self.history.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.history.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.borrow().is_empty()
    }
}

impl TraceSink for TraceLog {
    fn record(&mut self, record: &TraceRecord<'_>) {
        self.history
            .borrow_mut()
            .record(TransitionRecord::from_trace(record, Utc::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: TraceRecord<'static> = TraceRecord {
        machine: "led",
        from: "OFF",
        to: "ON",
        event: "EVT_BLINK",
        elapsed_ms: 250,
        cycles: 9,
    };

    #[test]
    fn writer_sink_formats_one_line() {
        let mut sink = WriterSink::new(Vec::new());
        sink.record(&RECORD);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "led OFF -> ON on EVT_BLINK (250 ms, 9 cycles)\n");
    }

    #[test]
    fn closures_are_sinks() {
        fn sink_of<F: FnMut(&TraceRecord<'_>)>(f: F) -> F {
            f
        }

        let mut seen = Vec::new();
        {
            let mut sink = sink_of(|r| seen.push(r.to.to_string()));
            sink.record(&RECORD);
        }
        assert_eq!(seen, vec!["ON".to_string()]);
    }

    #[test]
    fn trace_log_clones_share_history() {
        let log = TraceLog::new();
        let mut sink = log.clone();
        sink.record(&RECORD);

        assert_eq!(log.len(), 1);
        assert_eq!(log.history().get_path(), vec!["OFF", "ON"]);
    }

    #[test]
    fn log_sink_accepts_records() {
        LogSink.record(&RECORD);
    }
}
