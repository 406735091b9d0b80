//! War-room event log
//!
//! Append-only record of bridge activity. Entries carry the wall-clock
//! time they were written; only a full war-room reset clears the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was appended
    pub time: DateTime<Utc>,
    /// What happened
    pub message: String,
}

impl LogEntry {
    /// `HH:MM:SS` rendering of the entry time
    #[must_use]
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

/// Append-only event log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current time; returns its index
    pub fn append(&mut self, message: impl Into<String>) -> usize {
        self.entries.push(LogEntry {
            time: Utc::now(),
            message: message.into(),
        });
        self.entries.len() - 1
    }

    /// Entries, oldest first
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_order() {
        let mut log = EventLog::new();
        assert_eq!(log.append("first"), 0);
        assert_eq!(log.append("second"), 1);
        let messages: Vec<_> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
        assert!(log.entries()[0].time <= log.entries()[1].time);
    }

    #[test]
    fn time_label_is_clock_time() {
        let mut log = EventLog::new();
        log.append("x");
        let label = log.entries()[0].time_label();
        assert_eq!(label.len(), 8);
        assert_eq!(label.matches(':').count(), 2);
    }
}
