// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! This module provides an in-memory sink for testing and inspection.
//! The `InMemorySink` captures formatted entries in memory rather than writing
//! them anywhere, making it ideal for:
//!
//! - Unit testing code that logs through contextwise
//! - Asserting on exactly what would have left the process, after redaction
//! - Programmatically examining log output
//!
//! ## Architecture
//!
//! The sink keeps a `Mutex<Vec<String>>`, one element per entry, so multiple
//! threads can log concurrently while a test reads a consistent snapshot.

use crate::sink::Sink;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An in-memory sink that stores formatted entries in a `Vec<String>`.
///
/// # Example
///
/// ```rust
/// use contextwise::{ContextLog, ContextualLogger, InMemorySink};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let logger = ContextualLogger::new(sink.clone());
///
/// logger.info("Test message");
///
/// let logs = sink.drain_logs();
/// assert!(logs.contains(r#""message":"Test message""#));
/// ```
#[derive(Debug)]
pub struct InMemorySink {
    logs: Mutex<Vec<String>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: derived, required by Sink
// - Default: empty buffer
// - Clone: NOT implemented - a cloned buffer would silently stop seeing entries
// - PartialEq/Eq/Hash: NOT implemented - equality of live buffers is unclear
// - Send/Sync: automatic through Mutex

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    /// Creates a new `InMemorySink` with an empty buffer.
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drains all entries into a single string, clearing the internal buffer.
    ///
    /// Entries are concatenated as written; formatted entries normally end in a
    /// newline already.
    pub fn drain_logs(&self) -> String {
        let mut logs = self.lock();
        let result = logs.concat();
        logs.clear();
        result
    }

    /// Returns a copy of the captured entries without clearing them.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Parses each captured entry as JSON.
    ///
    /// Entries that are not JSON (for example from a custom formatter) are skipped.
    pub fn json_entries(&self) -> Vec<serde_json::Value> {
        self.lock()
            .iter()
            .filter_map(|line| serde_json::from_str(line.trim_end()).ok())
            .collect()
    }

    /// Writes all captured entries to stderr, clearing the internal buffer.
    pub fn drain_to_console(&self) {
        let mut logs = self.lock();
        for log in logs.iter() {
            eprint!("{}", log);
        }
        logs.clear();
    }
}

impl Sink for InMemorySink {
    fn write(&self, entry: &str) {
        self.lock().push(entry.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_clears() {
        let sink = InMemorySink::new();
        sink.write("{\"a\":1}\n");
        sink.write("plain\n");
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.json_entries(), vec![serde_json::json!({"a": 1})]);
        assert_eq!(sink.drain_logs(), "{\"a\":1}\nplain\n");
        assert!(sink.is_empty());
        assert_eq!(sink.drain_logs(), "");
    }
}
