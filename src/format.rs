// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning entries into lines.

use crate::log_entry::LogEntry;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::sync::Arc;

type FormatterFn =
    dyn Fn(&str, &DateTime<Utc>, Option<&str>, &Map<String, Value>) -> String + Send + Sync;

/// Renders a [`LogEntry`] into the text handed to the sink.
///
/// The default renders one JSON object per line (see
/// [`LogEntry::message_with_context`] for the key order).  A custom formatter
/// receives the severity label, the timestamp, the progname, and the
/// message-with-context map, and returns the complete text to write, including
/// any trailing newline.
///
/// ```rust
/// use contextwise::EntryFormatter;
///
/// let formatter = EntryFormatter::new(|severity, _timestamp, _progname, fields| {
///     format!("{severity}: {}\n", fields["message"])
/// });
/// ```
#[derive(Clone, Default)]
pub struct EntryFormatter {
    custom: Option<Arc<FormatterFn>>,
}

impl EntryFormatter {
    pub fn new(
        f: impl Fn(&str, &DateTime<Utc>, Option<&str>, &Map<String, Value>) -> String
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            custom: Some(Arc::new(f)),
        }
    }

    /// The default single-line JSON formatter.
    pub fn json() -> Self {
        Self::default()
    }

    pub fn is_json(&self) -> bool {
        self.custom.is_none()
    }

    pub fn format(&self, entry: &LogEntry) -> String {
        self.format_fields(entry, entry.message_with_context())
    }

    /// Renders `entry` using `fields` in place of its message-with-context map.
    pub fn format_fields(&self, entry: &LogEntry, fields: Map<String, Value>) -> String {
        match &self.custom {
            Some(f) => f(
                entry.severity().label(),
                &entry.timestamp(),
                entry.progname(),
                &fields,
            ),
            None => format!("{}\n", Value::Object(fields)),
        }
    }
}

impl Debug for EntryFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_json() {
            f.write_str("EntryFormatter::Json")
        } else {
            f.write_str("EntryFormatter::Custom")
        }
    }
}
