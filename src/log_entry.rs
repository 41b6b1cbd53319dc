// SPDX-License-Identifier: MIT OR Apache-2.0

//! The log entry type.
//!
//! A [`LogEntry`] is what a logger hands to its base logger once the severity
//! check has passed and every context layer has been merged.  Entries are
//! created per call, formatted, redacted, written, and dropped; nothing keeps
//! them around.

use crate::Level;
use crate::context::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/**
A single log entry.

```rust
use contextwise::{LogEntry, Level, context};

let entry = LogEntry::now(Level::Info, None, Some("started".to_string()), context! { "pid" => 7 });
let fields = entry.message_with_context();
assert_eq!(fields["pid"], 7);
assert_eq!(fields["message"], "started");
assert_eq!(fields["severity"], "INFO");
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    severity: Level,
    timestamp: DateTime<Utc>,
    progname: Option<String>,
    message: Option<String>,
    context: Context,
}

impl LogEntry {
    pub fn new(
        severity: Level,
        timestamp: DateTime<Utc>,
        progname: Option<String>,
        message: Option<String>,
        context: Context,
    ) -> Self {
        Self {
            severity,
            timestamp,
            progname,
            message,
            context,
        }
    }

    /// An entry stamped with the current time.
    pub fn now(
        severity: Level,
        progname: Option<String>,
        message: Option<String>,
        context: Context,
    ) -> Self {
        Self::new(severity, Utc::now(), progname, message, context)
    }

    pub fn severity(&self) -> Level {
        self.severity
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn progname(&self) -> Option<&str> {
        self.progname.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The same entry with its context replaced.
    pub fn with_context(self, context: Context) -> Self {
        Self { context, ..self }
    }

    /// The timestamp as written into entries: RFC 3339, UTC, microseconds.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /**
    The context with the entry's own fields merged on top.

    Context keys come first, in insertion order, followed by `message`,
    `severity`, `timestamp`, and `progname` (only when present).  The entry's
    own fields overwrite context keys of the same name.
    */
    pub fn message_with_context(&self) -> Map<String, Value> {
        let mut fields = self.context.as_map().clone();
        fields.insert(
            "message".to_string(),
            self.message.clone().map_or(Value::Null, Value::String),
        );
        fields.insert(
            "severity".to_string(),
            Value::String(self.severity.label().to_string()),
        );
        fields.insert(
            "timestamp".to_string(),
            Value::String(self.formatted_timestamp()),
        );
        if let Some(progname) = &self.progname {
            fields.insert("progname".to_string(), Value::String(progname.clone()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn context_keys_come_first() {
        let entry = LogEntry::new(
            Level::Fatal,
            fixed_time(),
            None,
            Some("fatal message".to_string()),
            context! { "log_source" => "redis_client", "call_id" => "234-123" },
        );
        let rendered = Value::Object(entry.message_with_context()).to_string();
        assert_eq!(
            rendered,
            r#"{"log_source":"redis_client","call_id":"234-123","message":"fatal message","severity":"FATAL","timestamp":"2024-05-01T12:30:00.000000Z"}"#
        );
    }

    #[test]
    fn entry_fields_override_context() {
        let entry = LogEntry::new(
            Level::Info,
            fixed_time(),
            Some("worker".to_string()),
            None,
            context! { "severity" => "spoofed", "progname" => "spoofed" },
        );
        let fields = entry.message_with_context();
        assert_eq!(fields["severity"], "INFO");
        assert_eq!(fields["progname"], "worker");
        assert_eq!(fields["message"], Value::Null);
    }
}
