//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# contextwise

contextwise is a contextual structured-logging layer for Rust.

# The problem

A log line is only as useful as the context around it.  "payment declined" tells you
nothing; "payment declined" with the request id, the user, the service and the upstream
that refused it tells you where to look.  But threading all of that through every call
site is tedious, and the bits of context live at very different places in a program:

* Some context belongs to *where the code runs*: the request being served, the job being
  processed.  It should follow execution down the call stack, and across `.await`.
* Some context belongs to *who is logging*: the Redis client, the frontend.  It should be
  bound once, when the logger is made.
* Some context belongs to *one call*: the id of the call that just failed.

And whatever ends up in a line, secrets registered with the process must never leave it.

# The pieces

| Piece                    | Role                                                                        |
|--------------------------|-----------------------------------------------------------------------------|
| [`AmbientContext`]       | Thread-local context installed for the duration of a scope                  |
| [`ApplyContext`]         | Carries a context into a future, installing it around every poll            |
| [`LoggerWithContext`]    | A decorator binding a fixed context to any [`Logger`]                       |
| [`MergeCache`]           | Remembers bound-context merges per distinct per-call context               |
| [`Redactor`]             | Replaces registered secrets in every serialized entry                       |
| [`ContextualLogger`]     | The base logger: level, progname, formatter, redactor, [`Sink`]            |
| [`registry`]             | Declared context keys: formatting and sensitivity                           |

Context layers merge deeply, and later layers win: ambient, then bound, then per-call.

# The API

```rust
use contextwise::{AmbientContext, ContextLog, ContextualLogger, InMemorySink, LoggerWithContext, context};
use std::sync::Arc;

let sink = Arc::new(InMemorySink::new());
let base = Arc::new(ContextualLogger::new(sink.clone()));
let redis = LoggerWithContext::for_log_source(base.clone(), "redis_client");

AmbientContext::with_scope(context! { "request_id" => "r-17" }, || {
    redis.error_with("connection refused", &context! { "call_id" => "234-123" });
});

let entry = &sink.json_entries()[0];
assert_eq!(entry["request_id"], "r-17");
assert_eq!(entry["log_source"], "redis_client");
assert_eq!(entry["call_id"], "234-123");
assert_eq!(entry["severity"], "ERROR");
```

Entries are written as one JSON object per line: context keys first, then `message`,
`severity`, `timestamp` and, when set, `progname`.  A custom [`EntryFormatter`] can replace
the line format; redaction applies to whatever it produces.

# Multithreading

Ambient context is per thread.  When spawning a thread, pass it
[`AmbientContext::current`] and install it there; when spawning a task, wrap the future in
[`ApplyContext`].  Loggers, caches and the redactor are all `Send + Sync` and can be shared
freely behind an [`Arc`](std::sync::Arc).

# Internal diagnostics

contextwise reports its own trouble (a flushed merge cache, a failed redaction) through
[`tracing`](https://docs.rs/tracing), never through itself.
*/

pub mod context;
mod config;
mod contextual_logger;
mod error;
mod format;
mod inmemory_sink;
mod level;
mod log_entry;
mod logger;
mod logger_with_context;
mod merge_cache;
mod redactor;
pub mod registry;
mod sink;
mod stderror_sink;

pub use config::{LEVEL_ENV_VAR, LoggerConfig};
pub use context::{AmbientContext, ApplyContext, Context, ContextGuard};
pub use contextual_logger::ContextualLogger;
pub use error::{Error, Result};
pub use format::EntryFormatter;
pub use inmemory_sink::InMemorySink;
pub use level::Level;
pub use log_entry::LogEntry;
pub use logger::{ContextLog, Logger, Message};
pub use logger_with_context::LoggerWithContext;
pub use merge_cache::{DEFAULT_CAPACITY, MergeCache, OverflowPolicy};
pub use redactor::{REDACTION_MARKER, Redactor};
pub use sink::{Sink, WriterSink};
pub use stderror_sink::StdErrorSink;

#[doc(hidden)]
pub mod hidden {
    pub use serde_json::json;
}
extern crate self as contextwise;
