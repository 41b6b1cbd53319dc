// SPDX-License-Identifier: MIT OR Apache-2.0

//! The base logger: level, sink, formatting, and redaction.

use crate::Level;
use crate::context::{AmbientContext, Context};
use crate::format::EntryFormatter;
use crate::log_entry::LogEntry;
use crate::logger::{ContextLog, Logger, Message};
use crate::merge_cache::{DEFAULT_CAPACITY, MergeCache, OverflowPolicy};
use crate::redactor::Redactor;
use crate::registry::ContextRegistry;
use crate::sink::Sink;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// A logger that writes context-enriched entries to a [`Sink`].
///
/// Every entry it writes, whether logged directly or through a
/// [`LoggerWithContext`](crate::LoggerWithContext) wrapping it, goes through the same
/// pipeline:
///
/// 1. the [`ContextRegistry`] is applied to the merged context,
/// 2. the [`Redactor`] replaces registered secrets in every field value,
/// 3. the [`EntryFormatter`] renders the entry (JSON lines by default),
/// 4. the [`Redactor`] runs again over the rendered text,
/// 5. the result is written to the sink.
///
/// A logger without a sink accepts entries and drops them.
///
/// ```rust
/// use contextwise::{AmbientContext, ContextLog, ContextualLogger, InMemorySink, context};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let logger = ContextualLogger::new(sink.clone()).with_progname("worker");
///
/// AmbientContext::with_scope(context! { "job_id" => 12 }, || {
///     logger.info_with("job started", &context! { "queue" => "default" });
/// });
///
/// let entry = &sink.json_entries()[0];
/// assert_eq!(entry["job_id"], 12);
/// assert_eq!(entry["queue"], "default");
/// assert_eq!(entry["progname"], "worker");
/// ```
#[derive(Debug)]
pub struct ContextualLogger {
    level: AtomicU8,
    progname: Option<String>,
    sink: Option<Arc<dyn Sink>>,
    formatter: EntryFormatter,
    redactor: Arc<Redactor>,
    registry: ContextRegistry,
    cache_capacity: usize,
    overflow_policy: OverflowPolicy,
}

impl ContextualLogger {
    /// A logger writing to `sink` at [`Level::Debug`], redacting with [`Redactor::global`].
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self::with_optional_sink(Some(sink))
    }

    /// A logger with nowhere to write.  Every call is a no-op.
    pub fn without_sink() -> Self {
        Self::with_optional_sink(None)
    }

    pub(crate) fn with_optional_sink(sink: Option<Arc<dyn Sink>>) -> Self {
        Self {
            level: AtomicU8::new(Level::Debug.as_u8()),
            progname: None,
            sink,
            formatter: EntryFormatter::json(),
            redactor: Redactor::global(),
            registry: ContextRegistry::new(),
            cache_capacity: DEFAULT_CAPACITY,
            overflow_policy: OverflowPolicy::Flush,
        }
    }

    pub fn with_level(self, level: Level) -> Self {
        self.set_level(level);
        self
    }

    pub fn with_progname(mut self, progname: impl Into<String>) -> Self {
        self.progname = Some(progname.into());
        self
    }

    pub fn with_formatter(mut self, formatter: EntryFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Uses `redactor` instead of the process-wide one.
    pub fn with_redactor(mut self, redactor: Arc<Redactor>) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn with_registry(mut self, registry: ContextRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sizes the merge caches of decorators created over this logger.
    pub fn with_merge_cache(mut self, capacity: usize, policy: OverflowPolicy) -> Self {
        self.cache_capacity = capacity;
        self.overflow_policy = policy;
        self
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    pub fn redactor(&self) -> &Arc<Redactor> {
        &self.redactor
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn flush(&self) {
        if let Some(sink) = &self.sink {
            sink.flush();
        }
    }

    fn emit(&self, sink: &dyn Sink, entry: LogEntry) {
        let applied = self.registry.apply(entry.context(), self.redactor.marker());
        let entry = entry.with_context(applied);
        match self.redacted_line(&entry) {
            Ok(line) => sink.write(&line),
            Err(error) => {
                //reported through tracing, never through a contextwise logger
                tracing::warn!(%error, "redaction failed; writing entry unredacted");
                let flagged_context = entry.context().clone().with("redaction_failed", true);
                let flagged = entry.with_context(flagged_context);
                sink.write(&self.formatter.format(&flagged));
            }
        }
    }

    //field values are redacted before serialization, where escaping would hide
    //secrets; the line pass covers whatever a custom formatter adds
    fn redacted_line(&self, entry: &LogEntry) -> crate::Result<String> {
        let mut fields = entry.message_with_context();
        for value in fields.values_mut() {
            self.redactor.redact_value(value)?;
        }
        let line = self.formatter.format_fields(entry, fields);
        Ok(self.redactor.redact(&line)?.into_owned())
    }
}

impl Logger for ContextualLogger {
    fn level(&self) -> Level {
        //only valid levels are ever stored
        Level::try_from(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Unknown)
    }

    fn write_entry(&self, entry: LogEntry) {
        if let Some(sink) = &self.sink {
            self.emit(sink.as_ref(), entry);
        }
    }

    fn progname(&self) -> Option<&str> {
        self.progname.as_deref()
    }

    fn new_merge_cache(&self) -> MergeCache {
        MergeCache::with_capacity(self.cache_capacity, self.overflow_policy)
    }
}

impl ContextLog for ContextualLogger {
    fn log_with(&self, severity: Level, message: Message<'_>, extra: &Context) -> bool {
        if self.sink.is_none() || !self.is_enabled(severity) {
            return true;
        }
        let context = AmbientContext::current().deep_merge(extra);
        let entry = LogEntry::now(severity, self.progname.clone(), message.resolve(), context);
        self.write_entry(entry);
        true
    }
}
