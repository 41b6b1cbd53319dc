// SPDX-License-Identifier: MIT OR Apache-2.0

//! A decorator that binds a fixed context to a logger.

use crate::Level;
use crate::context::{AmbientContext, Context};
use crate::log_entry::LogEntry;
use crate::logger::{ContextLog, Logger, Message};
use crate::merge_cache::MergeCache;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

//no level of our own; defer to the base logger
const LEVEL_UNSET: u8 = u8::MAX;

/// A logger that adds a bound context to every entry it logs.
///
/// Entries carry, from bottom to top (later layers win on key collisions):
///
/// 1. the ambient context of the calling thread or task,
/// 2. the bound context given at construction,
/// 3. the extra context passed to the call.
///
/// Layers 2 and 3 are merged through a [`MergeCache`], so a call site that keeps
/// passing the same extra context pays for the deep merge once.
///
/// Until a level is set on the decorator itself it follows the base logger's
/// level, as it is at each call.  Once set, its own level is authoritative.
///
/// ```rust
/// use contextwise::{ContextLog, ContextualLogger, InMemorySink, Level, Logger, LoggerWithContext};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let base = Arc::new(ContextualLogger::new(sink.clone()).with_level(Level::Fatal));
/// let logger = LoggerWithContext::for_log_source(base.clone(), "frontend");
///
/// logger.fatal("fatal message");
/// assert!(sink.drain_logs().starts_with(
///     r#"{"log_source":"frontend","message":"fatal message","severity":"FATAL","#
/// ));
///
/// base.set_level(Level::Info);
/// assert_eq!(logger.level(), Level::Info);
/// ```
pub struct LoggerWithContext<L: Logger + ?Sized> {
    base: Arc<L>,
    context: Context,
    level: AtomicU8,
    cache: MergeCache,
}

impl<L: Logger + ?Sized> LoggerWithContext<L> {
    /// Wraps `base`, binding `context`, following `base`'s level.
    pub fn new(base: Arc<L>, context: Context) -> Self {
        let cache = base.new_merge_cache();
        Self {
            base,
            context,
            level: AtomicU8::new(LEVEL_UNSET),
            cache,
        }
    }

    /// Wraps `base`, binding `context`, with a level of its own.
    pub fn with_level(base: Arc<L>, context: Context, level: Level) -> Self {
        let logger = Self::new(base, context);
        logger.set_level(level);
        logger
    }

    /// Wraps `base`, binding `{"log_source": name}`.
    pub fn for_log_source(base: Arc<L>, name: impl Into<String>) -> Self {
        Self::new(base, Context::new().with("log_source", name.into()))
    }

    /// Replaces the merge cache, e.g. to size it differently from the base's default.
    pub fn with_merge_cache(mut self, cache: MergeCache) -> Self {
        self.cache = cache;
        self
    }

    /// Sets this logger's own level.  From now on the base level is ignored.
    pub fn set_level(&self, level: Level) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Whether this logger has a level of its own.
    pub fn has_own_level(&self) -> bool {
        self.level.load(Ordering::Relaxed) != LEVEL_UNSET
    }

    pub fn base(&self) -> &Arc<L> {
        &self.base
    }

    /// The bound context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn merge_cache(&self) -> &MergeCache {
        &self.cache
    }

    /// The bound context deep-merged with `extra`, through the cache.
    pub fn merged_context(&self, extra: &Context) -> Context {
        self.cache.merged_context(&self.context, extra)
    }
}

impl<L: Logger + ?Sized> Debug for LoggerWithContext<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerWithContext")
            .field("base", &self.base)
            .field("context", &self.context)
            .field("level", &self.level())
            .field("cached_contexts", &self.cache.len())
            .finish()
    }
}

impl<L: Logger + ?Sized> Logger for LoggerWithContext<L> {
    fn level(&self) -> Level {
        match self.level.load(Ordering::Relaxed) {
            LEVEL_UNSET => self.base.level(),
            own => Level::try_from(own).unwrap_or(Level::Unknown),
        }
    }

    /// Entries arriving from an outer decorator get the bound context beneath theirs.
    fn write_entry(&self, entry: LogEntry) {
        let context = self.context.deep_merge(entry.context());
        self.base.write_entry(entry.with_context(context));
    }

    fn progname(&self) -> Option<&str> {
        self.base.progname()
    }

    fn new_merge_cache(&self) -> MergeCache {
        self.base.new_merge_cache()
    }
}

impl<L: Logger + ?Sized> ContextLog for LoggerWithContext<L> {
    fn log_with(&self, severity: Level, message: Message<'_>, extra: &Context) -> bool {
        if !self.is_enabled(severity) {
            return true;
        }
        let merged = self.merged_context(extra);
        let context = AmbientContext::current().deep_merge(&merged);
        let entry = LogEntry::now(
            severity,
            self.base.progname().map(str::to_string),
            message.resolve(),
            context,
        );
        self.base.write_entry(entry);
        true
    }
}
