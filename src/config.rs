// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for building a [`ContextualLogger`].
//!
//! The level may be given explicitly or taken from the `CONTEXTWISE_LOG_LEVEL`
//! environment variable; either way it is validated when the logger is built.

use crate::Level;
use crate::contextual_logger::ContextualLogger;
use crate::error::{Error, Result};
use crate::merge_cache::{DEFAULT_CAPACITY, OverflowPolicy};
use crate::sink::Sink;
use std::sync::Arc;

/// Environment variable consulted when no level is configured.
pub const LEVEL_ENV_VAR: &str = "CONTEXTWISE_LOG_LEVEL";

const DEFAULT_LEVEL: &str = "debug";

/// Configuration for a [`ContextualLogger`].
///
/// ```rust
/// use contextwise::{InMemorySink, Level, Logger, LoggerConfig, OverflowPolicy};
/// use std::sync::Arc;
///
/// let logger = LoggerConfig::new()
///     .with_level("warn")
///     .with_progname("billing")
///     .with_overflow_policy(OverflowPolicy::EvictOldest)
///     .build(Some(Arc::new(InMemorySink::new())))
///     .unwrap();
/// assert_eq!(logger.level(), Level::Warn);
/// assert_eq!(logger.progname(), Some("billing"));
///
/// assert!(LoggerConfig::new().with_level("loud").build(None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Level name (e.g. "info", "warn").
    /// If None, will be determined from the `CONTEXTWISE_LOG_LEVEL` environment variable
    pub level: Option<String>,

    /// Program name attached to every entry
    pub progname: Option<String>,

    /// Distinct extra contexts each decorator remembers
    pub cache_capacity: usize,

    /// What a full merge cache does with a new shape
    pub overflow_policy: OverflowPolicy,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: None,
            progname: None,
            cache_capacity: DEFAULT_CAPACITY,
            overflow_policy: OverflowPolicy::Flush,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_progname(mut self, progname: impl Into<String>) -> Self {
        self.progname = Some(progname.into());
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// The level this configuration resolves to.
    ///
    /// Precedence: the configured level, then `CONTEXTWISE_LOG_LEVEL`, then "debug".
    pub fn effective_level(&self) -> Result<Level> {
        let env = std::env::var(LEVEL_ENV_VAR).ok();
        resolve_level(self.level.as_deref(), env.as_deref())
    }

    /// Builds a logger writing to `sink`.  With no sink, every call is a no-op.
    pub fn build(&self, sink: Option<Arc<dyn Sink>>) -> Result<ContextualLogger> {
        if self.cache_capacity == 0 {
            return Err(Error::InvalidArgument(
                "merge cache capacity must be at least 1".to_string(),
            ));
        }
        let level = self.effective_level()?;
        let mut logger = ContextualLogger::with_optional_sink(sink)
            .with_level(level)
            .with_merge_cache(self.cache_capacity, self.overflow_policy);
        if let Some(progname) = &self.progname {
            logger = logger.with_progname(progname.clone());
        }
        Ok(logger)
    }
}

fn resolve_level(configured: Option<&str>, env: Option<&str>) -> Result<Level> {
    let name = configured
        .or(env.filter(|value| !value.trim().is_empty()))
        .unwrap_or(DEFAULT_LEVEL);
    name.parse()
}
