//SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::context::Context;
use crate::log_entry::LogEntry;
use crate::merge_cache::MergeCache;
use std::borrow::Cow;
use std::fmt::Debug;

/**
A logger that entries can be written through.

This is the capability a [`LoggerWithContext`](crate::LoggerWithContext) needs from
whatever it wraps: report a level, and accept finished entries.
*/
pub trait Logger: Debug + Send + Sync {
    /**
    The current level.  Entries below it are not logged.
    */
    fn level(&self) -> Level;

    /**
        Submits a finished entry for formatting, redaction, and writing.

        The severity check has already happened; implementations write unconditionally
        (or skip silently if they have nowhere to write).
    */
    fn write_entry(&self, entry: LogEntry);

    /**
    The program name attached to entries, if any.
    */
    fn progname(&self) -> Option<&str> {
        None
    }

    /**
    A fresh merge cache configured the way this logger's decorators should use.
    */
    fn new_merge_cache(&self) -> MergeCache {
        MergeCache::new()
    }

    fn is_enabled(&self, severity: Level) -> bool {
        severity >= self.level()
    }
}

/**
A log message: text, nothing, or a deferred producer.

Deferred messages are evaluated only if the entry is actually logged, so expensive
formatting costs nothing when the severity is disabled.

```rust
use contextwise::{ContextLog, ContextualLogger, InMemorySink, Level, Message};
use std::sync::Arc;

let logger = ContextualLogger::new(Arc::new(InMemorySink::new())).with_level(Level::Warn);
logger.debug(Message::deferred(|| unreachable!("not evaluated below the level")));
```
*/
pub enum Message<'a> {
    None,
    Text(Cow<'a, str>),
    Deferred(Box<dyn FnOnce() -> String + 'a>),
}

impl<'a> Message<'a> {
    pub fn deferred(f: impl FnOnce() -> String + 'a) -> Self {
        Message::Deferred(Box::new(f))
    }

    /// Produces the message text, running a deferred producer.
    pub fn resolve(self) -> Option<String> {
        match self {
            Message::None => None,
            Message::Text(text) => Some(text.into_owned()),
            Message::Deferred(f) => Some(f()),
        }
    }
}

impl Debug for Message<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::None => f.write_str("Message::None"),
            Message::Text(text) => f.debug_tuple("Message::Text").field(text).finish(),
            Message::Deferred(_) => f.write_str("Message::Deferred(..)"),
        }
    }
}

impl<'a> From<&'a str> for Message<'a> {
    fn from(text: &'a str) -> Self {
        Message::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Message<'_> {
    fn from(text: String) -> Self {
        Message::Text(Cow::Owned(text))
    }
}

impl<'a> From<Cow<'a, str>> for Message<'a> {
    fn from(text: Cow<'a, str>) -> Self {
        Message::Text(text)
    }
}

impl From<Option<String>> for Message<'_> {
    fn from(text: Option<String>) -> Self {
        text.map_or(Message::None, Message::from)
    }
}

impl From<()> for Message<'_> {
    fn from(_: ()) -> Self {
        Message::None
    }
}

/**
Logging with context.

Implementors provide [`ContextLog::log_with`]; the severity methods are thin
wrappers over it.  Each `*_with` variant also takes a per-call extra context.
*/
pub trait ContextLog {
    /**
    Logs `message` at `severity` with `extra` merged on top of every other context layer.

    Returns `true`: logging never reports failure to the caller.
    */
    fn log_with(&self, severity: Level, message: Message<'_>, extra: &Context) -> bool;

    fn log<'m>(&self, severity: Level, message: impl Into<Message<'m>>) -> bool {
        self.log_with(severity, message.into(), &Context::new())
    }

    fn debug<'m>(&self, message: impl Into<Message<'m>>) -> bool {
        self.log(Level::Debug, message)
    }

    fn debug_with<'m>(&self, message: impl Into<Message<'m>>, extra: &Context) -> bool {
        self.log_with(Level::Debug, message.into(), extra)
    }

    fn info<'m>(&self, message: impl Into<Message<'m>>) -> bool {
        self.log(Level::Info, message)
    }

    fn info_with<'m>(&self, message: impl Into<Message<'m>>, extra: &Context) -> bool {
        self.log_with(Level::Info, message.into(), extra)
    }

    fn warn<'m>(&self, message: impl Into<Message<'m>>) -> bool {
        self.log(Level::Warn, message)
    }

    fn warn_with<'m>(&self, message: impl Into<Message<'m>>, extra: &Context) -> bool {
        self.log_with(Level::Warn, message.into(), extra)
    }

    fn error<'m>(&self, message: impl Into<Message<'m>>) -> bool {
        self.log(Level::Error, message)
    }

    fn error_with<'m>(&self, message: impl Into<Message<'m>>, extra: &Context) -> bool {
        self.log_with(Level::Error, message.into(), extra)
    }

    fn fatal<'m>(&self, message: impl Into<Message<'m>>) -> bool {
        self.log(Level::Fatal, message)
    }

    fn fatal_with<'m>(&self, message: impl Into<Message<'m>>, extra: &Context) -> bool {
        self.log_with(Level::Fatal, message.into(), extra)
    }

    fn unknown<'m>(&self, message: impl Into<Message<'m>>) -> bool {
        self.log(Level::Unknown, message)
    }

    fn unknown_with<'m>(&self, message: impl Into<Message<'m>>, extra: &Context) -> bool {
        self.log_with(Level::Unknown, message.into(), extra)
    }
}

/*
Boilerplate notes.

# Logger

Clone on a logger makes little sense (decorators hold an Arc of what they wrap).
PartialEq/Eq would have to pick between data equality and identity; avoid.

# Message

Not Clone: a deferred producer runs at most once.
*/
