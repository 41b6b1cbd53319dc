// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::sink::Sink;

/**
A reference sink that writes to stderr.
 */
#[derive(Debug, Clone)]
pub struct StdErrorSink {}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug/Clone: derived, zero-sized
// - Copy: zero-sized, no heap allocation
// - PartialEq/Eq/Hash: all instances are equivalent
// - Default: zero-argument constructor
// - Display: NOT implemented - no meaningful string representation for stderr

impl Copy for StdErrorSink {}

impl PartialEq for StdErrorSink {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for StdErrorSink {}

impl std::hash::Hash for StdErrorSink {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {}
}

impl Default for StdErrorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StdErrorSink {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Sink for StdErrorSink {
    fn write(&self, entry: &str) {
        use std::io::Write;
        let mut lock = std::io::stderr().lock();
        //nowhere left to report a failed stderr write
        let _ = lock.write_all(entry.as_bytes());
    }

    fn flush(&self) {
        use std::io::Write;
        let _ = std::io::stderr().lock().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextLog, ContextualLogger, Redactor};
    use std::sync::Arc;

    #[test]
    fn logs_to_stderr() {
        let logger = ContextualLogger::new(Arc::new(StdErrorSink::new()))
            .with_redactor(Arc::new(Redactor::new()));
        assert!(logger.info("hello from StdErrorSink"));
        logger.flush();
    }
}
