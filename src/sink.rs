// SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt::Debug;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/**
The destination of formatted entries.

A sink receives one fully formatted, already redacted entry per call.  Writes are
synchronous; retrying, buffering and backpressure are the sink's own business.
Sinks must not panic: a sink that cannot write should drop the entry.
*/
pub trait Sink: Debug + Send + Sync {
    /**
        Writes one formatted entry.
    */
    fn write(&self, entry: &str);

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn flush(&self) {}
}

/**
A sink over any [`Write`] implementation: a file, a socket, a `Vec<u8>`.

Write errors are ignored; logging never fails the host application.
*/
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send + Debug> Sink for WriterSink<W> {
    fn write(&self, entry: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.write_all(entry.as_bytes());
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.flush();
    }
}
