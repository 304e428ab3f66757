//! Byte sinks a logger writes into
//!
//! Provides the [`Sink`] contract, an adapter for plain writers, an in-memory line
//! buffer, and a rolling log file with retention.

mod buffer;
mod retention;
mod rolling;

use std::fs::File;
use std::io::{self, Write};

pub use buffer::{LineBuffer, MemorySink};
pub use retention::{cleanup_rotated, DEFAULT_RETENTION_DAYS};
pub use rolling::{Rotation, RollingFile};

/// A destination for formatted log lines
pub trait Sink: Write + Send {
    /// Release the destination
    ///
    /// Writes after a successful close are not expected to succeed.
    fn close(&mut self) -> io::Result<()>;
}

impl Sink for File {
    fn close(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Adapter giving any writer a close that does nothing
#[derive(Debug)]
pub struct NopCloser<W>(W);

impl<W> NopCloser<W> {
    pub fn new(writer: W) -> Self {
        Self(writer)
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> Write for NopCloser<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write + Send> Sink for NopCloser<W> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
