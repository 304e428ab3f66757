//! In-memory line sink
//!
//! A thread-safe ring buffer of recently written lines, for tests and for showing
//! recent output inside the process.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use super::Sink;

/// Thread-safe ring buffer of written lines
pub struct LineBuffer {
    /// All lines (capped at max_lines)
    lines: RwLock<VecDeque<String>>,
    /// Bytes of an unterminated trailing line
    pending: Mutex<Vec<u8>>,
    /// Total bytes ever written
    bytes: AtomicUsize,
    max_lines: usize,
}

impl LineBuffer {
    /// Create a new buffer holding at most `max_lines` lines
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: RwLock::new(VecDeque::with_capacity(max_lines.min(1024))),
            pending: Mutex::new(Vec::new()),
            bytes: AtomicUsize::new(0),
            max_lines,
        }
    }

    /// Append raw bytes, splitting them into lines
    pub fn append(&self, buf: &[u8]) {
        self.bytes.fetch_add(buf.len(), Ordering::Relaxed);

        let mut pending = match self.pending.lock() {
            Ok(p) => p,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.extend_from_slice(buf);

        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            self.push_line(line);
        }
    }

    fn push_line(&self, line: String) {
        if let Ok(mut lines) = self.lines.write() {
            if lines.len() >= self.max_lines {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    /// Get all complete lines
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .read()
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All complete lines joined back together, each newline-terminated
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Get the number of complete lines held
    pub fn len(&self) -> usize {
        self.lines.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes written, including evicted lines
    pub fn bytes_written(&self) -> usize {
        self.bytes.load(Ordering::Relaxed)
    }
}

/// Sink handle writing into a shared [`LineBuffer`]
#[derive(Clone)]
pub struct MemorySink {
    buffer: Arc<LineBuffer>,
}

impl MemorySink {
    pub fn new(max_lines: usize) -> Self {
        Self {
            buffer: Arc::new(LineBuffer::new(max_lines)),
        }
    }

    /// Shared view of everything written through this sink
    pub fn buffer(&self) -> Arc<LineBuffer> {
        Arc::clone(&self.buffer)
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for MemorySink {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
