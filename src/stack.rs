//! Call stack capture
//!
//! Captures the calling thread's stack with [`std::backtrace::Backtrace`] and keeps a
//! bounded number of frames, starting at the first frame outside the logger.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::{self, Write as _};
use std::str::Lines;

/// Default number of frames kept by [`Stack::capture`]
pub const DEFAULT_DEPTH: usize = 32;

/// Symbol prefixes that belong to the capture machinery or the logging path
const INTERNAL_PREFIXES: &[&str] = &[
    "std::backtrace",
    "std::sys",
    "std::thread::local::",
    "tracing::",
    "tracing_core::",
    "tracing_subscriber::",
    "levelog::stack::",
    "levelog::logger::",
    "levelog::facade::",
    "levelog::bridge::",
    "levelog::traced::",
];

/// A single resolved frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Demangled function name
    pub function: String,
    /// `file:line:col`, when debug info is available
    pub location: Option<String>,
}

/// A captured call stack, innermost frame first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    /// Capture the current stack with the default depth
    pub fn capture(skip: usize) -> Self {
        Self::capture_n(skip, DEFAULT_DEPTH)
    }

    /// Capture up to `depth` frames, dropping logger-internal frames and then `skip` more
    ///
    /// Returns an empty stack when the platform cannot unwind.
    pub fn capture_n(skip: usize, depth: usize) -> Self {
        let backtrace = Backtrace::force_capture();
        if backtrace.status() != BacktraceStatus::Captured {
            return Self::default();
        }

        // Display symbolizes every frame; std has no stable per-frame access
        let rendered = backtrace.to_string();
        let frames = FrameIter::new(&rendered)
            .skip_while(|f| is_internal(&f.function))
            .skip(skip)
            .take(depth)
            .collect();

        Self { frames }
    }

    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Render one frame per entry, every line prefixed with `indent` levels of four spaces
    pub fn to_string_with_indent(&self, indent: usize) -> String {
        let pad = "    ".repeat(indent);
        let mut out = String::new();
        for (i, frame) in self.frames.iter().enumerate() {
            let _ = writeln!(out, "{}{:2}. {}", pad, i, frame.function);
            if let Some(location) = &frame.location {
                let _ = writeln!(out, "{}        {}", pad, location);
            }
        }
        out
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_indent(0))
    }
}

fn is_internal(function: &str) -> bool {
    let function = function.trim_start_matches('<');
    if function.contains("::tests::") {
        return false;
    }
    INTERNAL_PREFIXES.iter().any(|p| function.starts_with(p))
}

/// Lazily parses the rendered form of a [`Backtrace`]
///
/// Relies on the current, unstable `Display` layout: frames look like
/// `  3: path::to::function`, each optionally followed by one or more
/// `at file:line:col` lines of which the first is kept. Anything else is ignored.
struct FrameIter<'a> {
    lines: Lines<'a>,
    /// Function line read ahead while collecting the previous frame's location
    next_function: Option<&'a str>,
}

impl<'a> FrameIter<'a> {
    fn new(rendered: &'a str) -> Self {
        Self {
            lines: rendered.lines(),
            next_function: None,
        }
    }
}

impl Iterator for FrameIter<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let function = match self.next_function.take() {
            Some(function) => function,
            None => loop {
                if let Some(function) = function_of(self.lines.next()?) {
                    break function;
                }
            },
        };

        let mut location = None;
        for line in self.lines.by_ref() {
            if let Some(at) = line.trim().strip_prefix("at ") {
                location.get_or_insert_with(|| at.to_string());
            } else if let Some(next) = function_of(line) {
                self.next_function = Some(next);
                break;
            }
        }

        Some(Frame {
            function: function.to_string(),
            location,
        })
    }
}

fn function_of(line: &str) -> Option<&str> {
    let (index, function) = line.trim().split_once(": ")?;
    (!index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())).then_some(function)
}

#[cfg(test)]
fn parse_frames(rendered: &str) -> Vec<Frame> {
    FrameIter::new(rendered).collect()
}
