//! Line header formatting
//!
//! Every entry is written as `<prefix><date> <time> <file>:<line>: <body>`, with
//! each annotation switched on by a [`Flags`] bit.

use std::fmt::Write as _;
use std::ops::{BitOr, BitOrAssign};
use std::panic::Location;

use chrono::{DateTime, Local, Utc};

use crate::error::LogError;

/// Annotations added in front of each entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// `2009/01/23`
    pub const DATE: Flags = Flags(1 << 0);
    /// `01:23:23`
    pub const TIME: Flags = Flags(1 << 1);
    /// `01:23:23.123123`, implies TIME
    pub const MICROSECONDS: Flags = Flags(1 << 2);
    /// Full source path and line: `/a/b/c/main.rs:23`
    pub const LONG_FILE: Flags = Flags(1 << 3);
    /// Final path element and line: `main.rs:23`, overrides LONG_FILE
    pub const SHORT_FILE: Flags = Flags(1 << 4);
    /// Use UTC rather than the local time zone
    pub const UTC: Flags = Flags(1 << 5);
    /// Initial values for the default logger
    pub const STD: Flags = Flags(Self::DATE.0 | Self::TIME.0);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a single flag name as used in configuration files
    pub fn from_name(name: &str) -> Result<Flags, LogError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Flags::DATE),
            "time" => Ok(Flags::TIME),
            "microseconds" | "micros" => Ok(Flags::MICROSECONDS),
            "longfile" | "long_file" => Ok(Flags::LONG_FILE),
            "shortfile" | "short_file" => Ok(Flags::SHORT_FILE),
            "utc" => Ok(Flags::UTC),
            "std" => Ok(Flags::STD),
            _ => Err(LogError::UnknownFlag(name.to_string())),
        }
    }

    /// Combine a list of flag names
    pub fn from_names<I, S>(names: I) -> Result<Flags, LogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(Flags::NONE, |acc, name| -> Result<Flags, LogError> {
                Ok(acc | Flags::from_name(name.as_ref())?)
            })
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

/// Render the header for an entry written at `now` from `caller`
pub fn header(prefix: &str, flags: Flags, now: DateTime<Utc>, caller: &Location<'_>) -> String {
    let mut out = String::with_capacity(prefix.len() + 48);
    out.push_str(prefix);

    let wants_time = flags.contains(Flags::TIME) || flags.contains(Flags::MICROSECONDS);
    if flags.contains(Flags::DATE) || wants_time {
        if flags.contains(Flags::UTC) {
            write_timestamp(&mut out, flags, now);
        } else {
            write_timestamp(&mut out, flags, now.with_timezone(&Local));
        }
    }

    if flags.contains(Flags::SHORT_FILE) || flags.contains(Flags::LONG_FILE) {
        let file = if flags.contains(Flags::SHORT_FILE) {
            short_file(caller.file())
        } else {
            caller.file()
        };
        let _ = write!(out, "{}:{}: ", file, caller.line());
    }

    out
}

fn write_timestamp<Tz>(out: &mut String, flags: Flags, ts: DateTime<Tz>)
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if flags.contains(Flags::DATE) {
        let _ = write!(out, "{} ", ts.format("%Y/%m/%d"));
    }
    if flags.contains(Flags::MICROSECONDS) {
        let _ = write!(out, "{} ", ts.format("%H:%M:%S%.6f"));
    } else if flags.contains(Flags::TIME) {
        let _ = write!(out, "{} ", ts.format("%H:%M:%S"));
    }
}

fn short_file(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
