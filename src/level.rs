//! Severity levels and message categories
//!
//! A [`Level`] is the verbosity gate configured on a logger; a [`LogType`] is the
//! category a single message is written under. Levels are cumulative: enabling
//! `Debug` also enables `Info`, `Warn` and `Error`. Panic messages pass every gate.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::LogError;

/// Verbosity gate, ordered from quietest to loudest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    None,
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Log everything
    pub const ALL: Level = Level::Debug;

    /// Cumulative bitmask: level N carries the bits of every level below it
    pub fn mask(self) -> u8 {
        (1u8 << self as u8) - 1
    }

    /// Whether a message of type `ty` passes this level
    pub fn test(self, ty: LogType) -> bool {
        match ty {
            LogType::Panic => true,
            other => other.level().map_or(false, |needed| self >= needed),
        }
    }

    /// Get the canonical name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::None => "NONE",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }

    /// Parse a level literal, ignoring case
    ///
    /// Accepts `ERROR`, `WARN`, `WARNING`, `INFO`, `DEBUG` and `NONE`.
    pub fn parse(s: &str) -> Option<Level> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Some(Level::Error),
            "WARN" | "WARNING" => Some(Level::Warn),
            "INFO" => Some(Level::Info),
            "DEBUG" => Some(Level::Debug),
            "NONE" => Some(Level::None),
            _ => None,
        }
    }

    fn from_u8(v: u8) -> Level {
        match v {
            0 => Level::None,
            1 => Level::Error,
            2 => Level::Warn,
            3 => Level::Info,
            _ => Level::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::parse(s).ok_or_else(|| LogError::InvalidLevel(s.to_string()))
    }
}

/// Category of a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogType {
    Error,
    Warn,
    Info,
    Debug,
    /// Always written, always forwarded, then the process exits
    Panic,
    /// Untyped output from the print entry points
    Print,
}

impl LogType {
    /// Flag bit for this category; zero for the untyped print category
    ///
    /// Panic has no single bit and is handled explicitly by [`Level::test`].
    pub fn bit(self) -> u8 {
        match self {
            LogType::Error => 1 << 0,
            LogType::Warn => 1 << 1,
            LogType::Info => 1 << 2,
            LogType::Debug => 1 << 3,
            LogType::Panic => u8::MAX,
            LogType::Print => 0,
        }
    }

    /// Lowest level at which this category is enabled
    pub fn level(self) -> Option<Level> {
        match self {
            LogType::Error => Some(Level::Error),
            LogType::Warn => Some(Level::Warn),
            LogType::Info => Some(Level::Info),
            LogType::Debug => Some(Level::Debug),
            LogType::Panic | LogType::Print => None,
        }
    }

    /// Tag written in front of every message of this category
    pub fn tag(&self) -> &'static str {
        match self {
            LogType::Error => "[ERROR]",
            LogType::Warn => "[WARN]",
            LogType::Info => "[INFO]",
            LogType::Debug => "[DEBUG]",
            LogType::Panic => "[PANIC]",
            LogType::Print => "[LOG]",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A [`Level`] that can be read and replaced from any thread without locking
#[derive(Debug)]
pub struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    pub fn get(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: Level) {
        self.0.store(level as u8, Ordering::Relaxed);
    }

    /// Shorthand for `self.get().test(ty)`
    pub fn test(&self, ty: LogType) -> bool {
        self.get().test(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [Level; 5] = [
        Level::None,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];

    const GATED: [LogType; 4] = [LogType::Error, LogType::Warn, LogType::Info, LogType::Debug];

    #[test]
    fn test_level_is_cumulative() {
        assert!(Level::Warn.test(LogType::Error));
        assert!(Level::Warn.test(LogType::Warn));
        assert!(!Level::Warn.test(LogType::Info));
        assert!(!Level::Warn.test(LogType::Debug));

        assert!(Level::ALL.test(LogType::Error));
        assert!(Level::ALL.test(LogType::Debug));

        for ty in GATED {
            assert!(!Level::None.test(ty));
        }
    }

    #[test]
    fn test_order_and_mask_agree() {
        for level in LEVELS {
            for ty in GATED {
                let by_mask = level.mask() & ty.bit() != 0;
                assert_eq!(level.test(ty), by_mask, "{} vs {}", level, ty);
            }
        }
    }

    #[test]
    fn test_panic_always_passes() {
        for level in LEVELS {
            assert!(level.test(LogType::Panic));
        }
    }

    #[test]
    fn test_print_has_no_bit() {
        for level in LEVELS {
            assert!(!level.test(LogType::Print));
        }
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(Level::parse("ERROR"), Some(Level::Error));
        assert_eq!(Level::parse("warn"), Some(Level::Warn));
        assert_eq!(Level::parse("Warning"), Some(Level::Warn));
        assert_eq!(Level::parse("info"), Some(Level::Info));
        assert_eq!(Level::parse("DeBuG"), Some(Level::Debug));
        assert_eq!(Level::parse("none"), Some(Level::None));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Level::parse("PANIC"), None);
        assert_eq!(Level::parse(""), None);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for level in LEVELS {
            assert_eq!(level.to_string().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(LogType::Error.tag(), "[ERROR]");
        assert_eq!(LogType::Warn.tag(), "[WARN]");
        assert_eq!(LogType::Info.tag(), "[INFO]");
        assert_eq!(LogType::Debug.tag(), "[DEBUG]");
        assert_eq!(LogType::Panic.tag(), "[PANIC]");
        assert_eq!(LogType::Print.tag(), "[LOG]");
    }

    #[test]
    fn test_atomic_level() {
        let level = AtomicLevel::new(Level::ALL);
        assert_eq!(level.get(), Level::Debug);

        level.set(Level::Warn);
        assert_eq!(level.get(), Level::Warn);
        assert!(level.test(LogType::Error));
        assert!(!level.test(LogType::Info));
    }
}
