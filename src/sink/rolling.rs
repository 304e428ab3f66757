//! Rolling log file
//!
//! Appends to a file whose name carries the current period. On the first write
//! after a period boundary the old file is closed and a new one is opened.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::retention::cleanup_rotated;
use super::Sink;

/// How often a [`RollingFile`] starts a new file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// Always write to the base path
    #[default]
    None,
    /// One file per hour: `<path>.YYYY-MM-DD-HH`
    Hourly,
    /// One file per day: `<path>.YYYY-MM-DD`
    Daily,
}

impl Rotation {
    /// Suffix identifying the period containing `now`, if this policy rotates
    pub fn suffix(self, now: DateTime<Local>) -> Option<String> {
        match self {
            Rotation::None => None,
            Rotation::Hourly => Some(now.format("%Y-%m-%d-%H").to_string()),
            Rotation::Daily => Some(now.format("%Y-%m-%d").to_string()),
        }
    }
}

/// A file sink that switches files on period boundaries
pub struct RollingFile {
    base: PathBuf,
    rotation: Rotation,
    retention_days: Option<u64>,
    /// Suffix of the currently open file
    suffix: Option<String>,
    file: Option<File>,
}

impl RollingFile {
    /// Open (or create) the file for the current period
    pub fn open(path: impl Into<PathBuf>, rotation: Rotation) -> io::Result<Self> {
        let mut rolling = Self {
            base: path.into(),
            rotation,
            retention_days: None,
            suffix: None,
            file: None,
        };
        if let Some(parent) = rolling.base.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        rolling.roll(Local::now())?;
        Ok(rolling)
    }

    /// Remove rotated files older than `days` whenever a new file is started
    pub fn with_retention(mut self, days: u64) -> Self {
        self.retention_days = Some(days);
        self
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Path of the file currently written to
    pub fn current_path(&self) -> PathBuf {
        path_for(&self.base, self.suffix.as_deref())
    }

    /// Make sure the open file matches the period containing `now`
    fn roll(&mut self, now: DateTime<Local>) -> io::Result<()> {
        let suffix = self.rotation.suffix(now);
        if self.file.is_some() && suffix == self.suffix {
            return Ok(());
        }

        if let Some(mut old) = self.file.take() {
            old.flush()?;
        }

        let path = path_for(&self.base, suffix.as_deref());
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.file = Some(file);
        self.suffix = suffix;

        if let Some(days) = self.retention_days {
            // best effort: a failed cleanup must not stop logging
            let _ = cleanup_rotated(&self.base, days);
        }
        Ok(())
    }

    fn write_at(&mut self, buf: &[u8], now: DateTime<Local>) -> io::Result<usize> {
        self.roll(now)?;
        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "log file closed")),
        }
    }
}

fn path_for(base: &Path, suffix: Option<&str>) -> PathBuf {
    match suffix {
        None => base.to_path_buf(),
        Some(suffix) => {
            let mut name = base.as_os_str().to_owned();
            name.push(".");
            name.push(suffix);
            PathBuf::from(name)
        }
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_at(buf, Local::now())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Sink for RollingFile {
    fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(file) => file.sync_all(),
            None => Ok(()),
        }
    }
}
