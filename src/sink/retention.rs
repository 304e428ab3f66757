//! Retention of rotated log files
//!
//! Removes rotated siblings of a rolling file once they are older than the
//! retention window.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Remove files named `<base>.<period>` older than `retention_days`
///
/// Only names whose suffix looks like a rotation period (digits and dashes) are
/// considered, so the base file itself and unrelated files are never touched.
/// Returns the number of files deleted.
pub fn cleanup_rotated(base: &Path, retention_days: u64) -> io::Result<usize> {
    let dir = match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(stem) = base.file_name().and_then(|n| n.to_str()) else {
        return Ok(0);
    };

    if !dir.exists() {
        return Ok(0);
    }

    // a window reaching past the epoch keeps everything
    let retention = Duration::from_secs(retention_days.saturating_mul(SECS_PER_DAY));
    let cutoff = SystemTime::now()
        .checked_sub(retention)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let prefix = format!("{}.", stem);
    let mut deleted_count = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(period) = name.strip_prefix(&prefix) else {
            continue;
        };
        if !is_period(period) {
            continue;
        }

        // Check file modification time
        if let Ok(metadata) = entry.metadata() {
            if let Ok(modified) = metadata.modified() {
                if modified < cutoff && fs::remove_file(&path).is_ok() {
                    deleted_count += 1;
                }
            }
        }
    }

    Ok(deleted_count)
}

fn is_period(s: &str) -> bool {
    !s.is_empty()
        && s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '-')
}
