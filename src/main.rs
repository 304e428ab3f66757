use std::path::PathBuf;

use anyhow::Result;

use levelog::config::{self, LogConfig};
use levelog::sink::cleanup_rotated;
use levelog::{debug, error, info, log, warn, Level, Rotation, TracedError};

fn main() -> Result<()> {
    // Ensure config directory exists (creates logs dir too)
    config::ensure_directories()?;

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::config_file_path);

    let mut log_config = LogConfig::load_from(&config_path)?;
    if log_config.file.is_none() {
        log_config.file = Some(config::logs_dir().join("levelog.log"));
        log_config.rotation = Rotation::Daily;
    }

    let logger = log_config.build()?;
    levelog::set_std_logger(logger);

    if let Some(file) = &log_config.file {
        let days = log_config
            .retention_days
            .unwrap_or(levelog::sink::DEFAULT_RETENTION_DAYS);
        if let Ok(count) = cleanup_rotated(file, days) {
            if count > 0 {
                info!("Cleaned up {} old log files", count);
            }
        }
    }

    levelog::facade::set_level(Level::Info);
    info!("levelog demo start, config {}", config_path.display());

    levelog::facade::set_level_str("DEBUG");
    log!("set level to DEBUG");
    debug!("this is a debug log");
    info!("this is an info log");
    warn!("this is a warn log");
    error!("this is an error log with a stack attached automatically");

    let err = TracedError::new("error testing");

    levelog::facade::set_level_str("WARN");
    log!("set level to WARN");
    debug!(err: &err, "this will be ignored");
    info!(err: &err, "this will be ignored");
    warn!(err: &err, "this is a warn log carrying the error's stack");
    error!(err: &err, "this is an error log carrying the error's stack");

    if !levelog::facade::set_level_str("PANIC") {
        log!("PANIC is not a level; keeping WARN");
    }
    error!(err: &err, "errors are still written at WARN");

    Ok(())
}
