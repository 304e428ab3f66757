//! Configuration for building a logger from a TOML file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::format::Flags;
use crate::forward::ForwardingGate;
use crate::level::Level;
use crate::logger::Logger;
use crate::sink::{RollingFile, Rotation};

/// Remote collector settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForwardConfig {
    /// Collector host name or address
    pub host: String,
    /// fluentd forward port (default: 24224)
    #[serde(default = "default_forward_port")]
    pub port: u16,
    /// Tag records are posted under
    pub tag: String,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level name: "error", "warn", "info", "debug" or "none" (default: "debug")
    #[serde(default = "default_level")]
    pub level: String,

    /// Level at and above which a call stack is attached (default: "error")
    #[serde(default = "default_trace_level")]
    pub trace_level: String,

    /// Text written at the start of every entry
    #[serde(default)]
    pub prefix: String,

    /// Header annotations: "date", "time", "microseconds", "shortfile", "longfile", "utc"
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,

    /// Log file; stderr when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Rotation policy for `file`: "none" (default), "hourly" or "daily"
    #[serde(default)]
    pub rotation: Rotation,

    /// Delete rotated files older than this many days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u64>,

    /// Mirror errors and warnings to a fluentd collector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<ForwardConfig>,
}

fn default_level() -> String {
    Level::ALL.to_string()
}

fn default_trace_level() -> String {
    Level::Error.to_string()
}

fn default_flags() -> Vec<String> {
    vec!["date".to_string(), "time".to_string(), "shortfile".to_string()]
}

fn default_forward_port() -> u16 {
    24224
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            trace_level: default_trace_level(),
            prefix: String::new(),
            flags: default_flags(),
            file: None,
            rotation: Rotation::default(),
            retention_days: None,
            forward: None,
        }
    }
}

impl LogConfig {
    /// Load configuration from the default file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(crate::error::LogError::from)
            .context("Failed to parse config file")
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Build a logger from this configuration
    ///
    /// Opens the log file when one is configured and connects the forwarder.
    /// An unreachable collector does not fail the build; the logger reports it
    /// and keeps logging locally.
    pub fn build(&self) -> Result<Logger> {
        let level: Level = self.level.parse().context("Invalid level")?;
        let trace_level: Level = self.trace_level.parse().context("Invalid trace_level")?;
        let flags = Flags::from_names(&self.flags).context("Invalid flags")?;

        let logger = match &self.file {
            Some(path) => {
                let mut file = RollingFile::open(path, self.rotation)
                    .with_context(|| format!("Failed to open log file {}", path.display()))?;
                if let Some(days) = self.retention_days {
                    file = file.with_retention(days);
                }
                Logger::new(file, self.prefix.clone())
            }
            None => Logger::from_writer(std::io::stderr(), self.prefix.clone()),
        };

        logger.set_flags(flags);
        logger.set_level(level);
        logger.set_trace_level(trace_level);

        if let Some(forward) = &self.forward {
            logger.init_forwarding(&forward.host, forward.port, &forward.tag);
        }

        Ok(logger)
    }

    /// Build a logger with a forwarder supplied by the caller
    pub fn build_with_forwarder(&self, gate: Arc<ForwardingGate>) -> Result<Logger> {
        let config = LogConfig {
            forward: None,
            ..self.clone()
        };
        Ok(config.build()?.with_forwarder(gate))
    }
}

/// Get the base configuration directory (~/.levelog)
/// Falls back to ./.levelog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| PathBuf::from(".levelog"))
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".levelog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure the config and logs directories exist
pub fn ensure_directories() -> Result<()> {
    std::fs::create_dir_all(config_dir()).context("Failed to create config directory")?;
    std::fs::create_dir_all(logs_dir()).context("Failed to create logs directory")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::tests::RecordingSink;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "DEBUG");
        assert_eq!(config.trace_level, "ERROR");
        assert_eq!(config.rotation, Rotation::None);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = LogConfig::parse("").unwrap();
        assert_eq!(config.level, "DEBUG");
        assert_eq!(config.flags, default_flags());
    }

    #[test]
    fn test_parse_full_document() {
        let config = LogConfig::parse(
            r#"
            level = "warn"
            trace_level = "none"
            prefix = "svc "
            flags = ["date", "microseconds"]
            file = "/var/log/svc.log"
            rotation = "daily"
            retention_days = 14

            [forward]
            host = "10.0.0.5"
            tag = "svc"
            "#,
        )
        .unwrap();

        assert_eq!(config.level, "warn");
        assert_eq!(config.rotation, Rotation::Daily);
        assert_eq!(config.retention_days, Some(14));
        let forward = config.forward.unwrap();
        assert_eq!(forward.port, 24224);
        assert_eq!(forward.tag, "svc");
    }

    #[test]
    fn test_parse_rejects_unknown_rotation() {
        assert!(LogConfig::parse(r#"rotation = "weekly""#).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = LogConfig {
            rotation: Rotation::Hourly,
            ..LogConfig::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = LogConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.rotation, Rotation::Hourly);
        assert_eq!(parsed.level, config.level);
    }

    #[test]
    fn test_build_applies_levels_and_flags() {
        let config = LogConfig {
            level: "info".to_string(),
            trace_level: "warn".to_string(),
            flags: vec!["time".to_string()],
            ..LogConfig::default()
        };
        let logger = config.build().unwrap();
        assert_eq!(logger.level(), Level::Info);
        assert_eq!(logger.trace_level(), Level::Warn);
        assert_eq!(logger.flags(), Flags::TIME);
    }

    #[test]
    fn test_build_rejects_bad_level() {
        let config = LogConfig {
            level: "loud".to_string(),
            ..LogConfig::default()
        };
        assert!(config.build().is_err());
    }

    #[test]
    fn test_build_with_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("svc.log");
        let config = LogConfig {
            file: Some(path.clone()),
            flags: Vec::new(),
            ..LogConfig::default()
        };

        let logger = config.build().unwrap();
        logger.info("to file");
        logger.close().unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "[INFO] to file\n");
    }

    #[test]
    fn test_build_with_forwarder() {
        let remote = Arc::new(RecordingSink::default());
        let gate = Arc::new(ForwardingGate::with_sink("svc", remote.clone()));

        let logger = LogConfig {
            flags: Vec::new(),
            ..LogConfig::default()
        }
        .build_with_forwarder(gate)
        .unwrap();
        logger.set_trace_level(Level::None);
        logger.warn("forwarded");

        assert_eq!(remote.messages(), vec!["forwarded"]);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = LogConfig {
            prefix: "svc ".to_string(),
            ..LogConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = LogConfig::load_from(&path).unwrap();
        assert_eq!(loaded.prefix, "svc ");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = LogConfig::load_from(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(loaded.level, "DEBUG");
    }

    #[test]
    fn test_config_dir_does_not_panic() {
        let dir = config_dir();
        assert!(dir.ends_with(".levelog"));
        assert!(logs_dir().ends_with("logs"));
    }
}
