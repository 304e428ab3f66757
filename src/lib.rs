//! levelog - leveled line logging with stack capture and remote forwarding
//!
//! A [`Logger`] gates messages by a cumulative [`Level`], tags them by
//! [`LogType`], optionally attaches the caller's stack, and writes each entry to
//! its [`Sink`] under a mutex. Errors and warnings can be mirrored to a fluentd
//! collector through a [`ForwardingGate`].
//!
//! ```no_run
//! use levelog::{info, Level, Logger};
//!
//! let logger = Logger::from_writer(std::io::stderr(), "svc ");
//! logger.set_level(Level::Info);
//! logger.info("ready");
//! info!(logger: logger, "listening on {}", 8080);
//! ```

#[macro_use]
mod macros;

pub mod bridge;
pub mod config;
pub mod error;
pub mod facade;
pub mod format;
pub mod forward;
pub mod level;
pub mod logger;
pub mod sink;
pub mod stack;
pub mod traced;

pub use error::{LogError, Result};
pub use facade::{set_std_logger, std_logger};
pub use format::Flags;
pub use forward::{ForwardingGate, Record, RemoteSink};
pub use level::{Level, LogType};
pub use logger::Logger;
pub use sink::{MemorySink, NopCloser, RollingFile, Rotation, Sink};
pub use stack::Stack;
pub use traced::TracedError;
