//! Forwarding of log messages to a remote collector
//!
//! A [`ForwardingGate`] is created once. If the collector cannot be reached the
//! gate stays disconnected for the life of the process and every post is a no-op.

mod fluent;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::level::LogType;

pub use fluent::FluentClient;

/// How long [`ForwardingGate::connect`] waits for the collector
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Text of the record posted right after connecting
const STARTUP_MESSAGE: &str = "fluent started.";

/// Payload sent to the collector for each forwarded message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub txt: String,
}

impl Record {
    pub fn new(txt: impl Into<String>) -> Self {
        Self { txt: txt.into() }
    }
}

/// A remote destination for records
///
/// Implementations must be safe to call from several threads at once.
pub trait RemoteSink: Send + Sync {
    fn post_with_time(&self, tag: &str, time: DateTime<Utc>, record: &Record) -> Result<()>;
}

/// Whether a message of `ty` is mirrored to the collector
///
/// Errors, warnings and panics always are; info and debug only when an error
/// value was attached; untyped print output never is.
pub fn should_forward(ty: LogType, with_error: bool) -> bool {
    match ty {
        LogType::Error | LogType::Warn | LogType::Panic => true,
        LogType::Info | LogType::Debug => with_error,
        LogType::Print => false,
    }
}

/// One-shot adapter in front of a [`RemoteSink`]
pub struct ForwardingGate {
    tag: String,
    sink: Option<Arc<dyn RemoteSink>>,
    /// Posts that reached a connected sink but failed to send
    dropped: AtomicU64,
}

impl ForwardingGate {
    /// Connect to a fluentd forward endpoint and announce startup under `tag`
    pub fn connect(host: &str, port: u16, tag: &str) -> Result<Self> {
        let client = FluentClient::connect(host, port, CONNECT_TIMEOUT)?;
        client.post_with_time(tag, Utc::now(), &Record::new(STARTUP_MESSAGE))?;
        Ok(Self::with_sink(tag, Arc::new(client)))
    }

    /// A connected gate over an arbitrary sink
    pub fn with_sink(tag: impl Into<String>, sink: Arc<dyn RemoteSink>) -> Self {
        Self {
            tag: tag.into(),
            sink: Some(sink),
            dropped: AtomicU64::new(0),
        }
    }

    /// A gate that never forwards
    pub fn disconnected(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            sink: None,
            dropped: AtomicU64::new(0),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of posts lost to send failures
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Forward `message` stamped with the current time
    pub fn post(&self, message: &str) {
        self.post_with_time(Utc::now(), message);
    }

    /// Forward `message` stamped with `time`
    ///
    /// Never fails: send errors are counted in [`ForwardingGate::dropped`].
    pub fn post_with_time(&self, time: DateTime<Utc>, message: &str) {
        let Some(sink) = &self.sink else {
            return;
        };
        if sink
            .post_with_time(&self.tag, time, &Record::new(message))
            .is_err()
        {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl std::fmt::Debug for ForwardingGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardingGate")
            .field("tag", &self.tag)
            .field("connected", &self.is_connected())
            .field("dropped", &self.dropped())
            .finish()
    }
}
