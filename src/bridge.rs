//! Bridge from `tracing` events into a [`Logger`]
//!
//! Lets libraries instrumented with `tracing` macros write through the same sink,
//! level gate and forwarder as the rest of the process. Only the event's
//! `message` field is carried over.
//!
//! ```rust,ignore
//! let logger = std::sync::Arc::new(levelog::Logger::from_writer(std::io::stderr(), ""));
//! levelog::bridge::init_tracing(logger);
//!
//! tracing::warn!("cache miss ratio high");
//! ```

use std::sync::Arc;

use tracing::{Level as TracingLevel, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::level::LogType;
use crate::logger::Logger;

/// Where bridged events are written
enum Target {
    Logger(Arc<Logger>),
    /// Whatever the process-wide default is at the time of the event
    Default,
}

/// A tracing layer writing events through a [`Logger`]
pub struct LoggerLayer {
    target: Target,
}

impl LoggerLayer {
    /// Write events through `logger`
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            target: Target::Logger(logger),
        }
    }

    /// Write events through the process-wide default logger
    pub fn for_default() -> Self {
        Self {
            target: Target::Default,
        }
    }

    /// Map a tracing level onto a message category
    fn level_to_type(level: &TracingLevel) -> LogType {
        match *level {
            TracingLevel::ERROR => LogType::Error,
            TracingLevel::WARN => LogType::Warn,
            TracingLevel::INFO => LogType::Info,
            TracingLevel::DEBUG | TracingLevel::TRACE => LogType::Debug,
        }
    }

    fn emit(logger: &Logger, ty: LogType, event: &tracing::Event<'_>) {
        if logger.is_disabled(ty) {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            logger.log(ty, None, message);
        }
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let ty = Self::level_to_type(event.metadata().level());
        match &self.target {
            Target::Logger(logger) => Self::emit(logger, ty, event),
            Target::Default => Self::emit(&crate::facade::std_logger(), ty, event),
        }
    }
}

/// Visitor to extract message from tracing event
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }
}

/// Install a global subscriber routing `tracing` events into `logger`
///
/// Filtering follows `RUST_LOG` when set; otherwise every event reaches the
/// logger and its own level decides.
pub fn init_tracing(logger: Arc<Logger>) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trace".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(LoggerLayer::new(logger))
        .init();
}
