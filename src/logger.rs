//! The logger
//!
//! A [`Logger`] owns a sink and writes one entry per call, serialized by a mutex.
//! Two independent gates are consulted per message: the level decides whether it
//! is written at all, the trace level decides whether a call stack is attached.
//! Qualifying messages are mirrored to an optional [`ForwardingGate`].

use std::error::Error as StdError;
use std::fmt::{self, Display, Write as _};
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwapOption;
use chrono::Utc;

use crate::format::{self, Flags};
use crate::forward::{should_forward, ForwardingGate};
use crate::level::{AtomicLevel, Level, LogType};
use crate::sink::{NopCloser, Sink};
use crate::stack::Stack;
use crate::traced::stack_of;

/// An error value attached to a log message
pub type ErrorRef<'a> = &'a (dyn StdError + 'static);

type ErrorHook = Box<dyn Fn(&io::Error) + Send + Sync>;

/// Sink plus the formatting state guarded with it
struct Output {
    sink: Option<Box<dyn Sink>>,
    prefix: String,
    flags: Flags,
}

/// A leveled, thread-safe logger over a single sink
pub struct Logger {
    out: Mutex<Output>,
    level: AtomicLevel,
    trace: AtomicLevel,
    forwarder: ArcSwapOption<ForwardingGate>,
    on_write_error: Option<ErrorHook>,
}

impl Logger {
    /// Create a logger over a closable sink
    ///
    /// Starts at [`Level::ALL`] with stacks captured for errors.
    pub fn new<S>(sink: S, prefix: impl Into<String>) -> Self
    where
        S: Sink + 'static,
    {
        Self {
            out: Mutex::new(Output {
                sink: Some(Box::new(sink)),
                prefix: prefix.into(),
                flags: Flags::STD | Flags::SHORT_FILE,
            }),
            level: AtomicLevel::new(Level::ALL),
            trace: AtomicLevel::new(Level::Error),
            forwarder: ArcSwapOption::empty(),
            on_write_error: None,
        }
    }

    /// Create a logger over a plain writer whose close does nothing
    pub fn from_writer<W>(writer: W, prefix: impl Into<String>) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::new(NopCloser::new(writer), prefix)
    }

    /// Replace the header flags
    pub fn with_flags(self, flags: Flags) -> Self {
        self.set_flags(flags);
        self
    }

    /// Mirror qualifying messages through `gate`
    pub fn with_forwarder(self, gate: Arc<ForwardingGate>) -> Self {
        self.set_forwarder(gate);
        self
    }

    /// Call `hook` whenever a write to the sink fails
    ///
    /// The category entry points otherwise drop write errors.
    pub fn with_error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&io::Error) + Send + Sync + 'static,
    {
        self.on_write_error = Some(Box::new(hook));
        self
    }

    pub fn level(&self) -> Level {
        self.level.get()
    }

    pub fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    /// Set the level from its name; leaves the level untouched and returns
    /// `false` if the name is not recognized
    pub fn set_level_str(&self, s: &str) -> bool {
        match Level::parse(s) {
            Some(level) => {
                self.level.set(level);
                true
            }
            None => false,
        }
    }

    pub fn trace_level(&self) -> Level {
        self.trace.get()
    }

    pub fn set_trace_level(&self, level: Level) {
        self.trace.set(level);
    }

    pub fn flags(&self) -> Flags {
        self.lock().flags
    }

    pub fn set_flags(&self, flags: Flags) {
        self.lock().flags = flags;
    }

    pub fn prefix(&self) -> String {
        self.lock().prefix.clone()
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.lock().prefix = prefix.into();
    }

    pub fn forwarder(&self) -> Option<Arc<ForwardingGate>> {
        self.forwarder.load_full()
    }

    pub fn set_forwarder(&self, gate: Arc<ForwardingGate>) {
        self.forwarder.store(Some(gate));
    }

    /// Connect a fluentd forwarder and attach it to this logger
    ///
    /// On failure a diagnostic is printed through this logger and the attached
    /// gate stays disconnected. Returns whether forwarding is live.
    #[track_caller]
    pub fn init_forwarding(&self, host: &str, port: u16, tag: &str) -> bool {
        let gate = match ForwardingGate::connect(host, port, tag) {
            Ok(gate) => gate,
            Err(e) => {
                self.print(format_args!(
                    "forwarding to {}:{} disabled: {}",
                    host,
                    port,
                    error_chain(&e)
                ));
                ForwardingGate::disconnected(tag)
            }
        };
        let connected = gate.is_connected();
        self.set_forwarder(Arc::new(gate));
        connected
    }

    /// Whether messages of `ty` are suppressed by the level
    pub fn is_disabled(&self, ty: LogType) -> bool {
        ty != LogType::Panic && !self.level.test(ty)
    }

    /// Whether messages of `ty` get a call stack attached
    pub fn is_trace_enabled(&self, ty: LogType) -> bool {
        ty == LogType::Panic || self.trace.test(ty)
    }

    /// Write one entry, bypassing the level gate and forwarding
    ///
    /// `skip` drops that many frames above the caller from a captured stack.
    #[track_caller]
    pub fn output(
        &self,
        skip: usize,
        err: Option<ErrorRef<'_>>,
        ty: LogType,
        msg: &str,
    ) -> io::Result<()> {
        let caller = Location::caller();
        let stack = if self.is_trace_enabled(ty) {
            Stack::capture(skip)
        } else {
            Stack::default()
        };

        let body = render(ty, msg, err, &stack);
        let now = Utc::now();

        let mut out = self.lock();
        let mut entry = format::header(&out.prefix, out.flags, now, caller);
        entry.push_str(&body);

        let sink = out
            .sink
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "logger is closed"))?;
        sink.write_all(entry.as_bytes())?;
        sink.flush()
    }

    /// Close the sink; later writes fail with `BrokenPipe`
    pub fn close(&self) -> io::Result<()> {
        match self.lock().sink.take() {
            Some(mut sink) => sink.close(),
            None => Ok(()),
        }
    }

    /// Log `msg` under `ty`, applying the level gate and forwarding rule
    ///
    /// A [`LogType::Panic`] message ends the process.
    #[track_caller]
    pub fn log(&self, ty: LogType, err: Option<ErrorRef<'_>>, msg: impl Display) {
        if ty == LogType::Panic {
            self.exit_with(err, &msg);
        }
        if ty != LogType::Print && self.is_disabled(ty) {
            return;
        }

        let text = msg.to_string();
        let result = self.output(0, err, ty, &text);
        self.report(result);

        if should_forward(ty, err.is_some()) {
            self.forward(&text);
        }
    }

    #[track_caller]
    pub fn error(&self, msg: impl Display) {
        self.log(LogType::Error, None, msg);
    }

    #[track_caller]
    pub fn error_with(&self, err: ErrorRef<'_>, msg: impl Display) {
        self.log(LogType::Error, Some(err), msg);
    }

    #[track_caller]
    pub fn warn(&self, msg: impl Display) {
        self.log(LogType::Warn, None, msg);
    }

    #[track_caller]
    pub fn warn_with(&self, err: ErrorRef<'_>, msg: impl Display) {
        self.log(LogType::Warn, Some(err), msg);
    }

    #[track_caller]
    pub fn info(&self, msg: impl Display) {
        self.log(LogType::Info, None, msg);
    }

    #[track_caller]
    pub fn info_with(&self, err: ErrorRef<'_>, msg: impl Display) {
        self.log(LogType::Info, Some(err), msg);
    }

    #[track_caller]
    pub fn debug(&self, msg: impl Display) {
        self.log(LogType::Debug, None, msg);
    }

    #[track_caller]
    pub fn debug_with(&self, err: ErrorRef<'_>, msg: impl Display) {
        self.log(LogType::Debug, Some(err), msg);
    }

    /// Untyped output, never gated and never forwarded
    #[track_caller]
    pub fn print(&self, msg: impl Display) {
        self.log(LogType::Print, None, msg);
    }

    /// Like [`Logger::print`], always ending the message with a newline
    #[track_caller]
    pub fn println(&self, msg: impl Display) {
        self.log(LogType::Print, None, format_args!("{}\n", msg));
    }

    /// Write a `[PANIC]` entry, forward it, and exit with status 1
    #[track_caller]
    pub fn panic(&self, msg: impl Display) -> ! {
        self.exit_with(None, &msg)
    }

    /// Like [`Logger::panic`] with an attached error
    #[track_caller]
    pub fn panic_with(&self, err: ErrorRef<'_>, msg: impl Display) -> ! {
        self.exit_with(Some(err), &msg)
    }

    #[track_caller]
    fn exit_with(&self, err: Option<ErrorRef<'_>>, msg: &dyn Display) -> ! {
        let text = msg.to_string();
        let result = self.output(0, err, LogType::Panic, &text);
        self.report(result);
        self.forward(&text);
        std::process::exit(1)
    }

    fn forward(&self, text: &str) {
        let gate = self.forwarder.load();
        if let Some(gate) = gate.as_ref() {
            gate.post_with_time(Utc::now(), text);
        }
    }

    fn report(&self, result: io::Result<()>) {
        if let (Err(e), Some(hook)) = (result, &self.on_write_error) {
            hook(&e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Output> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("trace_level", &self.trace_level())
            .field("forwarder", &self.forwarder())
            .finish_non_exhaustive()
    }
}

/// Render the body of an entry: tagged message, error detail, stack
fn render(ty: LogType, msg: &str, err: Option<ErrorRef<'_>>, stack: &Stack) -> String {
    let mut buf = String::with_capacity(msg.len() + 16);
    let _ = write!(buf, "{} {}", ty, msg);
    if !msg.ends_with('\n') {
        buf.push('\n');
    }

    if let Some(err) = err {
        let _ = writeln!(buf, "[error]: {}", err);
        if let Some(attached) = stack_of(err) {
            buf.push_str(&attached.to_string_with_indent(1));
        }
    }

    if !stack.is_empty() {
        buf.push_str("[stack]: \n");
        buf.push_str(&stack.to_string_with_indent(1));
    }

    buf
}

fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        let _ = write!(text, ": {}", e);
        source = e.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::tests::RecordingSink;
    use crate::sink::{LineBuffer, MemorySink};
    use crate::stack::Frame;
    use crate::traced::TracedError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn memory_logger() -> (Logger, Arc<LineBuffer>) {
        let sink = MemorySink::default();
        let buffer = sink.buffer();
        let logger = Logger::new(sink, "").with_flags(Flags::NONE);
        (logger, buffer)
    }

    fn forwarding_logger() -> (Logger, Arc<LineBuffer>, Arc<RecordingSink>) {
        let (logger, buffer) = memory_logger();
        let remote = Arc::new(RecordingSink::default());
        let logger = logger.with_forwarder(Arc::new(ForwardingGate::with_sink(
            "app",
            remote.clone(),
        )));
        (logger, buffer, remote)
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults() {
        let (logger, _) = memory_logger();
        assert_eq!(logger.level(), Level::ALL);
        assert_eq!(logger.trace_level(), Level::Error);
        assert!(logger.forwarder().is_none());

        let logger = Logger::from_writer(Vec::new(), "pfx ");
        assert_eq!(logger.flags(), Flags::STD | Flags::SHORT_FILE);
        assert_eq!(logger.prefix(), "pfx ");
    }

    #[test]
    fn test_info_line() {
        let (logger, buffer) = memory_logger();
        logger.set_level(Level::Debug);

        logger.info("start");

        assert_eq!(buffer.contents(), "[INFO] start\n");
    }

    #[test]
    fn test_trailing_newline_not_doubled() {
        let (logger, buffer) = memory_logger();

        logger.info("already terminated\n");
        logger.info("");

        assert_eq!(buffer.contents(), "[INFO] already terminated\n[INFO] \n");
    }

    #[test]
    fn test_level_none_suppresses_everything_but_print() {
        let (logger, buffer, remote) = forwarding_logger();
        logger.set_level(Level::None);

        logger.error("e");
        logger.warn("w");
        logger.info("i");
        logger.debug("d");
        let err = io::Error::new(io::ErrorKind::Other, "cause");
        logger.error_with(&err, "e");
        logger.debug_with(&err, "d");

        assert_eq!(buffer.bytes_written(), 0);
        assert!(remote.messages().is_empty());

        logger.print("still here");
        assert_eq!(buffer.contents(), "[LOG] still here\n");
    }

    #[test]
    fn test_level_gate_is_cumulative() {
        let (logger, buffer) = memory_logger();
        logger.set_level(Level::Warn);

        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");

        assert_eq!(buffer.lines(), vec!["[WARN] w", "[ERROR] e"]);
    }

    #[test]
    fn test_set_level_str() {
        let (logger, _) = memory_logger();
        logger.set_level_str("warn");
        assert_eq!(logger.level(), Level::Warn);

        assert!(!logger.set_level_str("PANIC"));
        assert_eq!(logger.level(), Level::Warn);

        assert!(logger.set_level_str("Warning"));
        assert!(logger.set_level_str("none"));
        assert_eq!(logger.level(), Level::None);
    }

    #[test]
    fn test_disabled_and_trace_checks() {
        let (logger, _) = memory_logger();
        logger.set_level(Level::None);
        assert!(logger.is_disabled(LogType::Error));
        assert!(!logger.is_disabled(LogType::Panic));

        logger.set_trace_level(Level::None);
        assert!(!logger.is_trace_enabled(LogType::Error));
        assert!(logger.is_trace_enabled(LogType::Panic));
        assert!(!logger.is_trace_enabled(LogType::Print));
    }

    #[test]
    fn test_stack_follows_trace_level() {
        let (logger, buffer) = memory_logger();
        logger.set_trace_level(Level::Error);

        logger.warn("no stack here");
        assert!(!buffer.contents().contains("[stack]:"));

        logger.error("stack here");
        let contents = buffer.contents();
        assert!(contents.contains("[ERROR] stack here\n[stack]: \n"));
        assert!(contents.contains("test_stack_follows_trace_level"));
    }

    #[test]
    fn test_trace_level_is_independent_of_level() {
        let (logger, buffer) = memory_logger();
        logger.set_trace_level(Level::Debug);

        logger.info("traced info");
        assert!(buffer.contents().contains("[stack]:"));
    }

    #[test]
    fn test_error_detail() {
        let (logger, buffer) = memory_logger();
        logger.set_trace_level(Level::None);

        let err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        logger.warn_with(&err, "open failed");

        assert_eq!(
            buffer.contents(),
            "[WARN] open failed\n[error]: no such file\n"
        );
    }

    #[test]
    fn test_traced_error_stack_is_rendered() {
        let (logger, buffer) = memory_logger();
        logger.set_trace_level(Level::None);

        let err = TracedError::new("error testing");
        logger.error_with(&err, "with attached stack");

        let contents = buffer.contents();
        assert!(contents.starts_with("[ERROR] with attached stack\n[error]: error testing\n"));
        assert!(!contents.contains("[stack]:"));
        if !err.stack().is_empty() {
            assert!(contents.contains("test_traced_error_stack_is_rendered"));
        }
    }

    #[test]
    fn test_render_layout() {
        let stack = Stack::from_frames(vec![Frame {
            function: "app::main".to_string(),
            location: Some("src/main.rs:3:5".to_string()),
        }]);
        let err = io::Error::new(io::ErrorKind::Other, "cause");

        let body = render(LogType::Panic, "boom", Some(&err), &stack);
        assert_eq!(
            body,
            "[PANIC] boom\n[error]: cause\n[stack]: \n     0. app::main\n            src/main.rs:3:5\n"
        );
    }

    #[test]
    fn test_header_uses_call_site() {
        let sink = MemorySink::default();
        let buffer = sink.buffer();
        let logger = Logger::new(sink, "svc ").with_flags(Flags::SHORT_FILE);

        let line = line!() + 1;
        logger.info("located");

        assert_eq!(
            buffer.contents(),
            format!("svc logger.rs:{}: [INFO] located\n", line)
        );
    }

    #[test]
    fn test_println_and_print() {
        let (logger, buffer) = memory_logger();

        logger.println("with newline");
        logger.print("\n");

        assert_eq!(buffer.contents(), "[LOG] with newline\n[LOG] \n");
    }

    #[test]
    fn test_forwarding_rule() {
        let (logger, _, remote) = forwarding_logger();
        let err = io::Error::new(io::ErrorKind::Other, "cause");

        logger.error("e");
        logger.warn("w");
        logger.info("i");
        logger.debug("d");
        logger.info_with(&err, "i+err");
        logger.debug_with(&err, "d+err");
        logger.print("p");

        assert_eq!(remote.messages(), vec!["e", "w", "i+err", "d+err"]);
    }

    #[test]
    fn test_disabled_messages_are_not_forwarded() {
        let (logger, _, remote) = forwarding_logger();
        logger.set_level(Level::Error);

        logger.warn("quiet");
        logger.error("loud");

        assert_eq!(remote.messages(), vec!["loud"]);
    }

    #[test]
    fn test_disconnected_gate_does_not_forward() {
        let (logger, buffer) = memory_logger();
        let logger = logger.with_forwarder(Arc::new(ForwardingGate::disconnected("app")));

        logger.error("local only");
        assert_eq!(buffer.lines()[0], "[ERROR] local only");
    }

    #[test]
    fn test_init_forwarding_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (logger, buffer) = memory_logger();
        assert!(!logger.init_forwarding("127.0.0.1", port, "app"));

        let gate = logger.forwarder().unwrap();
        assert!(!gate.is_connected());
        assert!(buffer.lines()[0].starts_with("[LOG] forwarding to 127.0.0.1:"));

        logger.error("after failed init");
        assert_eq!(gate.dropped(), 0);
    }

    #[test]
    fn test_write_error_hook() {
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = failures.clone();
        let logger = Logger::from_writer(FailingSink, "").with_error_hook(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        logger.info("lost");
        assert_eq!(failures.load(Ordering::SeqCst), 1);

        let err = logger.output(0, None, LogType::Info, "direct").unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_close_then_write_fails() {
        let (logger, buffer) = memory_logger();
        logger.info("before");
        logger.close().unwrap();

        let err = logger.output(0, None, LogType::Info, "after").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(buffer.lines(), vec!["[INFO] before"]);
    }

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        let (logger, buffer) = memory_logger();
        let logger = Arc::new(logger);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        logger.info(format_args!("thread {} message {}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = buffer.lines();
        assert_eq!(lines.len(), 400);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("[INFO] thread ") && l.contains(" message ")));
    }

    #[test]
    fn test_level_change_visible_across_threads() {
        let (logger, buffer) = memory_logger();
        let logger = Arc::new(logger);

        let setter = Arc::clone(&logger);
        std::thread::spawn(move || setter.set_level(Level::Error))
            .join()
            .unwrap();

        logger.info("hidden");
        assert!(buffer.is_empty());
    }
}
