//! Formatting macros
//!
//! Each macro takes a format string and arguments, optionally preceded by
//! `logger: <expr>,` to target an explicit [`Logger`](crate::Logger) instead of
//! the default, and by `err: <expr>,` to attach an error value.
//!
//! ```no_run
//! use levelog::{info, warn};
//!
//! let err = std::io::Error::new(std::io::ErrorKind::Other, "refused");
//! info!("listening on {}", 8080);
//! warn!(err: &err, "retrying in {}s", 5);
//! ```

/// Log a `[PANIC]` message and exit the process with status 1
#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, err: $err:expr, $($arg:tt)+) => {
        $logger.panic_with($err, ::std::format_args!($($arg)+))
    };
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.panic(::std::format_args!($($arg)+))
    };
    (err: $err:expr, $($arg:tt)+) => {
        $crate::facade::panic_with($err, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::facade::panic(::std::format_args!($($arg)+))
    };
}

/// Log an `[ERROR]` message
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, err: $err:expr, $($arg:tt)+) => {
        $logger.error_with($err, ::std::format_args!($($arg)+))
    };
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
    (err: $err:expr, $($arg:tt)+) => {
        $crate::facade::error_with($err, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::facade::error(::std::format_args!($($arg)+))
    };
}

/// Log a `[WARN]` message
#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, err: $err:expr, $($arg:tt)+) => {
        $logger.warn_with($err, ::std::format_args!($($arg)+))
    };
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
    (err: $err:expr, $($arg:tt)+) => {
        $crate::facade::warn_with($err, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::facade::warn(::std::format_args!($($arg)+))
    };
}

/// Log an `[INFO]` message
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, err: $err:expr, $($arg:tt)+) => {
        $logger.info_with($err, ::std::format_args!($($arg)+))
    };
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
    (err: $err:expr, $($arg:tt)+) => {
        $crate::facade::info_with($err, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::facade::info(::std::format_args!($($arg)+))
    };
}

/// Log a `[DEBUG]` message
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, err: $err:expr, $($arg:tt)+) => {
        $logger.debug_with($err, ::std::format_args!($($arg)+))
    };
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
    (err: $err:expr, $($arg:tt)+) => {
        $crate::facade::debug_with($err, ::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::facade::debug(::std::format_args!($($arg)+))
    };
}

/// Write an untyped `[LOG]` line, regardless of level
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.print(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::facade::print(::std::format_args!($($arg)+))
    };
}
