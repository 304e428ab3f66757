//! Process-wide default logger
//!
//! A thin convenience layer over an explicit [`Logger`]. The default writes to
//! stderr at [`Level::ALL`]; [`set_std_logger`] swaps in another logger atomically,
//! and calls already in flight finish on the logger they started with.

use std::fmt::Display;
use std::io;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::format::Flags;
use crate::level::Level;
use crate::logger::{ErrorRef, Logger};

static STD_LOG: OnceLock<ArcSwap<Logger>> = OnceLock::new();

fn slot() -> &'static ArcSwap<Logger> {
    STD_LOG.get_or_init(|| ArcSwap::from_pointee(Logger::from_writer(io::stderr(), "")))
}

/// The current default logger
pub fn std_logger() -> Arc<Logger> {
    slot().load_full()
}

/// Replace the default logger, returning the previous one
///
/// The previous logger is not closed; callers owning its sink may close it once
/// they no longer expect writes through it.
pub fn set_std_logger(logger: Logger) -> Arc<Logger> {
    slot().swap(Arc::new(logger))
}

pub fn flags() -> Flags {
    slot().load().flags()
}

pub fn set_flags(flags: Flags) {
    slot().load().set_flags(flags);
}

pub fn prefix() -> String {
    slot().load().prefix()
}

pub fn set_prefix(prefix: impl Into<String>) {
    slot().load().set_prefix(prefix);
}

pub fn set_level(level: Level) {
    slot().load().set_level(level);
}

/// Set the default logger's level by name; returns `false` and changes nothing
/// for an unknown name
pub fn set_level_str(s: &str) -> bool {
    slot().load().set_level_str(s)
}

pub fn set_trace_level(level: Level) {
    slot().load().set_trace_level(level);
}

/// Attach a fluentd forwarder to the default logger
#[track_caller]
pub fn init_forwarding(host: &str, port: u16, tag: &str) -> bool {
    slot().load().init_forwarding(host, port, tag)
}

#[track_caller]
pub fn panic(msg: impl Display) -> ! {
    slot().load_full().panic(msg)
}

#[track_caller]
pub fn panic_with(err: ErrorRef<'_>, msg: impl Display) -> ! {
    slot().load_full().panic_with(err, msg)
}

#[track_caller]
pub fn error(msg: impl Display) {
    slot().load().error(msg);
}

#[track_caller]
pub fn error_with(err: ErrorRef<'_>, msg: impl Display) {
    slot().load().error_with(err, msg);
}

#[track_caller]
pub fn warn(msg: impl Display) {
    slot().load().warn(msg);
}

#[track_caller]
pub fn warn_with(err: ErrorRef<'_>, msg: impl Display) {
    slot().load().warn_with(err, msg);
}

#[track_caller]
pub fn info(msg: impl Display) {
    slot().load().info(msg);
}

#[track_caller]
pub fn info_with(err: ErrorRef<'_>, msg: impl Display) {
    slot().load().info_with(err, msg);
}

#[track_caller]
pub fn debug(msg: impl Display) {
    slot().load().debug(msg);
}

#[track_caller]
pub fn debug_with(err: ErrorRef<'_>, msg: impl Display) {
    slot().load().debug_with(err, msg);
}

#[track_caller]
pub fn print(msg: impl Display) {
    slot().load().print(msg);
}

#[track_caller]
pub fn println(msg: impl Display) {
    slot().load().println(msg);
}
