//! plainlog is a small leveled logger for single-threaded programs.
//!
//! Each record is one line rendered from a template such as
//! `"[{type}] {file}:{line} {message}"`, where `{file}` and `{line}` point at
//! the code that made the call. Levels can be muted for a scope, multi-line
//! records are framed with box-drawing prefixes, and [`Observer`] wraps a
//! function to log its arguments together with its result or failure.
//!
//! The crate is structured as follows:
//! - [`config`]: construction options and file placement.
//! - [`log`]: the logger, its sinks, the template engine and the observer.

/// Logger construction options.
pub mod config;
/// Leveled logging, sinks and function observation.
pub mod log;

pub use config::{FileExtension, LoggerConfig, SinkMode};
pub use log::{
    Call, CallSite, FormatArgs, FormatError, Level, LogError, LogSink, Logger, NoopLogSink, Observed,
    ObservedArgs, ObservedError, Observer, QuietGuard, SharedSink, Traced, Value,
};
