pub mod log_error;
pub mod log_level;
pub mod log_macros;
pub mod log_msg;
pub mod log_sink;
pub mod logger;
pub mod noop_log_sink;
pub mod observer;
pub mod quiet_guard;
pub mod template;

pub use log_error::{FormatError, LogError};
pub use log_level::Level;
pub use log_msg::CallSite;
pub use log_sink::{LogSink, SharedSink};
pub use logger::Logger;
pub use noop_log_sink::NoopLogSink;
pub use observer::{Call, Observed, ObservedArgs, ObservedError, Observer, Traced};
pub use quiet_guard::QuietGuard;
pub use template::{FormatArgs, Value};
