//! Logging macros for [`Logger`](crate::Logger).
//!
//! They expand to a `#[track_caller]` method call, so the `{file}` and
//! `{line}` of a record are those of the macro invocation. Positional values
//! follow the template; named values come after a `;`:
//!
//! ```rust,ignore
//! log_info!(logger, "Hello, {}!", "World")?;
//! log_warning!(logger, "{user} retried {} times", 3; user = "ana")?;
//! log_debug!(logger)?; // empty message
//! log_values!(logger, Level::Debug; some_vec, 42; limit = 10)?;
//! ```
//!
//! Every macro evaluates to `Result<(), LogError>`.

#[macro_export]
macro_rules! log_at {
    ($logger:expr, $lvl:expr) => {
        $logger.log($lvl, "", &$crate::FormatArgs::new())
    };
    ($logger:expr, $lvl:expr, $tmpl:expr $(, $arg:expr)* $(; $($key:ident = $val:expr),+ )?) => {{
        #[allow(unused_mut)]
        let mut __args = $crate::FormatArgs::new();
        $( __args.push(&$arg); )*
        $( $( __args.insert(stringify!($key), &$val); )+ )?
        $logger.log($lvl, $tmpl, &__args)
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr $(, $($rest:tt)*)?) => {
        $crate::log_at!($logger, $crate::Level::Debug $(, $($rest)*)?)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr $(, $($rest:tt)*)?) => {
        $crate::log_at!($logger, $crate::Level::Info $(, $($rest)*)?)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr $(, $($rest:tt)*)?) => {
        $crate::log_at!($logger, $crate::Level::Warning $(, $($rest)*)?)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr $(, $($rest:tt)*)?) => {
        $crate::log_at!($logger, $crate::Level::Error $(, $($rest)*)?)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($logger:expr $(, $($rest:tt)*)?) => {
        $crate::log_at!($logger, $crate::Level::Critical $(, $($rest)*)?)
    };
}

/// Logs values by type and `Debug` representation, one per line.
#[macro_export]
macro_rules! log_values {
    ($logger:expr, $lvl:expr; $($val:expr),+ $(; $($key:ident = $nval:expr),+ )?) => {
        $logger.inspect(
            $lvl,
            &[
                $( $crate::Value::of(&$val) ),+
                $( $( , $crate::Value::named(stringify!($key), &$nval) )+ )?
            ],
        )
    };
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use crate::{Level, LogError, LogSink, Logger, LoggerConfig, SharedSink};

    fn logger() -> (Logger, SharedSink) {
        let sink = SharedSink::memory();
        let logger = Logger::new(
            LoggerConfig::new()
                .with_template("{type} {line} {message}")
                .with_sink(sink.clone()),
        )
        .unwrap();
        (logger, sink)
    }

    #[test]
    fn positional_and_named_values() {
        let (logger, sink) = logger();
        let line = line!() + 1;
        log_info!(logger, "Hello, {}! {who} waves", "World"; who = "Ana").unwrap();
        assert_eq!(
            sink.contents().unwrap(),
            format!("INFO {line} Hello, World! Ana waves\n")
        );
    }

    #[test]
    fn bare_macro_logs_empty_message() {
        let (logger, sink) = logger();
        log_critical!(logger).unwrap();
        let out = sink.contents().unwrap();
        assert!(out.starts_with("CRITICAL "));
        assert!(out.ends_with(" \n"));
    }

    #[test]
    fn every_level_macro_uses_its_tag() {
        let (logger, sink) = logger();
        log_debug!(logger, "d").unwrap();
        log_warning!(logger, "w").unwrap();
        log_error!(logger, "e {}", 1).unwrap();
        log_at!(logger, Level::Observe, "o").unwrap();
        let tags: Vec<String> = sink
            .contents()
            .unwrap()
            .lines()
            .map(|l| l.split(' ').next().unwrap().to_string())
            .collect();
        assert_eq!(tags, vec!["DEBUG", "WARNING", "ERROR", "OBSERVE"]);
    }

    #[test]
    fn macro_surfaces_format_errors() {
        let (logger, _sink) = logger();
        let err = log_info!(logger, "{} {}", 1).unwrap_err();
        assert!(matches!(err, LogError::Format(_)));
    }

    #[test]
    fn values_macro_renders_pairs() {
        let (logger, sink) = logger();
        log_values!(logger, Level::Debug; 7u8; limit = "x").unwrap();
        let out = sink.contents().unwrap();
        assert!(out.contains("(u8, 7)"));
        assert!(out.contains("└ limit = (&str, \"x\")"));
    }
}
