#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{collections::BTreeMap, fmt, fs, num::ParseIntError};

use plainlog::{
    Call, FileExtension, Level, LogError, LogSink, Logger, LoggerConfig, SharedSink, SinkMode,
    log_info, log_values, log_warning,
};

fn memory_logger(template: &str) -> (Logger, SharedSink) {
    let sink = SharedSink::memory();
    let logger = Logger::new(
        LoggerConfig::new()
            .with_name("it")
            .with_template(template)
            .with_sink(sink.clone()),
    )
    .unwrap();
    (logger, sink)
}

#[test]
fn unified_loggers_share_one_file_in_call_order() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = LoggerConfig::new().with_template("{name}: {message}");

    let first = Logger::start_in_dir(dir.path(), cfg.clone().with_name("first")).unwrap();
    let second = Logger::start_in_dir(dir.path(), cfg.with_name("second")).unwrap();
    assert_eq!(first.file_path(), second.file_path());

    first.info("one", &[]).unwrap();
    second.warning("two", &[]).unwrap();
    first.error("three {}", &[&3]).unwrap();
    first.close().unwrap();
    second.close().unwrap();

    let text = fs::read_to_string(dir.path().join("shared.log")).unwrap();
    assert_eq!(text, "first: one\nsecond: two\nfirst: three 3\n");
}

#[test]
fn per_logger_files_start_empty_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = LoggerConfig::new()
        .with_name("worker")
        .with_template("{message}")
        .with_sink_mode(SinkMode::PerLogger)
        .with_extension(FileExtension::Txt);

    let logger = Logger::start_in_dir(dir.path(), cfg.clone()).unwrap();
    logger.info("old run", &[]).unwrap();
    drop(logger);

    let logger = Logger::start_in_dir(dir.path(), cfg).unwrap();
    logger.info("new run", &[]).unwrap();
    drop(logger);

    let text = fs::read_to_string(dir.path().join("worker.txt")).unwrap();
    assert_eq!(text, "new run\n");
}

#[test]
fn default_template_points_at_this_file() {
    let (logger, sink) = memory_logger(plainlog::config::DEFAULT_TEMPLATE);
    let line = line!() + 1;
    logger.info("Hello, {}!", &[&"World"]).unwrap();
    assert_eq!(
        sink.contents().unwrap(),
        format!("[INFO] tests/logger_behavior.rs:{line} Hello, World!\n")
    );
}

#[test]
fn macros_capture_the_invocation_line() {
    let (logger, sink) = memory_logger("{line} {message}");
    let line = line!() + 1;
    log_warning!(logger, "{user} retried {} times", 3; user = "ana").unwrap();
    assert_eq!(
        sink.contents().unwrap(),
        format!("{line} ana retried 3 times\n")
    );
}

#[test]
fn scoped_quiet_restores_previous_state() {
    let (logger, sink) = memory_logger("{type} {message}");
    let _outer = logger.quiet(&[Level::Debug]);
    {
        let _inner = logger.quiet_named(&["debug", "INFO"]).unwrap();
        log_info!(logger, "hidden").unwrap();
        logger.debug("hidden", &[]).unwrap();
    }
    log_info!(logger, "shown").unwrap();
    logger.debug("still hidden", &[]).unwrap();

    assert_eq!(sink.contents().unwrap(), "INFO shown\n");
    assert!(logger.is_suppressed(Level::Debug));
    assert!(!logger.is_suppressed(Level::Info));
}

#[test]
fn unknown_level_name_is_rejected() {
    let (logger, _sink) = memory_logger("{message}");
    let err = logger.quiet_named(&["verbose"]).unwrap_err();
    assert!(matches!(err, LogError::UnknownLevel(name) if name == "verbose"));
}

#[test]
fn multi_line_records_are_framed() {
    let (logger, sink) = memory_logger("{type} {message}");
    logger.info("a\nb\nc", &[]).unwrap();
    assert_eq!(sink.contents().unwrap(), "┌ INFO a\n│ b\n└ c\n");
}

#[test]
fn inspected_values_show_type_and_debug() {
    let (logger, sink) = memory_logger("{message}");
    let xs = vec![Some(1u8), None];
    log_values!(logger, Level::Debug; xs).unwrap();
    assert_eq!(
        sink.contents().unwrap(),
        "(Vec<Option<u8>>, [Some(1), None])\n"
    );
}

#[test]
fn writes_after_close_fail_unless_ignored() {
    let sink = SharedSink::memory();
    let strict = Logger::new(LoggerConfig::new().with_sink(sink.clone())).unwrap();
    let lenient = Logger::new(
        LoggerConfig::new()
            .with_sink(sink.clone())
            .with_ignore_if_closed(true),
    )
    .unwrap();

    sink.close().unwrap();
    assert!(matches!(
        strict.info("late", &[]),
        Err(LogError::SinkClosed)
    ));
    lenient.info("late", &[]).unwrap();
}

#[derive(Debug, PartialEq)]
struct DivisionByZero;

impl fmt::Display for DivisionByZero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("division by zero")
    }
}

impl std::error::Error for DivisionByZero {}

fn divide((a, b): (i32, i32)) -> Result<i32, DivisionByZero> {
    if b == 0 {
        return Err(DivisionByZero);
    }
    Ok(a / b)
}

#[test]
fn observer_logs_calls_through_the_public_api() {
    let (logger, sink) = memory_logger("[{type}] {message}");
    let observed = logger.observe(true).wrap(divide);

    assert_eq!(observed.call((6, 3)).unwrap(), Some(2));
    assert_eq!(observed.call((1, 0)).unwrap(), None);

    let out = sink.contents().unwrap();
    assert!(out.contains("[OBSERVE] 'divide' at tests/logger_behavior.rs:"));
    assert!(out.contains("Args: 6, 3"));
    assert!(out.contains("Return: 2"));
    assert!(out.contains("[ERROR] 'divide'"));
    assert!(out.contains("DivisionByZero: division by zero"));
}

#[test]
fn observer_lists_named_arguments() {
    let (logger, sink) = memory_logger("{message}");
    let observed = logger
        .observe(false)
        .wrap(|opts: BTreeMap<&str, &str>| opts["port"].parse::<u16>())
        .named("parse_opts");

    let mut opts = BTreeMap::new();
    opts.insert("port", "80");
    assert_eq!(observed.call(opts).unwrap(), Some(80));

    let mut bad = BTreeMap::new();
    bad.insert("port", "eighty");
    let err: ParseIntError = observed.call(bad).unwrap_err();
    assert_eq!(err.to_string(), "invalid digit found in string");

    let out = sink.contents().unwrap();
    assert!(out.contains("Kwargs: {port: \"80\"}"));
    assert!(out.contains("ParseIntError: invalid digit found in string"));
}

#[test]
fn observer_logs_positional_and_named_arguments_together() {
    let (logger, sink) = memory_logger("{message}");
    let observed = logger
        .observe(false)
        .with_return(false)
        .wrap(|call: Call<(&str,), u16>| {
            Ok::<_, DivisionByZero>(format!("{}:{}", call.args.0, call.kwargs["port"]))
        })
        .named("address");

    let got = observed
        .call(Call::new(("localhost",)).kwarg("port", 8080))
        .unwrap();
    assert_eq!(got.as_deref(), Some("localhost:8080"));

    let out = sink.contents().unwrap();
    assert!(out.contains("│ Args: \"localhost\"\n"));
    assert!(out.contains("└ Kwargs: {port: 8080}\n"));
    assert!(!out.contains("Return"));
}
