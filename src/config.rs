use std::{fmt, path::PathBuf, rc::Rc};

use crate::log::{
    log_sink::{LogSink, SharedSink},
    logger::exe_dir_fallback_cwd,
};

/// Line template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "[{type}] {file}:{line} {message}";

/// File stem shared by every logger in [`SinkMode::Unified`].
pub const UNIFIED_FILE_STEM: &str = "shared";

/// Name of the directory created next to the entry point.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// How file-backed loggers pick their file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkMode {
    /// All loggers append to `shared.<ext>`.
    #[default]
    Unified,
    /// Each logger truncates and writes `<name>.<ext>`.
    PerLogger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileExtension {
    #[default]
    Log,
    Txt,
}

impl FileExtension {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FileExtension::Log => "log",
            FileExtension::Txt => "txt",
        }
    }
}

/// Everything a [`Logger`](crate::log::logger::Logger) needs at construction.
///
/// Sink resolution order: an explicit `sink`, then an in-memory buffer when
/// `persist` is off, then a file under [`resolved_log_dir`](Self::resolved_log_dir).
#[derive(Clone)]
pub struct LoggerConfig {
    /// Logger identifier; derived from the caller's file stem when `None`.
    pub name: Option<String>,
    pub template: String,
    /// Directory for log files. `~` is expanded.
    pub log_dir: Option<String>,
    pub sink_mode: SinkMode,
    pub extension: FileExtension,
    pub persist: bool,
    /// Box-draw prefixes on multi-line records.
    pub framing: bool,
    /// Silently drop writes once the sink is closed.
    pub ignore_if_closed: bool,
    pub sink: Option<Rc<dyn LogSink>>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: None,
            template: DEFAULT_TEMPLATE.to_string(),
            log_dir: None,
            sink_mode: SinkMode::default(),
            extension: FileExtension::default(),
            persist: true,
            framing: true,
            ignore_if_closed: false,
            sink: None,
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<String>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_sink_mode(mut self, mode: SinkMode) -> Self {
        self.sink_mode = mode;
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: FileExtension) -> Self {
        self.extension = extension;
        self
    }

    #[must_use]
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    #[must_use]
    pub fn with_framing(mut self, framing: bool) -> Self {
        self.framing = framing;
        self
    }

    #[must_use]
    pub fn with_ignore_if_closed(mut self, ignore: bool) -> Self {
        self.ignore_if_closed = ignore;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Some(Rc::new(sink));
        self
    }

    #[must_use]
    pub fn with_stdout(self) -> Self {
        self.with_sink(SharedSink::stdout())
    }

    /// Configured directory, or `logs/` next to the executable.
    #[must_use]
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map_or_else(|| exe_dir_fallback_cwd().join(DEFAULT_LOG_DIR), expand_path)
    }

    /// File name a logger called `name` writes to.
    #[must_use]
    pub fn file_name_for(&self, name: &str) -> String {
        let stem = match self.sink_mode {
            SinkMode::Unified => UNIFIED_FILE_STEM,
            SinkMode::PerLogger => name,
        };
        format!("{stem}.{}", self.extension.as_str())
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("log_dir", &self.log_dir)
            .field("sink_mode", &self.sink_mode)
            .field("extension", &self.extension)
            .field("persist", &self.persist)
            .field("framing", &self.framing)
            .field("ignore_if_closed", &self.ignore_if_closed)
            .field("sink", &self.sink.as_ref().map(|_| "explicit"))
            .finish()
    }
}

/// Expands tilde (`~`) in file paths to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    if path_str.starts_with('~') {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);

        if let Some(mut home_path) = home {
            if path_str == "~" {
                return home_path;
            }
            if let Some(rest) = path_str
                .strip_prefix("~/")
                .or_else(|| path_str.strip_prefix("~\\"))
            {
                home_path.push(rest);
                return home_path;
            }
        }
    }
    PathBuf::from(path_str)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.template, DEFAULT_TEMPLATE);
        assert_eq!(cfg.sink_mode, SinkMode::Unified);
        assert!(cfg.persist);
        assert!(cfg.framing);
        assert!(!cfg.ignore_if_closed);
        assert!(cfg.sink.is_none());
        assert!(cfg.resolved_log_dir().ends_with(DEFAULT_LOG_DIR));
    }

    #[test]
    fn file_name_follows_sink_mode() {
        let unified = LoggerConfig::new();
        assert_eq!(unified.file_name_for("worker"), "shared.log");

        let per = LoggerConfig::new()
            .with_sink_mode(SinkMode::PerLogger)
            .with_extension(FileExtension::Txt);
        assert_eq!(per.file_name_for("worker"), "worker.txt");
    }

    #[test]
    fn explicit_log_dir_wins() {
        let cfg = LoggerConfig::new().with_log_dir("/tmp/somewhere");
        assert_eq!(cfg.resolved_log_dir(), PathBuf::from("/tmp/somewhere"));
    }

    #[test]
    fn expand_path_leaves_plain_paths() {
        assert_eq!(expand_path("logs/a"), PathBuf::from("logs/a"));
    }

    #[test]
    fn expand_path_replaces_tilde_when_home_is_known() {
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(expand_path("~"), PathBuf::from(&home));
            assert_eq!(expand_path("~/logs"), PathBuf::from(home).join("logs"));
        }
    }

    #[test]
    fn debug_hides_sink_internals() {
        let cfg = LoggerConfig::new().with_stdout().with_name("dbg");
        let shown = format!("{cfg:?}");
        assert!(shown.contains("explicit"));
        assert!(shown.contains("dbg"));
    }
}
