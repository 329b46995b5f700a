use crate::{
    config::{LoggerConfig, SinkMode},
    log::{
        log_error::LogError,
        log_level::Level,
        log_msg::{CallSite, LogMsg},
        log_sink::{LogSink, SharedSink},
        observer::Observer,
        quiet_guard::QuietGuard,
        template::{FormatArgs, Template, Unused, Value, render_values},
    },
};

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    fmt::{self, Display},
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    rc::Rc,
};

/// Prefix of the first line of a multi-line record.
pub const OPEN_MULTILINE: &str = "┌ ";
/// Prefix of interior lines of a multi-line record.
pub const PREFIX_MULTILINE: &str = "│ ";
/// Prefix of the last line of a multi-line record.
pub const CLOSE_MULTILINE: &str = "└ ";

/// Placeholders accepted in a line template.
pub const LINE_FIELDS: [&str; 7] = [
    "type",
    "file",
    "source_location",
    "line",
    "message",
    "name",
    "time",
];

/// Leveled logger writing one line per call to its sink.
///
/// Every public logging method is `#[track_caller]`: the `{file}` and
/// `{line}` of a record are those of the code that called it, not of this
/// crate.
///
/// # Suppression
///
/// Levels are muted with [`quiet`](Self::quiet) and unmuted with
/// [`unquiet`](Self::unquiet). A muted call writes nothing and does not even
/// format its message.
///
/// # Release
///
/// Dropping the logger (or calling [`close`](Self::close)) closes its sink,
/// unless the sink is stdout.
///
/// # Example
///
/// ```rust,ignore
/// let logger = Logger::in_memory("demo")?;
/// logger.info("Hello, {}!", &[&"World"])?;
/// assert!(logger.contents().unwrap().ends_with("Hello, World!\n"));
/// ```
pub struct Logger {
    name: String,
    sink: Rc<dyn LogSink>,
    template: Template,
    framing: bool,
    ignore_if_closed: bool,
    file_path: Option<PathBuf>,
    suppressed: RefCell<HashSet<Level>>,
    suppress_all: Cell<bool>,
    released: Cell<bool>,
}

impl Logger {
    /// Builds a logger from `config`.
    ///
    /// When the config has no name the caller's file stem is used. Fails with
    /// [`LogError::Format`] on a bad line template and [`LogError::Storage`]
    /// when the log directory or file cannot be prepared.
    #[track_caller]
    pub fn new(config: LoggerConfig) -> Result<Self, LogError> {
        Self::build(config, CallSite::caller(), None)
    }

    /// Logger writing to the process stdout.
    #[track_caller]
    pub fn stdout(name: impl Into<String>) -> Result<Self, LogError> {
        Self::build(
            LoggerConfig::new().with_name(name).with_stdout(),
            CallSite::caller(),
            None,
        )
    }

    /// Logger writing to a private in-memory buffer.
    #[track_caller]
    pub fn in_memory(name: impl Into<String>) -> Result<Self, LogError> {
        Self::build(
            LoggerConfig::new().with_name(name).with_persist(false),
            CallSite::caller(),
            None,
        )
    }

    /// File-backed logger in `logs/` next to the executable.
    #[track_caller]
    pub fn start_default(config: LoggerConfig) -> Result<Self, LogError> {
        Self::build(config.with_persist(true), CallSite::caller(), None)
    }

    /// File-backed logger in `dir`, created if missing.
    #[track_caller]
    pub fn start_in_dir<D: AsRef<Path>>(dir: D, config: LoggerConfig) -> Result<Self, LogError> {
        Self::build(
            config.with_persist(true),
            CallSite::caller(),
            Some(dir.as_ref().to_path_buf()),
        )
    }

    fn build(
        config: LoggerConfig,
        site: CallSite,
        dir: Option<PathBuf>,
    ) -> Result<Self, LogError> {
        let template = Template::parse(&config.template)?;
        template.ensure_named_within(&LINE_FIELDS)?;

        let name = config
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| site.stem().to_string());

        let (sink, file_path): (Rc<dyn LogSink>, Option<PathBuf>) = match config.sink.clone() {
            Some(sink) => (sink, None),
            None if !config.persist => (Rc::new(SharedSink::memory()), None),
            None => {
                let dir = dir.unwrap_or_else(|| config.resolved_log_dir());
                let (file, path) =
                    open_log_file(&dir, &config.file_name_for(&name), config.sink_mode)?;
                (Rc::new(SharedSink::file(file)), Some(path))
            }
        };

        Ok(Self {
            name,
            sink,
            template,
            framing: config.framing,
            ignore_if_closed: config.ignore_if_closed,
            file_path,
            suppressed: RefCell::new(HashSet::new()),
            suppress_all: Cell::new(false),
            released: Cell::new(false),
        })
    }

    // ---------------- Logging ----------------

    /// Formats `template` with `args` and writes it at `level`.
    ///
    /// An empty template logs an empty message. Placeholders that do not
    /// match `args` fail with [`LogError::Format`] and nothing is written.
    #[track_caller]
    pub fn log(&self, level: Level, template: &str, args: &FormatArgs) -> Result<(), LogError> {
        self.log_at(level, CallSite::caller(), template, args)
    }

    /// Same as [`log`](Self::log) with an explicit call site.
    pub fn log_at(
        &self,
        level: Level,
        site: CallSite,
        template: &str,
        args: &FormatArgs,
    ) -> Result<(), LogError> {
        if self.is_suppressed(level) {
            return Ok(());
        }
        let message = Template::parse(template)?.fill(args, Unused::Reject)?;
        self.emit(LogMsg::new(level, message, site))
    }

    /// Logs each value as a `(type, representation)` pair, one per line.
    #[track_caller]
    pub fn inspect(&self, level: Level, values: &[Value]) -> Result<(), LogError> {
        self.inspect_at(level, CallSite::caller(), values)
    }

    pub fn inspect_at(&self, level: Level, site: CallSite, values: &[Value]) -> Result<(), LogError> {
        if self.is_suppressed(level) {
            return Ok(());
        }
        self.emit(LogMsg::new(level, render_values(values), site))
    }

    #[track_caller]
    pub fn debug(&self, template: &str, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log_at(Level::Debug, CallSite::caller(), template, &args.into())
    }

    #[track_caller]
    pub fn info(&self, template: &str, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log_at(Level::Info, CallSite::caller(), template, &args.into())
    }

    #[track_caller]
    pub fn warning(&self, template: &str, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log_at(Level::Warning, CallSite::caller(), template, &args.into())
    }

    #[track_caller]
    pub fn error(&self, template: &str, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log_at(Level::Error, CallSite::caller(), template, &args.into())
    }

    #[track_caller]
    pub fn critical(&self, template: &str, args: &[&dyn Display]) -> Result<(), LogError> {
        self.log_at(Level::Critical, CallSite::caller(), template, &args.into())
    }

    /// Renders and writes an already formatted record.
    pub(crate) fn emit(&self, msg: LogMsg) -> Result<(), LogError> {
        if self.is_suppressed(msg.level) {
            return Ok(());
        }
        if self.sink.is_closed() {
            return if self.ignore_if_closed {
                Ok(())
            } else {
                Err(LogError::SinkClosed)
            };
        }
        let line = self.render(&msg)?;
        self.sink.write_line(&line)?;
        Ok(())
    }

    /// The line `msg` would produce, framing included, without the newline.
    pub fn render(&self, msg: &LogMsg) -> Result<String, LogError> {
        let file = msg.site.display_path();
        let mut fields = FormatArgs::new()
            .named("type", msg.level)
            .named("file", &file)
            .named("source_location", &file)
            .named("line", msg.site.line())
            .named("message", &msg.text)
            .named("name", &self.name);
        if self.template.uses("time") {
            fields.insert("time", msg.stamp());
        }

        let line = self.template.fill(&fields, Unused::Allow)?;
        Ok(if self.framing {
            frame_lines(&line)
        } else {
            line
        })
    }

    // ---------------- Suppression ----------------

    /// Mutes `levels`, or every level when `levels` is empty.
    ///
    /// The returned guard restores the previous state when dropped; call
    /// [`QuietGuard::persist`] to keep the levels muted.
    pub fn quiet(&self, levels: &[Level]) -> QuietGuard<'_> {
        if levels.is_empty() {
            let set_all = !self.suppress_all.replace(true);
            return QuietGuard::new(self, Vec::new(), set_all);
        }
        let mut muted = self.suppressed.borrow_mut();
        let added = levels.iter().copied().filter(|l| muted.insert(*l)).collect();
        drop(muted);
        QuietGuard::new(self, added, false)
    }

    /// [`quiet`](Self::quiet) with level names, matched case-insensitively.
    pub fn quiet_named(&self, names: &[&str]) -> Result<QuietGuard<'_>, LogError> {
        let levels = parse_levels(names)?;
        Ok(self.quiet(&levels))
    }

    /// Unmutes `levels`; with an empty slice, unmutes everything.
    ///
    /// Levels that are not muted are ignored.
    pub fn unquiet(&self, levels: &[Level]) {
        let mut muted = self.suppressed.borrow_mut();
        if levels.is_empty() {
            self.suppress_all.set(false);
            muted.clear();
            return;
        }
        for lvl in levels {
            muted.remove(lvl);
        }
    }

    pub fn unquiet_named(&self, names: &[&str]) -> Result<(), LogError> {
        let levels = parse_levels(names)?;
        self.unquiet(&levels);
        Ok(())
    }

    #[must_use]
    pub fn is_suppressed(&self, level: Level) -> bool {
        self.suppress_all.get() || self.suppressed.borrow().contains(&level)
    }

    #[must_use]
    pub fn suppresses_all(&self) -> bool {
        self.suppress_all.get()
    }

    /// Individually muted levels, in [`Level::ALL`] order.
    #[must_use]
    pub fn suppressed_levels(&self) -> Vec<Level> {
        let muted = self.suppressed.borrow();
        Level::ALL
            .into_iter()
            .filter(|l| muted.contains(l))
            .collect()
    }

    pub(crate) fn restore_suppression(&self, added: &[Level], set_all: bool) {
        let mut muted = self.suppressed.borrow_mut();
        for lvl in added {
            muted.remove(lvl);
        }
        if set_all {
            self.suppress_all.set(false);
        }
    }

    // ---------------- Observation ----------------

    /// Starts wrapping a function so its calls are logged.
    ///
    /// With `suppress_errors` the wrapped call swallows errors after
    /// logging them instead of returning them.
    pub fn observe(&self, suppress_errors: bool) -> Observer<'_> {
        Observer::new(self, suppress_errors)
    }

    // ---------------- Getters ----------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The line template source.
    #[must_use]
    pub fn template(&self) -> &str {
        self.template.as_str()
    }

    #[must_use]
    pub fn sink(&self) -> &Rc<dyn LogSink> {
        &self.sink
    }

    /// Buffered text for in-memory sinks.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.sink.contents()
    }

    /// Path of the log file when the logger opened one itself.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    // ---------------- Release ----------------

    /// Releases the logger, closing its sink unless it is stdout.
    pub fn close(self) -> Result<(), LogError> {
        self.release()
    }

    fn release(&self) -> Result<(), LogError> {
        if self.released.replace(true) || self.sink.is_stdout() {
            return Ok(());
        }
        self.sink.close()?;
        Ok(())
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        // Errors cannot surface from Drop; `close` reports them.
        let _ = self.release();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("template", &self.template.as_str())
            .field("file_path", &self.file_path)
            .field("suppress_all", &self.suppress_all.get())
            .field("suppressed", &self.suppressed_levels())
            .finish_non_exhaustive()
    }
}

/// Prefixes the lines of a multi-line text with box-drawing markers.
///
/// Single-line text is returned unchanged.
#[must_use]
pub fn frame_lines(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let prefix = match i {
                0 => OPEN_MULTILINE,
                i if i == last => CLOSE_MULTILINE,
                _ => PREFIX_MULTILINE,
            };
            format!("{prefix}{line}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_levels(names: &[&str]) -> Result<Vec<Level>, LogError> {
    names.iter().map(|n| n.parse()).collect()
}

/// Creates `dir` if needed and opens `file_name` inside it.
///
/// Unified files are appended to so every logger sharing them keeps its
/// lines; per-logger files start empty.
fn open_log_file(
    dir: &Path,
    file_name: &str,
    mode: SinkMode,
) -> Result<(File, PathBuf), LogError> {
    fs::create_dir_all(dir).map_err(|e| LogError::storage(dir, e))?;

    let path = dir.join(file_name);
    let mut options = OpenOptions::new();
    match mode {
        SinkMode::Unified => options.create(true).append(true),
        SinkMode::PerLogger => options.create(true).write(true).truncate(true),
    };
    let file = options
        .open(&path)
        .map_err(|e| LogError::storage(&path, e))?;
    Ok((file, path))
}

/// Directory of the running executable, or the current working directory
/// when it cannot be determined.
pub(crate) fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}
