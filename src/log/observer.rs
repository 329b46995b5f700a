//! Function observation.
//!
//! [`Logger::observe`](crate::log::logger::Logger::observe) returns an
//! [`Observer`]; wrapping a function with it yields an [`Observed`] callable
//! that logs every invocation:
//!
//! ```text
//! 'add' at src/main.rs:12
//! Args: 2, 3
//! Return: 5
//! ```
//!
//! Successful calls are logged at `OBSERVE`, failed ones at `ERROR` with the
//! error's type, message and trace.

use std::{
    any::Any,
    cell::RefCell,
    collections::BTreeMap,
    fmt::{self, Debug, Display},
    fs,
    panic::{self, AssertUnwindSafe, Location},
};

use crate::log::{
    log_error::LogError,
    log_level::Level,
    log_msg::{CallSite, LogMsg, relative_path},
    logger::Logger,
    template::short_type_name,
};

/// Arguments of an observed call, as they appear in the log.
///
/// Implemented for `()` and tuples of up to six `Debug` values (positional)
/// and for `BTreeMap` (named). [`Call`] carries both at once.
pub trait ObservedArgs {
    fn positional(&self) -> Vec<String> {
        Vec::new()
    }

    fn named(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

impl ObservedArgs for () {}

macro_rules! tuple_args {
    ($($T:ident $idx:tt),+) => {
        impl<$($T: Debug),+> ObservedArgs for ($($T,)+) {
            fn positional(&self) -> Vec<String> {
                vec![$(format!("{:?}", self.$idx)),+]
            }
        }
    };
}

tuple_args!(A 0);
tuple_args!(A 0, B 1);
tuple_args!(A 0, B 1, C 2);
tuple_args!(A 0, B 1, C 2, D 3);
tuple_args!(A 0, B 1, C 2, D 3, E 4);
tuple_args!(A 0, B 1, C 2, D 3, E 4, F 5);

impl<K: Display, V: Debug> ObservedArgs for BTreeMap<K, V> {
    fn named(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(k, v)| (k.to_string(), format!("{v:?}")))
            .collect()
    }
}

/// What the observer needs to describe a failed call.
pub trait ObservedError {
    /// Short type name, e.g. `ParseIntError`.
    fn kind(&self) -> String;

    fn message(&self) -> String;

    /// Trace lines printed under the `kind: message` line.
    fn trace(&self) -> Vec<String>;
}

impl<E: std::error::Error> ObservedError for E {
    fn kind(&self) -> String {
        short_type_name(std::any::type_name::<E>())
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn trace(&self) -> Vec<String> {
        cause_lines(self.source())
    }
}

fn cause_lines(mut source: Option<&(dyn std::error::Error + 'static)>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(err) = source {
        lines.push(format!("Caused by: {err}"));
        source = err.source();
    }
    lines
}

/// Error wrapper that remembers where it was raised and every `?` it crossed.
///
/// `Traced::new` (or `?` on a plain error inside a function returning
/// `Result<_, Traced<E>>`) records the raise point; [`hop`](Self::hop)
/// records each further propagation step.
pub struct Traced<E> {
    error: E,
    frames: Vec<&'static Location<'static>>,
}

impl<E> Traced<E> {
    #[track_caller]
    pub fn new(error: E) -> Self {
        Self {
            error,
            frames: vec![Location::caller()],
        }
    }

    /// Records the caller as one more frame.
    #[track_caller]
    #[must_use]
    pub fn hop(mut self) -> Self {
        self.frames.push(Location::caller());
        self
    }

    /// Frames from the raise point outwards.
    #[must_use]
    pub fn frames(&self) -> &[&'static Location<'static>] {
        &self.frames
    }

    #[must_use]
    pub fn inner(&self) -> &E {
        &self.error
    }

    pub fn into_inner(self) -> E {
        self.error
    }
}

impl<E> From<E> for Traced<E> {
    #[track_caller]
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl<E: Display> Display for Traced<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.error, f)
    }
}

impl<E: Debug> Debug for Traced<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("error", &self.error)
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl<E: std::error::Error> ObservedError for Traced<E> {
    fn kind(&self) -> String {
        self.error.kind()
    }

    fn message(&self) -> String {
        self.error.to_string()
    }

    fn trace(&self) -> Vec<String> {
        // Outermost frame first, raise point last.
        let mut lines: Vec<String> = self.frames.iter().rev().map(|loc| frame_line(loc)).collect();
        lines.extend(cause_lines(self.error.source()));
        lines
    }
}

fn frame_line(location: &Location<'_>) -> String {
    let path = relative_path(location.file());
    match source_line(location.file(), location.line()) {
        Some(text) => format!("  File {path}, line {}: {text}", location.line()),
        None => format!("  File {path}, line {}", location.line()),
    }
}

fn source_line(file: &str, line: u32) -> Option<String> {
    let index = usize::try_from(line.checked_sub(1)?).ok()?;
    let source = fs::read_to_string(file).ok()?;
    source.lines().nth(index).map(|l| l.trim().to_string())
}

/// Positional and named arguments of one observed call.
///
/// ```rust,ignore
/// let call = Call::new((1, 2)).kwarg("c", 4);
/// observed.call(call)?; // Args: 1, 2 / Kwargs: {c: 4}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Call<P, N> {
    pub args: P,
    pub kwargs: BTreeMap<String, N>,
}

impl<P, N> Call<P, N> {
    pub fn new(args: P) -> Self {
        Self {
            args,
            kwargs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn kwarg(mut self, key: impl Into<String>, value: N) -> Self {
        self.kwargs.insert(key.into(), value);
        self
    }
}

impl<P: ObservedArgs, N: Debug> ObservedArgs for Call<P, N> {
    fn positional(&self) -> Vec<String> {
        self.args.positional()
    }

    fn named(&self) -> Vec<(String, String)> {
        self.kwargs.named()
    }
}

/// Which parts of a call end up in its record.
#[derive(Debug, Clone, Copy)]
struct Shown {
    args: bool,
    kwargs: bool,
    ret: bool,
}

/// Pending observation created by [`Logger::observe`].
///
/// Argument, keyword and return lines are all logged by default; the
/// `with_*` switches leave them out.
#[derive(Debug, Clone, Copy)]
pub struct Observer<'a> {
    logger: &'a Logger,
    suppress_errors: bool,
    shown: Shown,
}

impl<'a> Observer<'a> {
    pub(crate) fn new(logger: &'a Logger, suppress_errors: bool) -> Self {
        Self {
            logger,
            suppress_errors,
            shown: Shown {
                args: true,
                kwargs: true,
                ret: true,
            },
        }
    }

    #[must_use]
    pub fn with_args(mut self, show: bool) -> Self {
        self.shown.args = show;
        self
    }

    #[must_use]
    pub fn with_kwargs(mut self, show: bool) -> Self {
        self.shown.kwargs = show;
        self
    }

    #[must_use]
    pub fn with_return(mut self, show: bool) -> Self {
        self.shown.ret = show;
        self
    }

    /// Wraps `func`. Its name defaults to the function's path and its
    /// location to the line calling `wrap`.
    #[track_caller]
    pub fn wrap<F>(self, func: F) -> Observed<'a, F> {
        Observed {
            logger: self.logger,
            suppress_errors: self.suppress_errors,
            shown: self.shown,
            name: qualified_name(std::any::type_name::<F>()),
            declared_at: CallSite::caller(),
            func,
            log_error: RefCell::new(None),
        }
    }
}

/// A function whose calls are logged.
pub struct Observed<'a, F> {
    logger: &'a Logger,
    suppress_errors: bool,
    shown: Shown,
    name: String,
    declared_at: CallSite,
    func: F,
    log_error: RefCell<Option<LogError>>,
}

impl<F> Observed<'_, F> {
    /// Overrides the name shown in the log.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn declared_at(&self) -> CallSite {
        self.declared_at
    }

    /// The most recent failure to write an observation record, if any.
    ///
    /// `call` returns the wrapped function's own outcome, so a failed log
    /// write is parked here instead.
    pub fn take_log_error(&self) -> Option<LogError> {
        self.log_error.borrow_mut().take()
    }

    /// Calls the wrapped function and logs the outcome.
    ///
    /// Returns `Ok(Some(value))` on success. On error the error is logged,
    /// then returned unchanged, or swallowed as `Ok(None)` when the observer
    /// suppresses errors. A panic is logged and resumed (or swallowed) the
    /// same way.
    #[track_caller]
    pub fn call<A, T, E>(&self, args: A) -> Result<Option<T>, E>
    where
        F: Fn(A) -> Result<T, E>,
        A: ObservedArgs,
        T: Debug,
        E: ObservedError,
    {
        let site = CallSite::caller();
        let header = self.header(&args);

        match panic::catch_unwind(AssertUnwindSafe(|| (self.func)(args))) {
            Ok(Ok(value)) => {
                let text = if self.shown.ret {
                    format!("{header}\nReturn: {value:?}")
                } else {
                    header
                };
                self.report(Level::Observe, site, text);
                Ok(Some(value))
            }
            Ok(Err(error)) => {
                let mut text = format!("{header}\n{}: {}", error.kind(), error.message());
                for line in error.trace() {
                    text.push('\n');
                    text.push_str(&line);
                }
                self.report(Level::Error, site, text);
                if self.suppress_errors {
                    Ok(None)
                } else {
                    Err(error)
                }
            }
            Err(payload) => {
                let text = format!("{header}\npanicked: {}", panic_message(payload.as_ref()));
                self.report(Level::Error, site, text);
                if self.suppress_errors {
                    Ok(None)
                } else {
                    panic::resume_unwind(payload)
                }
            }
        }
    }

    fn header(&self, args: &impl ObservedArgs) -> String {
        let mut text = format!(
            "'{}' at {}:{}",
            self.name,
            self.declared_at.display_path(),
            self.declared_at.line()
        );

        let positional = if self.shown.args {
            args.positional()
        } else {
            Vec::new()
        };
        if !positional.is_empty() {
            text.push_str("\nArgs: ");
            text.push_str(&positional.join(", "));
        }

        let named = if self.shown.kwargs {
            args.named()
        } else {
            Vec::new()
        };
        if !named.is_empty() {
            let pairs: Vec<String> = named.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            text.push_str(&format!("\nKwargs: {{{}}}", pairs.join(", ")));
        }
        text
    }

    fn report(&self, level: Level, site: CallSite, text: String) {
        if let Err(e) = self.logger.emit(LogMsg::new(level, text, site)) {
            *self.log_error.borrow_mut() = Some(e);
        }
    }
}

impl<F> Debug for Observed<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observed")
            .field("name", &self.name)
            .field("declared_at", &self.declared_at)
            .field("suppress_errors", &self.suppress_errors)
            .field("shown", &self.shown)
            .finish_non_exhaustive()
    }
}

/// `crate::math::add` becomes `add`; closures keep their enclosing function,
/// e.g. `run::{{closure}}`.
fn qualified_name(full: &str) -> String {
    const CLOSURE: &str = "::{{closure}}";
    match full.strip_suffix(CLOSURE) {
        Some(outer) => format!("{}{CLOSURE}", short_type_name(outer)),
        None => short_type_name(full),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
