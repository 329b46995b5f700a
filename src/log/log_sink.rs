use std::{
    cell::RefCell,
    fmt,
    fs::File,
    io::{self, Write},
    rc::Rc,
};

/// Destination of rendered log lines.
///
/// Implementations receive one complete line per call (without the trailing
/// newline) and must write it in a single unbuffered operation.
pub trait LogSink {
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Loggers leave stdout open when they are released.
    fn is_stdout(&self) -> bool {
        false
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn close(&self) -> io::Result<()> {
        Ok(())
    }

    /// Text written so far, for sinks that keep it in memory.
    fn contents(&self) -> Option<String> {
        None
    }
}

enum Target {
    Stdout,
    Stderr,
    File(File),
    Memory(Vec<u8>),
    Writer(Box<dyn Write>),
}

struct SinkState {
    target: Target,
    closed: bool,
}

/// Cloneable handle to one destination.
///
/// Clones share the destination and its open/closed state, so several
/// loggers can append to the same buffer or file. There is no locking:
/// the handle is `!Send` and meant for single-threaded programs.
#[derive(Clone)]
pub struct SharedSink {
    inner: Rc<RefCell<SinkState>>,
}

impl SharedSink {
    fn from_target(target: Target) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SinkState {
                target,
                closed: false,
            })),
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::from_target(Target::Stdout)
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self::from_target(Target::Stderr)
    }

    /// In-memory text buffer; read it back with [`LogSink::contents`].
    #[must_use]
    pub fn memory() -> Self {
        Self::from_target(Target::Memory(Vec::new()))
    }

    #[must_use]
    pub fn file(file: File) -> Self {
        Self::from_target(Target::File(file))
    }

    /// Any other writer. It is flushed after every line.
    pub fn writer(writer: impl Write + 'static) -> Self {
        Self::from_target(Target::Writer(Box::new(writer)))
    }

    /// True when both handles point at the same destination.
    #[must_use]
    pub fn same_as(&self, other: &SharedSink) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl LogSink for SharedSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut state = self.inner.borrow_mut();
        if state.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }

        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        let bytes = buf.as_bytes();

        match &mut state.target {
            Target::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            Target::Stderr => io::stderr().lock().write_all(bytes),
            Target::File(f) => f.write_all(bytes),
            Target::Memory(v) => {
                v.extend_from_slice(bytes);
                Ok(())
            }
            Target::Writer(w) => {
                w.write_all(bytes)?;
                w.flush()
            }
        }
    }

    fn is_stdout(&self) -> bool {
        matches!(self.inner.borrow().target, Target::Stdout)
    }

    fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    fn contents(&self) -> Option<String> {
        match &self.inner.borrow().target {
            Target::Memory(buf) => Some(String::from_utf8_lossy(buf).into_owned()),
            _ => None,
        }
    }

    fn close(&self) -> io::Result<()> {
        let mut state = self.inner.borrow_mut();
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        match &mut state.target {
            Target::File(f) => f.sync_all(),
            Target::Writer(w) => w.flush(),
            Target::Stdout => io::stdout().flush(),
            Target::Stderr | Target::Memory(_) => Ok(()),
        }
    }
}

impl fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        let kind = match state.target {
            Target::Stdout => "stdout",
            Target::Stderr => "stderr",
            Target::File(_) => "file",
            Target::Memory(_) => "memory",
            Target::Writer(_) => "writer",
        };
        f.debug_struct("SharedSink")
            .field("target", &kind)
            .field("closed", &state.closed)
            .finish()
    }
}
