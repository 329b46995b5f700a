use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures raised while parsing or filling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unmatched '{{' at byte {0}")]
    UnclosedBrace(usize),
    #[error("single '}}' encountered at byte {0}")]
    StrayBrace(usize),
    #[error("format spec in placeholder '{0}' is not supported")]
    UnsupportedSpec(String),
    #[error("cannot switch between automatic and manual field numbering")]
    MixedNumbering,
    #[error("no positional value for placeholder {0}")]
    MissingPositional(usize),
    #[error("no named value for placeholder '{0}'")]
    MissingNamed(String),
    #[error("{0} positional value(s) not used by the template")]
    UnusedPositional(usize),
    #[error("named value '{0}' not used by the template")]
    UnusedNamed(String),
    #[error("unknown line placeholder '{0}'")]
    UnknownPlaceholder(String),
}

/// Errors surfaced by [`Logger`](crate::log::logger::Logger) operations.
#[derive(Debug, Error)]
pub enum LogError {
    /// The message or line template does not match the supplied values.
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    /// The log directory or file could not be created or opened.
    #[error("cannot prepare log storage at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing to the sink failed.
    #[error("write to log sink failed: {0}")]
    Io(#[from] io::Error),
    /// The sink was closed before this write.
    #[error("log sink is closed")]
    SinkClosed,
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),
}

impl LogError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}
