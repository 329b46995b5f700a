use std::{fmt, str::FromStr};

use crate::log::log_error::LogError;

/// Tags attached to every log record.
///
/// Levels carry no severity ordering: muting `Debug` does nothing to `Info`,
/// and there is no threshold. They only exist so callers can suppress the
/// exact tags they do not want to see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    /// Fine-grained diagnostics useful while debugging.
    Debug,
    /// Progress messages.
    Info,
    /// Something unexpected that does not stop the program.
    Warning,
    /// A failed operation, also used for errors caught by an observer.
    Error,
    /// A failure the program is unlikely to recover from.
    Critical,
    /// Records produced by an observed function call.
    Observe,
}

impl Level {
    /// Every level, in declaration order.
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Observe,
    ];

    /// Upper-case tag written in the `{type}` placeholder.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Observe => "OBSERVE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Level {
    type Err = LogError;

    /// Case-insensitive match against the level tags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Level::ALL
            .into_iter()
            .find(|lvl| lvl.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LogError::UnknownLevel(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::Level;

    #[test]
    fn parses_tags_ignoring_case() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("Warning".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!(" OBSERVE ".parse::<Level>().unwrap(), Level::Observe);
    }

    #[test]
    fn rejects_unknown_tags() {
        let err = "verbose".parse::<Level>().unwrap_err();
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn display_matches_tag() {
        for lvl in Level::ALL {
            assert_eq!(lvl.to_string(), lvl.tag());
        }
    }
}
