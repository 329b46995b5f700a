use std::fmt;

use crate::log::{log_level::Level, logger::Logger};

/// RAII guard returned by [`Logger::quiet`].
///
/// Dropping it undoes exactly what the matching `quiet` call changed: levels
/// that were already muted before stay muted, and the mute-all flag is only
/// cleared if this guard was the one that set it.
///
/// Restoring is the same as calling [`Logger::unquiet`] with the levels this
/// guard added. A level that was unmuted and muted again after the guard was
/// created (even by a persisted guard) is unmuted as well.
#[must_use = "dropping the guard immediately unmutes the levels it muted"]
pub struct QuietGuard<'a> {
    logger: &'a Logger,
    added: Vec<Level>,
    set_all: bool,
    armed: bool,
}

impl<'a> QuietGuard<'a> {
    pub(crate) fn new(logger: &'a Logger, added: Vec<Level>, set_all: bool) -> Self {
        Self {
            logger,
            added,
            set_all,
            armed: true,
        }
    }

    /// Levels this guard muted that were not muted before.
    #[must_use]
    pub fn added_levels(&self) -> &[Level] {
        &self.added
    }

    /// True when this guard switched on mute-all.
    #[must_use]
    pub fn muted_everything(&self) -> bool {
        self.set_all
    }

    /// Restores the previous state now instead of at scope exit.
    pub fn release(mut self) {
        self.restore();
    }

    /// Keeps the muting in place after the guard goes away.
    ///
    /// Use [`Logger::unquiet`] to lift it later.
    pub fn persist(mut self) {
        self.armed = false;
    }

    fn restore(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        self.logger.restore_suppression(&self.added, self.set_all);
    }
}

impl Drop for QuietGuard<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

impl fmt::Debug for QuietGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuietGuard")
            .field("logger", &self.logger.name())
            .field("added", &self.added)
            .field("set_all", &self.set_all)
            .field("armed", &self.armed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use crate::{Level, LogError, Logger};

    #[test]
    fn debug_shows_guard_state() {
        let logger = Logger::in_memory("guarded").unwrap();
        let guard = logger.quiet(&[Level::Debug]);
        let shown = format!("{guard:?}");
        assert!(shown.contains("\"guarded\""));
        assert!(shown.contains("added: [Debug]"));
        assert!(shown.contains("set_all: false"));
        assert!(shown.contains("armed: true"));
    }

    #[test]
    fn failed_named_quiet_can_be_unwrapped_as_error() {
        let logger = Logger::in_memory("guarded").unwrap();
        let err = logger.quiet_named(&["verbose"]).unwrap_err();
        assert!(matches!(err, LogError::UnknownLevel(_)));
        assert!(logger.suppressed_levels().is_empty());
    }

    #[test]
    fn release_undoes_levels_muted_again_later() {
        let logger = Logger::in_memory("guarded").unwrap();
        let guard = logger.quiet(&[Level::Debug]);
        logger.unquiet(&[Level::Debug]);
        logger.quiet(&[Level::Debug]).persist();
        assert!(logger.is_suppressed(Level::Debug));

        drop(guard);
        assert!(!logger.is_suppressed(Level::Debug));
    }
}
