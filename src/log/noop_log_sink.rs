use std::io;

use crate::log::log_sink::LogSink;

/// Sink that accepts every line and keeps nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    #[inline]
    fn write_line(&self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{Level, Logger, LoggerConfig};

    #[test]
    fn logger_over_noop_sink_accepts_everything() {
        let logger = Logger::new(LoggerConfig::new().with_sink(NoopLogSink)).unwrap();
        logger.info("x {}", &[&1]).unwrap();
        assert!(!logger.is_suppressed(Level::Info));
        assert!(!NoopLogSink.is_closed());
        assert_eq!(logger.contents(), None);
        logger.close().unwrap();
    }
}
