use std::{
    panic::Location,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::log::log_level::Level;

/// Source position of a log call, captured at the public API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// The location of whoever called the enclosing `#[track_caller]` function.
    #[track_caller]
    #[must_use]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }

    /// The file exactly as the compiler recorded it.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.file
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File path relative to the working or entry-point directory when it is
    /// absolute and lives under one of them.
    #[must_use]
    pub fn display_path(&self) -> String {
        relative_path(self.file)
    }

    /// File name without directories or extension, e.g. `main` for `src/main.rs`.
    #[must_use]
    pub fn stem(&self) -> &'static str {
        let file = self.file;
        let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
        name.split_once('.').map_or(name, |(stem, _)| stem)
    }
}

pub(crate) fn relative_path(path: &str) -> String {
    let p = Path::new(path);
    if p.is_absolute() {
        let bases = [
            std::env::current_dir().ok(),
            Some(crate::log::logger::exe_dir_fallback_cwd()),
        ];
        for base in bases.into_iter().flatten() {
            if let Ok(rest) = p.strip_prefix(&base) {
                return rest.display().to_string();
            }
        }
    }
    path.to_string()
}

/// A single record on its way to a sink.
#[derive(Debug, Clone)]
pub struct LogMsg {
    /// The tag written in `{type}`.
    pub level: Level,
    /// Seconds since the unix epoch at creation.
    pub ts_secs: u64,
    /// Where the log call was made.
    pub site: CallSite,
    /// The formatted message body.
    pub text: String,
}

impl LogMsg {
    pub fn new(level: Level, text: impl Into<String>, site: CallSite) -> Self {
        let ts_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            level,
            ts_secs,
            site,
            text: text.into(),
        }
    }

    /// Timestamp rendered as `YY/MM/DD HH:MM:SS` in UTC.
    #[must_use]
    pub fn stamp(&self) -> String {
        unix_to_utc(self.ts_secs).map_or_else(
            |_| format!("unix_{}", self.ts_secs),
            |tm| {
                format!(
                    "{:02}/{:02}/{:02} {:02}:{:02}:{:02}",
                    tm.year.rem_euclid(100),
                    tm.mon,
                    tm.day,
                    tm.hour,
                    tm.min,
                    tm.sec
                )
            },
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SimpleUtc {
    year: i32,
    mon: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
}

#[derive(Debug)]
enum UtcConvError {
    Year,
    Month,
    Day,
}

/// Civil-from-days conversion of a unix timestamp to a Gregorian UTC date.
#[allow(clippy::many_single_char_names)]
fn unix_to_utc(mut s: u64) -> Result<SimpleUtc, UtcConvError> {
    let sec = (s % 60) as u32;
    s /= 60;
    let min = (s % 60) as u32;
    s /= 60;
    let hour = (s % 24) as u32;
    s /= 24;

    let z: i128 = i128::from(s) + 719_468;

    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = mp + if mp < 10 { 3 } else { -9 }; // [1, 12]

    let year = i32::try_from(y + i128::from(m <= 2)).map_err(|_| UtcConvError::Year)?;
    let mon = u32::try_from(m).map_err(|_| UtcConvError::Month)?;
    let day = u32::try_from(d).map_err(|_| UtcConvError::Day)?;

    Ok(SimpleUtc {
        year,
        mon,
        day,
        hour,
        min,
        sec,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn caller_points_at_this_file() {
        let site = CallSite::caller();
        assert!(site.file().ends_with("log_msg.rs"));
        assert_eq!(site.stem(), "log_msg");
        assert!(site.line() > 0);
    }

    #[test]
    fn relative_paths_stay_untouched() {
        assert_eq!(relative_path("src/main.rs"), "src/main.rs");
    }

    #[test]
    fn absolute_paths_under_cwd_are_shortened() {
        let cwd = std::env::current_dir().unwrap();
        let abs = cwd.join("src").join("lib.rs");
        let shown = relative_path(abs.to_str().unwrap());
        assert_eq!(Path::new(&shown), Path::new("src").join("lib.rs"));
    }

    #[test]
    fn utc_conversion_known_instants() {
        assert_eq!(
            unix_to_utc(0).unwrap(),
            SimpleUtc { year: 1970, mon: 1, day: 1, hour: 0, min: 0, sec: 0 }
        );
        // 2024-02-29T12:34:56Z
        assert_eq!(
            unix_to_utc(1_709_210_096).unwrap(),
            SimpleUtc { year: 2024, mon: 2, day: 29, hour: 12, min: 34, sec: 56 }
        );
    }

    #[test]
    fn stamp_uses_two_digit_year() {
        let mut msg = LogMsg::new(Level::Info, "x", CallSite::new("a.rs", 1));
        msg.ts_secs = 1_709_210_096;
        assert_eq!(msg.stamp(), "24/02/29 12:34:56");
    }
}
