//! Severity levels and the wire format for one log record.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Severity of a log record.
///
/// Ordered `Debug < Info < Warn < Error < Fatal`; `Unknown` only ever arises
/// from parsing an unrecognized wire-format level and is never produced by
/// [`crate::logger::Logger`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Unknown,
}

impl Level {
    /// Whether this level triggers the synchronous remote-backup dispatch
    /// in [`crate::logger::Logger`].
    pub fn triggers_remote_backup(self) -> bool {
        matches!(self, Level::Error | Level::Fatal)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Level {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "DEBUG" => Level::Debug,
            "INFO" => Level::Info,
            "WARN" => Level::Warn,
            "ERROR" => Level::Error,
            "FATAL" => Level::Fatal,
            _ => Level::Unknown,
        })
    }
}

/// One log record, before it's serialized to the wire bytes pushed into an
/// [`crate::worker::AsyncWorker`].
///
/// Produced by [`crate::logger::Logger::log`] and consumed immediately by
/// [`LogRecord::format`]; never stored long-term.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub file: String,
    pub line: u32,
    pub timestamp_secs: u64,
    pub message: String,
    pub logger_name: String,
    pub thread_id: std::thread::ThreadId,
}

impl LogRecord {
    pub fn new(
        level: Level,
        file: impl Into<String>,
        line: u32,
        message: impl Into<String>,
        logger_name: impl Into<String>,
    ) -> Self {
        Self {
            level,
            file: file.into(),
            line,
            timestamp_secs: now_secs(),
            message: message.into(),
            logger_name: logger_name.into(),
            thread_id: std::thread::current().id(),
        }
    }

    /// Serializes this record to its wire form:
    /// `[HH:MM:SS][<thread-id>][<LEVEL>][<logger-name>][<file>:<line>]\t<message>\n`
    pub fn format(&self) -> String {
        let (h, m, s) = local_hms(self.timestamp_secs);
        format!(
            "[{h:02}:{m:02}:{s:02}][{tid:?}][{level}][{name}][{file}:{line}]\t{msg}\n",
            tid = self.thread_id,
            level = self.level,
            name = self.logger_name,
            file = self.file,
            line = self.line,
            msg = self.message,
        )
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Converts seconds-since-epoch into hour/minute/second-of-day.
///
/// No timezone database dependency: treats the process as running in UTC,
/// good enough for the `HH:MM:SS` shape this produces, which carries no
/// timezone offset of its own.
fn local_hms(secs_since_epoch: u64) -> (u32, u32, u32) {
    let secs_of_day = (secs_since_epoch % 86_400) as u32;
    let h = secs_of_day / 3600;
    let m = (secs_of_day % 3600) / 60;
    let s = secs_of_day % 60;
    (h, m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn level_display_roundtrip() {
        for lvl in [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Fatal] {
            let s = lvl.to_string();
            assert_eq!(s.parse::<Level>().unwrap(), lvl);
        }
    }

    #[test]
    fn unknown_level_from_garbage() {
        assert_eq!("WIZARD".parse::<Level>().unwrap(), Level::Unknown);
    }

    #[test]
    fn error_and_fatal_trigger_remote_backup() {
        assert!(Level::Error.triggers_remote_backup());
        assert!(Level::Fatal.triggers_remote_backup());
        assert!(!Level::Warn.triggers_remote_backup());
    }

    #[test]
    fn format_matches_wire_shape() {
        let record = LogRecord::new(Level::Info, "a.cpp", 10, "hello 7", "default");
        let formatted = record.format();
        assert!(formatted.ends_with("hello 7\n"));
        assert!(formatted.contains("[INFO][default][a.cpp:10]\thello 7"));
        // HH:MM:SS shape: "[HH:MM:SS][" at the very start.
        let bracket_end = formatted.find("][").unwrap();
        let hms = &formatted[1..bracket_end];
        assert_eq!(hms.len(), 8);
        assert_eq!(hms.as_bytes()[2], b':');
        assert_eq!(hms.as_bytes()[5], b':');
    }
}
