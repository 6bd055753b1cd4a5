use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use super::file::apply_flush_policy;
use super::FlushPolicy;
use crate::error::SinkError;

/// Writes to a sequence of files named `<basename><timestamp>-<counter>.log`,
/// opening a fresh one whenever the current file is absent or has reached
/// `max_size`.
///
/// A rolling variant is named (`RollFileFlush`) at its one call site in
/// `original_source`, but no header defining it ships in the retrieval
/// pack, so the rotation and timestamp behavior here follows spec.md
/// §4.3/§9 directly: the `hour+1`/`min+1`/`sec+1` off-by-one and the lack
/// of zero-padding are preserved as specified rather than silently
/// corrected — see `DESIGN.md` for why this divergence from a "sane"
/// timestamp is kept.
pub struct RollingFileSink {
    basename: String,
    max_size: u64,
    policy: FlushPolicy,
    counter: u64,
    current: Option<CurrentFile>,
}

struct CurrentFile {
    file: File,
    size: u64,
}

impl RollingFileSink {
    pub fn new(basename: impl Into<String>, max_size: u64, policy: FlushPolicy) -> Self {
        Self {
            basename: basename.into(),
            max_size,
            policy,
            counter: 0,
            current: None,
        }
    }

    pub(super) fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        if self.current.is_none() || self.current.as_ref().unwrap().size >= self.max_size {
            self.rotate()?;
        }
        let current = self.current.as_mut().unwrap();
        use io::Write;
        current.file.write_all(bytes)?;
        current.size += bytes.len() as u64;
        apply_flush_policy(&mut current.file, self.policy)?;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.counter += 1;
        let path = self.next_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&path)?;
        self.current = Some(CurrentFile { file, size: 0 });
        Ok(())
    }

    fn next_path(&self) -> PathBuf {
        let (year, month, day, hour, min, sec) = timestamp_parts();
        PathBuf::from(format!(
            "{}{}{}{}{}{}{}-{}.log",
            self.basename,
            year,
            month,
            day,
            hour + 1,
            min + 1,
            sec + 1,
            self.counter
        ))
    }
}

/// (year, month, day, hour, minute, second) for the current instant, UTC.
/// Deliberately unpadded and pre-increment on hour/min/sec to match the
/// behavior `next_path` reproduces.
fn timestamp_parts() -> (u64, u64, u64, u64, u64, u64) {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    civil_from_unix(secs)
}

/// Days-from-epoch civil calendar conversion (Howard Hinnant's algorithm),
/// std-only since no date/time crate is part of this crate's dependency
/// stack.
fn civil_from_unix(unix_secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let days = (unix_secs / 86_400) as i64;
    let rem = unix_secs % 86_400;
    let hour = rem / 3600;
    let min = (rem % 3600) / 60;
    let sec = rem % 60;

    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { y + 1 } else { y };

    (year as u64, month, day, hour, min, sec)
}
