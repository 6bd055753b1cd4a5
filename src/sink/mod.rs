//! Sink capability contract and variants.
//!
//! Replaces the original's base-class/derived-class hierarchy with an enum
//! rather than a trait object: a closed, known set of variants (`Stdout`,
//! `File`, `RollingFile`), each implementing `write`. `RemoteBackup` is
//! deliberately not a variant here — it's invoked indirectly through the
//! [`crate::pool::WorkerPool`], not as a Logger-attached sink.

mod file;
mod remote_backup;
mod rolling_file;
mod stdout;

pub use file::FileSink;
pub use remote_backup::RemoteBackup;
pub use rolling_file::RollingFileSink;
pub use stdout::StdoutSink;

use crate::error::SinkError;

/// Flush policy shared by [`FileSink`] and [`RollingFileSink`], keyed off
/// the `flush_log` config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Rely on OS buffering.
    None,
    /// Flush at the library level after each write.
    Flush,
    /// Flush at the library level, then fsync.
    FlushAndSync,
}

impl FlushPolicy {
    pub fn from_config_value(value: u8) -> Self {
        match value {
            1 => FlushPolicy::Flush,
            2 => FlushPolicy::FlushAndSync,
            _ => FlushPolicy::None,
        }
    }
}

/// A terminal destination for formatted log bytes.
///
/// Sinks are owned solely by their [`crate::logger::Logger`]'s
/// [`crate::worker::AsyncWorker`] consumer thread after construction, so no
/// lock is needed around `write`.
pub enum Sink {
    Stdout(StdoutSink),
    File(FileSink),
    RollingFile(RollingFileSink),
}

impl Sink {
    /// Writes `bytes` to this sink. I/O failures are reported to stderr and
    /// otherwise swallowed: the offending record is treated as flushed
    /// regardless, so the pipeline is never slowed or blocked by a failing
    /// sink.
    pub fn write(&mut self, bytes: &[u8]) {
        let result = match self {
            Sink::Stdout(s) => s.write(bytes),
            Sink::File(s) => s.write(bytes),
            Sink::RollingFile(s) => s.write(bytes),
        };
        if let Err(SinkError(e)) = result {
            eprintln!("asynclog: sink write failed: {e}");
        }
    }
}
