//! Error taxonomy. None of these propagate out of the hot logging path —
//! they're reported to stderr at the boundary and the caller's view of
//! `push`/`log` stays infallible.

use std::fmt;

/// Config file missing or malformed. Not fatal: the caller falls back to
/// [`crate::config::Config::default`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config read error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Open/write/flush/sync failure in a sink. The offending record is
/// considered flushed regardless; the sink continues operating.
#[derive(Debug)]
pub struct SinkError(pub std::io::Error);

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink I/O error: {}", self.0)
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError(e)
    }
}

/// Socket creation, connect (after retries), or write failure while
/// shipping an ERROR/FATAL record to the remote backup address.
#[derive(Debug)]
pub enum RemoteSendError {
    Io(std::io::Error),
    RetriesExhausted { attempts: u32 },
}

impl fmt::Display for RemoteSendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteSendError::Io(e) => write!(f, "remote backup I/O error: {e}"),
            RemoteSendError::RetriesExhausted { attempts } => {
                write!(f, "remote backup connect failed after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for RemoteSendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RemoteSendError::Io(e) => Some(e),
            RemoteSendError::RetriesExhausted { .. } => None,
        }
    }
}

impl From<std::io::Error> for RemoteSendError {
    fn from(e: std::io::Error) -> Self {
        RemoteSendError::Io(e)
    }
}

/// Returned by [`crate::pool::WorkerPool::submit`] once the pool has been
/// shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolClosedError;

impl fmt::Display for PoolClosedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("worker pool is closed")
    }
}

impl std::error::Error for PoolClosedError {}
