use std::io::Write;

use crate::error::SinkError;

/// Writes bytes to the process's standard output. No flush policy: relies
/// on the host's line buffering.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }

    pub(super) fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        std::io::stdout().write_all(bytes)?;
        Ok(())
    }
}
