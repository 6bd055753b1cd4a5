use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::FlushPolicy;
use crate::error::SinkError;

/// Appends bytes to a single file opened once at construction.
///
/// Grounded in `original_source`'s `mylog::FileFlush`: opens in
/// append+binary mode, fails silently (reporting to stderr) if the open
/// fails, and applies the `flush_log` policy after each write. Closes on
/// drop after a final flush.
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
    policy: FlushPolicy,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, policy: FlushPolicy) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("asynclog: failed to create directory {parent:?}: {e}");
                }
            }
        }
        let file = match open_append(&path) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("asynclog: failed to open log file {path:?}: {e}");
                None
            }
        };
        Self { path, file, policy }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        file.write_all(bytes)?;
        apply_flush_policy(file, self.policy)?;
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

pub(super) fn apply_flush_policy(file: &mut File, policy: FlushPolicy) -> io::Result<()> {
    match policy {
        FlushPolicy::None => Ok(()),
        FlushPolicy::Flush => file.flush(),
        FlushPolicy::FlushAndSync => {
            file.flush()?;
            file.sync_data()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_appends_bytes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        {
            let mut sink = FileSink::new(&path, FlushPolicy::Flush);
            sink.write(b"first\n").unwrap();
            sink.write(b"second\n").unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn reopening_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        {
            let mut sink = FileSink::new(&path, FlushPolicy::None);
            sink.write(b"one\n").unwrap();
        }
        {
            let mut sink = FileSink::new(&path, FlushPolicy::None);
            sink.write(b"two\n").unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "one\ntwo\n");
    }

    #[test]
    fn creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/out.log");
        let mut sink = FileSink::new(&path, FlushPolicy::None);
        sink.write(b"hi\n").unwrap();
        assert!(path.exists());
    }
}
