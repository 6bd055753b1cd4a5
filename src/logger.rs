//! The public entry point: formats records, triggers remote dispatch for
//! severe ones, and pushes formatted bytes into the owned [`AsyncWorker`].

use crate::config::Config;
use crate::pool;
use crate::record::{Level, LogRecord};
use crate::sink::{RemoteBackup, Sink, StdoutSink};
use crate::worker::{AsyncMode, AsyncWorker};

/// A named, independent logging pipeline: an ordered set of sinks fed by one
/// [`AsyncWorker`], plus the address to ship ERROR/FATAL records to.
///
/// Two loggers never share a name: the [`crate::registry::LoggerRegistry`]
/// that owns them enforces that.
pub struct Logger {
    name: String,
    worker: AsyncWorker,
    remote: RemoteBackup,
    sink_count: usize,
}

impl Logger {
    fn log_with_message(&self, level: Level, file: &str, line: u32, message: String) {
        let record = LogRecord::new(level, file, line, message, self.name.clone());
        let bytes = record.format().into_bytes();

        if level.triggers_remote_backup() {
            let remote = self.remote.clone();
            let remote_bytes = bytes.clone();
            match pool::global().submit(move || remote.send(&remote_bytes)) {
                Ok(future) => {
                    // Errors are already reported to stderr inside
                    // RemoteBackup::send; the result is only used to decide
                    // whether anything further needs doing here (nothing
                    // does).
                    let _ = future.wait();
                }
                Err(_closed) => {
                    eprintln!(
                        "asynclog: worker pool closed, dropping remote backup for {} record",
                        level
                    );
                }
            }
        }

        self.worker.push(&bytes);
    }

    pub fn debug(&self, file: &str, line: u32, message: impl Into<String>) {
        self.log_with_message(Level::Debug, file, line, message.into());
    }

    pub fn info(&self, file: &str, line: u32, message: impl Into<String>) {
        self.log_with_message(Level::Info, file, line, message.into());
    }

    pub fn warn(&self, file: &str, line: u32, message: impl Into<String>) {
        self.log_with_message(Level::Warn, file, line, message.into());
    }

    pub fn error(&self, file: &str, line: u32, message: impl Into<String>) {
        self.log_with_message(Level::Error, file, line, message.into());
    }

    pub fn fatal(&self, file: &str, line: u32, message: impl Into<String>) {
        self.log_with_message(Level::Fatal, file, line, message.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sinks this logger's consumer thread writes each flushed
    /// range to, in registration order. Exposed for tests that check
    /// [`LoggerBuilder::build`]'s implicit-stdout-sink fallback.
    pub fn sink_count(&self) -> usize {
        self.sink_count
    }
}

type SinkFactory = Box<dyn FnOnce() -> Sink + Send>;

/// Collects construction parameters for a [`Logger`]: name, sink factories,
/// async mode. `build()` installs a single [`StdoutSink`] if none were
/// added.
pub struct LoggerBuilder {
    name: String,
    sink_factories: Vec<SinkFactory>,
    mode: AsyncMode,
    config: Config,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            sink_factories: Vec::new(),
            mode: AsyncMode::Safe,
            config: Config::default(),
        }
    }
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn mode(mut self, mode: AsyncMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn add_sink(mut self, factory: impl FnOnce() -> Sink + Send + 'static) -> Self {
        self.sink_factories.push(Box::new(factory));
        self
    }

    /// Asserts `name` is non-empty, then builds the [`Logger`], spawning its
    /// [`AsyncWorker`] consumer thread.
    pub fn build(mut self) -> Logger {
        assert!(!self.name.is_empty(), "logger name must not be empty");

        if self.sink_factories.is_empty() {
            self.sink_factories
                .push(Box::new(|| Sink::Stdout(StdoutSink::new())));
        }

        let mut sinks: Vec<Sink> = self
            .sink_factories
            .into_iter()
            .map(|factory| factory())
            .collect();
        let sink_count = sinks.len();

        let worker = AsyncWorker::new(
            self.config.buffer_size,
            self.config.threshold,
            self.config.linear_growth,
            self.mode,
            move |bytes| {
                for sink in sinks.iter_mut() {
                    sink.write(bytes);
                }
            },
        );

        let remote = RemoteBackup::new(self.config.backup_addr.clone(), self.config.backup_port);

        Logger {
            name: self.name,
            worker,
            remote,
            sink_count,
        }
    }
}
