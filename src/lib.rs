//! Asynchronous, multi-sink logging for high-throughput server processes.
//!
//! A [`logger::Logger`] formats records and hands their bytes to a
//! [`worker::AsyncWorker`], whose single consumer thread drains a
//! producer/consumer double buffer into an ordered list of [`sink::Sink`]s.
//! ERROR/FATAL records additionally take a synchronous detour through the
//! process-wide [`pool::WorkerPool`] to ship a copy to a remote backup
//! address before the producer continues. See `DESIGN.md` for how each
//! piece traces back to its source.

pub mod buffer;
pub mod config;
pub mod error;
pub mod logger;
pub mod pool;
pub mod record;
pub mod registry;
pub mod sink;
pub mod worker;

pub use config::Config;
pub use logger::{Logger, LoggerBuilder};
pub use record::{Level, LogRecord};
pub use registry::LoggerRegistry;
pub use worker::AsyncMode;
