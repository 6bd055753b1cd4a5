//! Logs at a fixed rate into a rolling file, demonstrating sink rotation.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use asynclog::sink::{FlushPolicy, RollingFileSink, Sink};
use asynclog::{AsyncMode, Config, LoggerBuilder};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Emit log records into a rolling file sink until count is reached")]
struct Args {
    /// Basename rotated files are derived from.
    #[arg(long, default_value = "asynclog-rolling-demo-")]
    basename: String,

    /// Rotate once the current file reaches this many bytes.
    #[arg(long, default_value_t = 4096)]
    max_size: u64,

    /// Total records to emit.
    #[arg(long, default_value_t = 200)]
    count: usize,

    /// Milliseconds to sleep between records.
    #[arg(long, default_value_t = 5)]
    interval_ms: u64,

    /// Optional JSON config file overriding buffer/threshold defaults.
    #[arg(long)]
    config: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("loading config from {path}"))?
        }
        None => Config::default(),
    };

    let basename = args.basename.clone();
    let max_size = args.max_size;
    let logger = LoggerBuilder::new()
        .name("rolling-demo")
        .mode(AsyncMode::Safe)
        .config(config)
        .add_sink(move || Sink::RollingFile(RollingFileSink::new(basename, max_size, FlushPolicy::Flush)))
        .build();

    for i in 0..args.count {
        logger.info(file!(), line!(), format!("rolling demo record {i}"));
        if args.interval_ms > 0 {
            thread::sleep(Duration::from_millis(args.interval_ms));
        }
    }

    Ok(())
}
