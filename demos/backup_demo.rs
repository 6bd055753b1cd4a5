//! Logs a burst of INFO records followed by one ERROR record, demonstrating
//! that the ERROR record is both shipped to the remote backup address and
//! appended to the local file sink.

use asynclog::sink::{FileSink, FlushPolicy, Sink};
use asynclog::{AsyncMode, Config, LoggerBuilder};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Emit an ERROR record and report whether remote dispatch completed")]
struct Args {
    /// Path of the local file sink.
    #[arg(long, default_value = "asynclog-backup-demo.log")]
    path: String,

    /// Remote backup server address.
    #[arg(long, default_value = "127.0.0.1")]
    backup_addr: String,

    /// Remote backup server port.
    #[arg(long, default_value_t = 9000)]
    backup_port: u16,
}

fn main() {
    let args = Args::parse();

    let mut config = Config::default();
    config.backup_addr = args.backup_addr;
    config.backup_port = args.backup_port;

    let path = args.path.clone();
    let logger = LoggerBuilder::new()
        .name("backup-demo")
        .mode(AsyncMode::Safe)
        .config(config)
        .add_sink(move || Sink::File(FileSink::new(path, FlushPolicy::FlushAndSync)))
        .build();

    for i in 0..20 {
        logger.info(file!(), line!(), format!("warming up {i}"));
    }
    logger.error(file!(), line!(), format!("boom {}", "x"));
    logger.info(file!(), line!(), "trailing record after the error");
}
