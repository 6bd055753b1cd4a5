//! End-to-end scenarios exercising a [`Logger`] through its public surface,
//! crossing the producer thread / consumer thread / filesystem boundary.

use std::io::Read;
use std::net::TcpListener;
use std::thread;

use asynclog::sink::{FileSink, FlushPolicy, RollingFileSink, Sink};
use asynclog::{AsyncMode, Config, LoggerBuilder};

fn read_file(path: &std::path::Path) -> String {
    let mut content = String::new();
    std::fs::File::open(path)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

/// S1: a single record reaches the file sink in the documented wire shape.
#[test]
fn single_record_matches_wire_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t1.log");
    let path_for_factory = path.clone();

    let config = Config {
        buffer_size: 4096,
        threshold: 8192,
        linear_growth: 4096,
        flush_log: 1,
        ..Config::default()
    };

    let logger = LoggerBuilder::new()
        .name("default")
        .config(config)
        .add_sink(move || Sink::File(FileSink::new(path_for_factory, FlushPolicy::Flush)))
        .build();

    logger.info("a.cpp", 10, format!("hello {}", 7));
    drop(logger);

    let content = read_file(&path);
    assert!(content.starts_with('['));
    let first_line = content.lines().next().unwrap();
    assert!(first_line.contains("][INFO][default][a.cpp:10]\thello 7"));
    let hms = &first_line[1..9];
    assert_eq!(hms.as_bytes()[2], b':');
    assert_eq!(hms.as_bytes()[5], b':');
}

/// S2: 8 threads each push 1000 records; every line survives, and each
/// thread's sequence numbers remain in order within that thread's lines.
#[test]
fn eight_threads_each_push_a_thousand_records_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t2.log");
    let path_for_factory = path.clone();

    let logger = LoggerBuilder::new()
        .name("default")
        .add_sink(move || Sink::File(FileSink::new(path_for_factory, FlushPolicy::None)))
        .build();
    let logger = std::sync::Arc::new(logger);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let logger = std::sync::Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..1000 {
                    logger.info("t2.rs", 1, format!("t={t},i={i}"));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    drop(std::sync::Arc::try_unwrap(logger).unwrap_or_else(|_| panic!("logger still shared")));

    let content = read_file(&path);
    let lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 8000);

    let mut last_i_per_thread = [-1i64; 8];
    for line in &lines {
        let tab = line.find('\t').unwrap();
        let message = &line[tab + 1..];
        let (t_part, i_part) = message.split_once(',').unwrap();
        let t: usize = t_part.trim_start_matches("t=").parse().unwrap();
        let i: i64 = i_part.trim_start_matches("i=").parse().unwrap();
        assert_eq!(i, last_i_per_thread[t] + 1, "thread {t} sequence broke");
        last_i_per_thread[t] = i;
    }
    assert!(last_i_per_thread.iter().all(|&i| i == 999));
}

/// S5: RollingFile with a small max_size rotates into many counter-suffixed
/// files, each within one record's slack of the limit.
#[test]
fn rolling_file_rotates_with_incrementing_counters() {
    let dir = tempfile::tempdir().unwrap();
    let basename = format!("{}/roll-", dir.path().display());
    let basename_for_factory = basename.clone();

    let logger = LoggerBuilder::new()
        .name("default")
        .add_sink(move || {
            Sink::RollingFile(RollingFileSink::new(
                basename_for_factory,
                1024,
                FlushPolicy::Flush,
            ))
        })
        .build();

    for i in 0..100 {
        logger.info("t5.rs", 1, format!("rolling record number {i:04} padded"));
    }
    drop(logger);

    let parent = dir.path();
    let mut rotated = 0;
    for entry in std::fs::read_dir(parent).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().into_string().unwrap();
        if name.starts_with("roll-") {
            rotated += 1;
            let size = entry.metadata().unwrap().len();
            assert!(size <= 1024 + 80, "file {name} too large: {size}");
        }
    }
    assert!(rotated >= 8, "expected at least 8 rotated files, got {rotated}");
}

/// S6: an ERROR record is both shipped to a local TCP listener standing in
/// for the remote backup server, and appended to the local file sink.
#[test]
fn error_record_reaches_both_remote_backup_and_local_sink() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let received = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let received_clone = std::sync::Arc::clone(&received);
    let accept_thread = thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).unwrap();
            received_clone.lock().unwrap().extend(buf);
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t6.log");
    let path_for_factory = path.clone();

    let config = Config {
        backup_addr: addr.ip().to_string(),
        backup_port: addr.port(),
        ..Config::default()
    };

    let logger = LoggerBuilder::new()
        .name("default")
        .config(config)
        .add_sink(move || Sink::File(FileSink::new(path_for_factory, FlushPolicy::Flush)))
        .build();

    logger.error("t6.rs", 1, format!("boom {}", "x"));
    drop(logger);

    accept_thread.join().unwrap();

    let remote_bytes = received.lock().unwrap().clone();
    let remote_text = String::from_utf8(remote_bytes).unwrap();
    assert!(remote_text.contains("[ERROR][default][t6.rs:1]\tboom x"));

    let local_text = read_file(&path);
    assert!(local_text.contains("[ERROR][default][t6.rs:1]\tboom x"));
}
