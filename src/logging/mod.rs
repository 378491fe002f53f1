//! A minimal logging sink: formats `[<timestamp>][<LEVEL>] <message>` lines
//! and writes them to stdout and, optionally, an appended log file. Log
//! rotation and richer presentation are explicitly out of scope — this is
//! the sink the rest of the crate logs through via the `log` facade.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use log::{Log, Metadata, Record, SetLoggerError};

pub trait Sink: Send + Sync {
    fn write_line(&self, line: &str);
}

pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl Sink for FileSink {
    fn write_line(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

struct Logger {
    sinks: Vec<Box<dyn Sink>>,
}

impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = format!(
            "[{}][{}] {}",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
            level_token(record.level()),
            record.args()
        );
        for sink in &self.sinks {
            sink.write_line(&line);
        }
    }

    fn flush(&self) {}
}

/// `log::Level`'s own `Display` prints `WARN`; the wire-level log format
/// calls it `WARNING` (matching `examples/original_source/server.cpp`'s
/// literal `"[WARNING]"` strings).
fn level_token(level: log::Level) -> &'static str {
    match level {
        log::Level::Warn => "WARNING",
        log::Level::Error => "ERROR",
        log::Level::Info => "INFO",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

/// Installs the process-wide logger. `file_path`, when given, is opened in
/// append mode (no rotation) and every line is written there in addition to
/// stdout.
pub fn init(file_path: Option<&Path>) -> Result<(), SetLoggerError> {
    let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(StdoutSink)];

    if let Some(path) = file_path {
        match FileSink::open(path) {
            Ok(sink) => sinks.push(Box::new(sink)),
            Err(err) => eprintln!("warning: could not open log file {}: {}", path.display(), err),
        }
    }

    let logger = Box::new(Logger { sinks });
    log::set_boxed_logger(logger)?;
    log::set_max_level(log::LevelFilter::Info);
    Ok(())
}
