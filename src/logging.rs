use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::LogLevel;

/// Writes every log line to stderr and to an appended log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn builder(level: LogLevel) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.as_filter())
        .format(|buf, record| {
            let now = chrono::Local::now();
            writeln!(
                buf,
                "[{}] [{}] {}",
                now.format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        });
    builder
}

/// Install the global logger. Call once, before anything logs.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let mut builder = builder(level);
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
    }
    builder
        .try_init()
        .context("Logger was already initialized")?;
    Ok(())
}
