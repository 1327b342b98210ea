use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Listen for clipboard notifications, fall back to polling if that fails
    Auto,
    /// Listen for clipboard notifications only
    Event,
    /// Always poll
    Poll,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Mode> {
        match s {
            "auto" => Some(Mode::Auto),
            "event" => Some(Mode::Event),
            "poll" => Some(Mode::Poll),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<LogLevel> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "winpathconv", version, about = "Watch the clipboard and turn Windows backslash paths into forward-slash paths", long_about = None)]
pub struct Cli {
    /// Generate an example KDL config (winpathconv.config.kdl) in the current directory and exit
    #[arg(short = 'G', long)]
    pub generate_config: bool,

    /// Path to the KDL config file (defaults to ./winpathconv.config.kdl)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Convert TEXT the same way clipboard content would be converted, print it and exit
    #[arg(long, value_name = "TEXT")]
    pub convert: Option<String>,

    /// How to notice clipboard changes
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Shortcut for --mode poll
    #[arg(long, conflicts_with = "mode")]
    pub poll: bool,

    /// Polling interval in milliseconds
    #[arg(short = 'i', long, value_name = "MS", value_parser = clap::value_parser!(u64).range(10..))]
    pub poll_interval: Option<u64>,

    /// Watch the clipboard but never rewrite it
    #[arg(long)]
    pub no_auto_convert: bool,

    /// Do not log each conversion at info level
    #[arg(short, long)]
    pub quiet: bool,

    /// Exclude glob (repeatable); replaces the configured list. `*` matches anything
    #[arg(short = 'x', long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Also append log lines to FILE
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Shortcut for --log-level debug
    #[arg(short = 'd', long)]
    pub debug: bool,
}
