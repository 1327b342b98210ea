use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result, anyhow};

use crate::cli::{Cli, LogLevel, Mode};
use crate::exclude::default_patterns;

pub const DEFAULT_CONFIG_FILE: &str = "winpathconv.config.kdl";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_MUTEX_NAME: &str = "PathConvertToolMutex";
const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Values read from the KDL config file. Unset entries fall back to CLI or defaults.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Config {
    pub auto_convert: Option<bool>,
    pub show_notifications: Option<bool>,
    pub poll_interval_ms: Option<u64>,
    pub exclude: Option<Vec<String>>,
    pub mutex_name: Option<String>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<String>,
    pub mode: Option<Mode>,
    /// Entries that were ignored while parsing. Logged by the caller once logging is up.
    pub warnings: Vec<String>,
}

impl Config {
    /// Log every problem found while parsing.
    pub fn report_warnings(&self) {
        for w in &self.warnings {
            log::warn!("{}", w);
        }
    }

    fn ignore(&mut self, node: &kdl::KdlNode, expected: &str) {
        self.warnings.push(format!(
            "Ignoring config entry '{}': expected {}",
            node.name().value(),
            expected
        ));
    }
}

fn get_string(node: &kdl::KdlNode) -> Option<String> {
    node.entries().first()?.value().as_string().map(|s| s.to_string())
}
fn get_bool(node: &kdl::KdlNode) -> Option<bool> {
    node.entries().first()?.value().as_bool()
}
fn get_u64(node: &kdl::KdlNode) -> Option<u64> {
    node.entries().first()?.value().as_integer().and_then(|v| u64::try_from(v).ok())
}
fn get_strings(node: &kdl::KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string().map(|s| s.to_string()))
        .collect()
}

/// Parse config text. Accepts a root `winpathconv { ... }` block or flat top-level entries.
/// `exclude` may repeat; its arguments accumulate in order.
/// Unknown entries and bad values are skipped and recorded in `Config::warnings`.
pub fn parse_config(content: &str) -> Result<Config> {
    let doc: kdl::KdlDocument = content
        .parse()
        .map_err(|e| anyhow!("invalid KDL: {}", e))?;

    let nodes: Vec<kdl::KdlNode> = match doc.get("winpathconv").and_then(|n| n.children()) {
        Some(children) => children.nodes().to_vec(),
        None => doc.nodes().to_vec(),
    };

    let mut cfg = Config::default();
    for n in &nodes {
        match n.name().value() {
            "auto_convert" => match get_bool(n) {
                Some(v) => cfg.auto_convert = Some(v),
                None => cfg.ignore(n, "#true or #false"),
            },
            "show_notifications" => match get_bool(n) {
                Some(v) => cfg.show_notifications = Some(v),
                None => cfg.ignore(n, "#true or #false"),
            },
            "poll_interval_ms" => match get_u64(n) {
                Some(v) => cfg.poll_interval_ms = Some(v),
                None => cfg.ignore(n, "a whole number of milliseconds"),
            },
            "exclude" => cfg.exclude.get_or_insert_with(Vec::new).extend(get_strings(n)),
            "mutex_name" => cfg.mutex_name = get_string(n),
            "log_level" => match get_string(n).as_deref().and_then(LogLevel::parse) {
                Some(level) => cfg.log_level = Some(level),
                None => cfg.ignore(n, "debug, info, warn or error"),
            },
            "log_file" => cfg.log_file = get_string(n),
            "mode" => match get_string(n).as_deref().and_then(Mode::parse) {
                Some(mode) => cfg.mode = Some(mode),
                None => cfg.ignore(n, "auto, event or poll"),
            },
            other => cfg
                .warnings
                .push(format!("Ignoring unknown config entry '{}'", other)),
        }
    }
    Ok(cfg)
}

/// Load the config file at `path`. A missing file is not an error.
pub fn load_config(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let cfg = parse_config(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(Some(cfg))
}

/// Effective settings: CLI over config file over built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub auto_convert: bool,
    pub show_notifications: bool,
    pub poll_interval: Duration,
    pub exclude_patterns: Vec<String>,
    pub mutex_name: String,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
    pub mode: Mode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            auto_convert: true,
            show_notifications: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            exclude_patterns: default_patterns(),
            mutex_name: DEFAULT_MUTEX_NAME.to_string(),
            log_level: LogLevel::Info,
            log_file: None,
            mode: Mode::Auto,
        }
    }
}

impl Settings {
    pub fn resolve(cli: &Cli, cfg: Option<&Config>) -> Settings {
        let mut s = Settings::default();

        if let Some(c) = cfg {
            if let Some(v) = c.auto_convert { s.auto_convert = v; }
            if let Some(v) = c.show_notifications { s.show_notifications = v; }
            if let Some(ms) = c.poll_interval_ms {
                s.poll_interval = Duration::from_millis(ms.max(MIN_POLL_INTERVAL_MS));
            }
            if let Some(v) = &c.exclude { s.exclude_patterns = v.clone(); }
            if let Some(v) = &c.mutex_name {
                if !v.is_empty() { s.mutex_name = v.clone(); }
            }
            if let Some(level) = c.log_level { s.log_level = level; }
            if let Some(v) = &c.log_file {
                if !v.is_empty() { s.log_file = Some(PathBuf::from(v)); }
            }
            if let Some(mode) = c.mode { s.mode = mode; }
        }

        if cli.no_auto_convert { s.auto_convert = false; }
        if cli.quiet { s.show_notifications = false; }
        if let Some(ms) = cli.poll_interval { s.poll_interval = Duration::from_millis(ms); }
        if !cli.exclude.is_empty() { s.exclude_patterns = cli.exclude.clone(); }
        if let Some(level) = cli.log_level { s.log_level = level; }
        if cli.debug { s.log_level = LogLevel::Debug; }
        if let Some(path) = &cli.log_file { s.log_file = Some(path.clone()); }
        if let Some(mode) = cli.mode { s.mode = mode; }
        if cli.poll { s.mode = Mode::Poll; }

        s
    }
}

/// Notices edits to the config file while the watcher runs.
pub struct ConfigWatcher {
    path: PathBuf,
    cli: Cli,
    modified: Option<SystemTime>,
    min_gap: Duration,
    last_check: Option<Instant>,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf, cli: Cli) -> Self {
        let modified = modified_time(&path);
        ConfigWatcher {
            path,
            cli,
            modified,
            min_gap: Duration::from_secs(2),
            last_check: None,
        }
    }

    #[cfg(test)]
    fn with_min_gap(mut self, gap: Duration) -> Self {
        self.min_gap = gap;
        self
    }

    /// Re-resolve settings if the file changed since the last look.
    /// Checks the file at most once per `min_gap`; an unreadable file keeps the current settings.
    pub fn poll(&mut self) -> Option<Settings> {
        let now = Instant::now();
        if let Some(last) = self.last_check {
            if now.duration_since(last) < self.min_gap {
                return None;
            }
        }
        self.last_check = Some(now);

        let modified = modified_time(&self.path);
        if modified == self.modified {
            return None;
        }
        self.modified = modified;

        match load_config(&self.path) {
            Ok(cfg) => {
                log::info!("Reloaded config from {}", self.path.display());
                if let Some(c) = &cfg {
                    c.report_warnings();
                }
                Some(Settings::resolve(&self.cli, cfg.as_ref()))
            }
            Err(e) => {
                log::warn!("Keeping current settings: {:#}", e);
                None
            }
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

// Example KDL configuration embedded here for convenience
pub const EXAMPLE_KDL: &str = r#"// winpathconv.config.kdl
// Settings may sit inside a `winpathconv { ... }` block or flat at the root.
// Command line flags override anything set here.
// Edits to exclude, auto_convert and show_notifications are picked up while running.

winpathconv {
    auto_convert #true         // rewrite clipboard paths automatically
    show_notifications #true   // log every conversion at info level

    mode "auto"                // auto | event | poll
    poll_interval_ms 100       // used when polling, minimum 10

    // Text matching any of these globs is left alone. `*` matches anything.
    // URLs and mailto:/ftp:/file: links are always left alone.
    exclude "http://*" "https://*" "mailto:*" "ftp://*" "file://*"
    //exclude "*.tmp"

    mutex_name "PathConvertToolMutex"  // only one watcher per name can run
    log_level "info"           // debug | info | warn | error
    //log_file "winpathconv.log"
}
"#;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
