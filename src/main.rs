mod app;
mod cli;
mod clipboard;
mod config;
mod detector;
mod error;
mod exclude;
mod fingerprint;
mod instance;
mod logging;
mod notifier;
mod rewriter;
mod shutdown;
mod text;

#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::cli::Cli;
use crate::clipboard::SystemClipboard;
use crate::config::{ConfigWatcher, DEFAULT_CONFIG_FILE, Settings, load_config};
use crate::instance::InstanceGuard;
use crate::rewriter::PathRewriter;
use crate::shutdown::{cancel_on, stop_signal};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle generating an example config and exit
    if cli.generate_config {
        let path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if path.exists() {
            println!("Exists, not overwriting: {}", path.display());
            return Ok(());
        }
        std::fs::write(&path, crate::config::EXAMPLE_KDL)
            .with_context(|| format!("Failed to write example config to {}", path.display()))?;
        println!("Wrote example config to {}", path.display());
        return Ok(());
    }

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let (cfg, cfg_error) = match load_config(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (None, Some(e)),
    };
    let settings = Settings::resolve(&cli, cfg.as_ref());

    logging::init(settings.log_level, settings.log_file.as_deref())?;
    if let Some(e) = cfg_error {
        log::warn!("{:#}; using defaults", e);
    }
    if let Some(c) = &cfg {
        c.report_warnings();
    }

    // Offline conversion: same decision as for clipboard text, printed to stdout
    if let Some(text) = &cli.convert {
        let rewriter = PathRewriter::new(&settings.exclude_patterns);
        if rewriter.should_convert(text) {
            println!("{}", rewriter.convert(text));
        } else {
            println!("{}", text);
        }
        return Ok(());
    }

    if !cfg!(target_os = "windows") {
        anyhow::bail!("Watching the clipboard is only supported on Windows. Use --convert TEXT to convert a single value.");
    }

    let _guard = match InstanceGuard::acquire(&settings.mutex_name)? {
        Some(guard) => guard,
        None => {
            println!("winpathconv is already running.");
            return Ok(());
        }
    };

    log::info!("winpathconv started; copied Windows paths will be rewritten with forward slashes");
    log::info!("Auto convert: {}", settings.auto_convert);
    log::info!("Show notifications: {}", settings.show_notifications);
    log::info!("Log level: {:?}", settings.log_level);
    log::info!("Press Ctrl+C or Ctrl+Break to exit");

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on(stop_signal(), shutdown.clone()));

    let mut app = App::new(settings, SystemClipboard)
        .with_config_watcher(ConfigWatcher::new(config_path, cli.clone()));
    app.watch(&shutdown).await?;

    log::info!("winpathconv exited normally");
    Ok(())
}
