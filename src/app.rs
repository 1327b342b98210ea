use anyhow::{Result, bail};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio_util::sync::CancellationToken;

use crate::cli::Mode;
use crate::clipboard::ClipboardIo;
use crate::config::{ConfigWatcher, Settings};
use crate::detector::ChangeDetector;
use crate::error::ClipboardError;
use crate::notifier::{EventNotifier, Notifier, PollNotifier};
use crate::rewriter::{PathRewriter, Verdict};
use crate::text::shorten;

/// What one check-and-convert cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Disabled,
    Unavailable(ClipboardError),
    Unchanged,
    Skipped(Verdict),
    NoOp,
    Converted { from: String, to: String },
    WriteFailed(ClipboardError),
}

/// Why a run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Shutdown,
    SourceClosed,
}

pub struct App<C> {
    settings: Settings,
    detector: ChangeDetector<C>,
    rewriter: PathRewriter,
    config_watcher: Option<ConfigWatcher>,
}

impl<C: ClipboardIo> App<C> {
    pub fn new(settings: Settings, clipboard: C) -> Self {
        let rewriter = PathRewriter::new(&settings.exclude_patterns);
        App {
            settings,
            detector: ChangeDetector::new(clipboard),
            rewriter,
            config_watcher: None,
        }
    }

    pub fn with_config_watcher(mut self, watcher: ConfigWatcher) -> Self {
        self.config_watcher = Some(watcher);
        self
    }

    /// Apply settings reloaded at runtime. Only the conversion options take effect without a restart.
    pub fn apply_settings(&mut self, new: Settings) {
        if new.exclude_patterns != self.settings.exclude_patterns {
            self.rewriter.update_exclude_patterns(&new.exclude_patterns);
            self.settings.exclude_patterns = new.exclude_patterns;
        }
        self.settings.auto_convert = new.auto_convert;
        self.settings.show_notifications = new.show_notifications;

        if new.poll_interval != self.settings.poll_interval
            || new.mode != self.settings.mode
            || new.mutex_name != self.settings.mutex_name
            || new.log_level != self.settings.log_level
            || new.log_file != self.settings.log_file
        {
            log::info!("Some changed settings take effect after a restart");
        }
    }

    /// Run one cycle: read, compare, decide, maybe write back.
    pub fn process_change(&mut self) -> Outcome {
        if !self.settings.auto_convert {
            log::debug!("Auto convert is off, ignoring clipboard change");
            return Outcome::Disabled;
        }

        let obs = match self.detector.check_and_fetch() {
            Ok(obs) => obs,
            Err(e) => {
                log::debug!("Skipping cycle: {}", e);
                return Outcome::Unavailable(e);
            }
        };
        if !obs.changed {
            log::debug!("Clipboard unchanged ({})", obs.fingerprint);
            return Outcome::Unchanged;
        }

        let verdict = self.rewriter.evaluate(&obs.text);
        if !verdict.is_eligible() {
            log::debug!("Not converting ({:?}): {}", verdict, shorten(&obs.text));
            self.detector.settle(obs.fingerprint);
            return Outcome::Skipped(verdict);
        }

        let converted = self.rewriter.convert(&obs.text);
        if converted == obs.text {
            self.detector.settle(obs.fingerprint);
            return Outcome::NoOp;
        }

        if let Err(e) = self.detector.write_back(&converted) {
            log::error!("Failed to write converted path to clipboard: {}", e);
            return Outcome::WriteFailed(e);
        }

        if self.settings.show_notifications {
            log::info!("Converted path:");
            log::info!("  from: {}", obs.text);
            log::info!("  to:   {}", converted);
        } else {
            log::debug!("Converted path: {}", shorten(&converted));
        }
        Outcome::Converted {
            from: obs.text,
            to: converted,
        }
    }

    fn reload_config(&mut self) {
        if let Some(new) = self.config_watcher.as_mut().and_then(ConfigWatcher::poll) {
            self.apply_settings(new);
        }
    }

    /// Run cycles on each wake-up until shutdown or until the notifier stops.
    /// A cycle in progress always finishes; only the wait is interrupted.
    pub async fn run<N: Notifier>(&mut self, notifier: &mut N, shutdown: &CancellationToken) -> Stop {
        loop {
            let woke = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Stop::Shutdown,
                woke = notifier.wait() => woke,
            };
            if !woke {
                return Stop::SourceClosed;
            }
            blocking(|| {
                self.reload_config();
                self.process_change();
            });
        }
    }

    /// Pick the notification strategy once and run until shutdown.
    /// `Mode::Auto` falls back to polling when the listener cannot start or dies.
    pub async fn watch(&mut self, shutdown: &CancellationToken) -> Result<()> {
        if self.settings.mode != Mode::Poll {
            match EventNotifier::start() {
                Ok(mut notifier) => {
                    log::info!("Watching clipboard in {} mode", notifier.mode());
                    match self.run(&mut notifier, shutdown).await {
                        Stop::Shutdown => return Ok(()),
                        Stop::SourceClosed if self.settings.mode == Mode::Event => {
                            bail!("Clipboard listener stopped")
                        }
                        Stop::SourceClosed => {
                            log::warn!("Clipboard listener stopped, falling back to polling")
                        }
                    }
                }
                Err(e) if self.settings.mode == Mode::Event => return Err(e.into()),
                Err(e) => log::warn!("{}; falling back to polling", e),
            }
        }

        let mut notifier = PollNotifier::new(self.settings.poll_interval);
        log::info!(
            "Watching clipboard in {} mode, every {:?}",
            notifier.mode(),
            notifier.period()
        );
        self.run(&mut notifier, shutdown).await;
        Ok(())
    }
}

/// Run `f`, which may sleep between clipboard retries, without stalling other tasks.
/// Needs a multi-thread runtime to hand the worker off; otherwise runs `f` in place.
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|h| h.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(f),
        _ => f(),
    }
}

#[cfg(test)]
impl<C: ClipboardIo> App<C> {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn detector(&self) -> &ChangeDetector<C> {
        &self.detector
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
