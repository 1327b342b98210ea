use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

use crate::error::NotifierError;

/// Source of "the clipboard may have changed" wake-ups.
///
/// Spurious wake-ups are fine; the change detector filters them out.
pub trait Notifier {
    fn mode(&self) -> &'static str;

    /// Wait for the next wake-up. Returns `false` once the source has stopped for good.
    fn wait(&mut self) -> impl Future<Output = bool> + Send;
}

/// Wakes on a fixed interval.
pub struct PollNotifier {
    interval: Interval,
}

impl PollNotifier {
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        PollNotifier { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl Notifier for PollNotifier {
    fn mode(&self) -> &'static str {
        "poll"
    }

    async fn wait(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Wakes on clipboard update notifications delivered to a hidden listener window.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub struct EventNotifier {
    rx: mpsc::Receiver<()>,
    #[cfg(target_os = "windows")]
    shutdown: Option<clipboard_win::monitor::Shutdown>,
}

impl EventNotifier {
    /// Start the listener thread. Fails when the platform refuses to register the listener.
    #[cfg(target_os = "windows")]
    pub fn start() -> Result<Self, NotifierError> {
        use clipboard_win::monitor::Monitor;
        use std::sync::mpsc as std_mpsc;
        use tokio::sync::mpsc::error::TrySendError;

        let (tx, rx) = mpsc::channel(1);
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);

        std::thread::Builder::new()
            .name("clipboard-listener".to_string())
            .spawn(move || {
                let mut monitor = match Monitor::new() {
                    Ok(m) => m,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(monitor.shutdown_channel()));
                loop {
                    match monitor.recv() {
                        // a pending wake-up already covers this one
                        Ok(true) => match tx.try_send(()) {
                            Ok(()) | Err(TrySendError::Full(())) => {}
                            Err(TrySendError::Closed(())) => break,
                        },
                        Ok(false) => break,
                        Err(e) => {
                            log::warn!("Clipboard listener failed: {}", e);
                            break;
                        }
                    }
                }
                log::debug!("Clipboard listener thread exiting");
            })
            .map_err(|e| NotifierError::Init(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(shutdown)) => Ok(EventNotifier {
                rx,
                shutdown: Some(shutdown),
            }),
            Ok(Err(e)) => Err(NotifierError::Init(e)),
            Err(_) => Err(NotifierError::Init("listener thread exited early".to_string())),
        }
    }

    #[cfg(not(target_os = "windows"))]
    pub fn start() -> Result<Self, NotifierError> {
        Err(NotifierError::Unsupported)
    }
}

impl Notifier for EventNotifier {
    fn mode(&self) -> &'static str {
        "event"
    }

    async fn wait(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

#[cfg(target_os = "windows")]
impl Drop for EventNotifier {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.signal();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn poll_notifier_wakes_repeatedly() {
        let mut n = PollNotifier::new(Duration::from_millis(10));
        assert_eq!(n.mode(), "poll");
        assert_eq!(n.period(), Duration::from_millis(10));
        let start = Instant::now();
        for _ in 0..3 {
            assert!(n.wait().await);
        }
        // first tick is immediate, the next two wait a period each
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn event_notifier_is_unsupported_off_windows() {
        assert!(matches!(EventNotifier::start(), Err(NotifierError::Unsupported)));
    }
}
