//! Shared helpers for unit tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clipboard::ClipboardIo;
use crate::error::ClipboardError;

#[derive(Debug, Default)]
struct FakeState {
    text: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    read_delay: Duration,
    reads: usize,
    writes: Vec<String>,
}

/// In-memory clipboard. Clones share the same contents so a test can keep a handle.
#[derive(Debug, Clone, Default)]
pub struct FakeClipboard {
    state: Arc<Mutex<FakeState>>,
}

impl FakeClipboard {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let clip = Self::default();
        clip.put(text);
        clip
    }

    /// Simulate another application copying `text`.
    pub fn put(&self, text: &str) {
        self.state.lock().unwrap().text = Some(text.to_string());
    }

    pub fn text(&self) -> Option<String> {
        self.state.lock().unwrap().text.clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    /// Make every read block the calling thread for `delay`, like a clipboard held by another process.
    pub fn slow_reads(&self, delay: Duration) {
        self.state.lock().unwrap().read_delay = delay;
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.lock().unwrap().writes.clone()
    }
}

impl ClipboardIo for FakeClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        let delay = self.state.lock().unwrap().read_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let mut st = self.state.lock().unwrap();
        st.reads += 1;
        if st.fail_reads {
            return Err(ClipboardError::Busy("locked by another process".into()));
        }
        match &st.text {
            Some(t) if !t.is_empty() => Ok(t.clone()),
            _ => Err(ClipboardError::NoText),
        }
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut st = self.state.lock().unwrap();
        if st.fail_writes {
            return Err(ClipboardError::Write("access denied".into()));
        }
        st.text = Some(text.to_string());
        st.writes.push(text.to_string());
        Ok(())
    }
}

/// Notifier driven by the test: each message on the sender is one wake-up,
/// dropping the sender ends the stream.
pub struct ScriptedNotifier {
    rx: tokio::sync::mpsc::UnboundedReceiver<()>,
}

impl ScriptedNotifier {
    pub fn new() -> (tokio::sync::mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (tx, ScriptedNotifier { rx })
    }
}

impl crate::notifier::Notifier for ScriptedNotifier {
    fn mode(&self) -> &'static str {
        "scripted"
    }

    async fn wait(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
