use crate::clipboard::ClipboardIo;
use crate::error::ClipboardError;
use crate::fingerprint::Fingerprint;

/// Clipboard text as read during one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub text: String,
    pub fingerprint: Fingerprint,
    pub changed: bool,
}

/// Tracks the fingerprint of the last settled clipboard text.
pub struct ChangeDetector<C> {
    clipboard: C,
    last: Option<Fingerprint>,
}

impl<C: ClipboardIo> ChangeDetector<C> {
    pub fn new(clipboard: C) -> Self {
        ChangeDetector { clipboard, last: None }
    }

    /// Read the clipboard and compare against the last settled fingerprint.
    /// Does not settle anything; the caller does once it has decided.
    pub fn check_and_fetch(&mut self) -> Result<Observation, ClipboardError> {
        let text = self.clipboard.get_text()?;
        let fingerprint = Fingerprint::of(&text);
        let changed = self.last != Some(fingerprint);
        Ok(Observation { text, fingerprint, changed })
    }

    pub fn settle(&mut self, fingerprint: Fingerprint) {
        self.last = Some(fingerprint);
    }

    /// Put `text` on the clipboard and settle its fingerprint so the echo is ignored.
    /// On failure nothing is settled.
    pub fn write_back(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard.set_text(text)?;
        self.settle(Fingerprint::of(text));
        Ok(())
    }

    #[cfg(test)]
    pub fn last_fingerprint(&self) -> Option<Fingerprint> {
        self.last
    }

    #[cfg(test)]
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }
}
