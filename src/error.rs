use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// Another process holds the clipboard open.
    #[error("clipboard is busy: {0}")]
    Busy(String),

    #[error("clipboard holds no text")]
    NoText,

    #[error("failed to write clipboard: {0}")]
    Write(String),

    #[error("clipboard access is only supported on Windows")]
    Unsupported,
}

impl ClipboardError {
    /// Whether retrying after a short delay may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClipboardError::Busy(_))
    }
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("clipboard change notifications are not available on this platform")]
    Unsupported,

    #[error("failed to start clipboard listener: {0}")]
    Init(String),
}
