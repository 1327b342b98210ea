use std::thread::sleep;
use std::time::Duration;

use crate::error::ClipboardError;

/// Delays before each clipboard access attempt.
pub const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_millis(0),
    Duration::from_millis(15),
    Duration::from_millis(30),
];

/// Text access to the system clipboard.
///
/// Implementations retry transient lock contention themselves and never leave a partial write behind.
pub trait ClipboardIo {
    fn get_text(&mut self) -> Result<String, ClipboardError>;
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Run `op` up to once per entry in `delays`, sleeping first, while it fails transiently.
pub fn with_backoff<T>(
    delays: &[Duration],
    mut op: impl FnMut() -> Result<T, ClipboardError>,
) -> Result<T, ClipboardError> {
    let mut last = ClipboardError::Busy("no attempt made".to_string());
    for (attempt, delay) in delays.iter().enumerate() {
        if !delay.is_zero() {
            sleep(*delay);
        }
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() => {
                log::debug!("Clipboard attempt {} failed: {}", attempt + 1, e);
                last = e;
            }
            Err(e) => return Err(e),
        }
    }
    Err(last)
}

/// The real Windows clipboard.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardIo for SystemClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        with_backoff(&RETRY_DELAYS, read_text)
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        with_backoff(&RETRY_DELAYS, || write_text(text))
    }
}

#[cfg(target_os = "windows")]
fn read_text() -> Result<String, ClipboardError> {
    use clipboard_win::{Clipboard, formats, get, is_format_avail};

    let _clip = Clipboard::new().map_err(|e| ClipboardError::Busy(e.to_string()))?;
    if !is_format_avail(formats::CF_UNICODETEXT) {
        return Err(ClipboardError::NoText);
    }
    let text: String = get(formats::Unicode).map_err(|_| ClipboardError::NoText)?;
    if text.is_empty() {
        return Err(ClipboardError::NoText);
    }
    Ok(text)
}

#[cfg(target_os = "windows")]
fn write_text(s: &str) -> Result<(), ClipboardError> {
    use clipboard_win::{Clipboard, formats, set};

    let _clip = Clipboard::new().map_err(|e| ClipboardError::Busy(e.to_string()))?;
    // set() empties the clipboard and stores the text under the same open handle
    set(formats::Unicode, s).map_err(|e| ClipboardError::Write(e.to_string()))
}

#[cfg(not(target_os = "windows"))]
fn read_text() -> Result<String, ClipboardError> {
    Err(ClipboardError::Unsupported)
}

#[cfg(not(target_os = "windows"))]
fn write_text(_s: &str) -> Result<(), ClipboardError> {
    Err(ClipboardError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn succeeds_on_first_attempt() {
        let mut calls = 0;
        let out = with_backoff(&RETRY_DELAYS, || {
            calls += 1;
            Ok::<_, ClipboardError>("text")
        });
        assert_eq!(out, Ok("text"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn retries_busy_until_success() {
        let mut calls = 0;
        let out = with_backoff(&RETRY_DELAYS, || {
            calls += 1;
            if calls < 3 {
                Err(ClipboardError::Busy("locked".into()))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(out, Ok(3));
    }

    #[test]
    fn gives_up_after_three_attempts() {
        let mut calls = 0;
        let start = Instant::now();
        let out: Result<(), _> = with_backoff(&RETRY_DELAYS, || {
            calls += 1;
            Err(ClipboardError::Busy(format!("locked {calls}")))
        });
        assert_eq!(out, Err(ClipboardError::Busy("locked 3".into())));
        assert_eq!(calls, 3);
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn does_not_retry_missing_text() {
        let mut calls = 0;
        let out: Result<(), _> = with_backoff(&RETRY_DELAYS, || {
            calls += 1;
            Err(ClipboardError::NoText)
        });
        assert_eq!(out, Err(ClipboardError::NoText));
        assert_eq!(calls, 1);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn system_clipboard_is_unsupported_off_windows() {
        let mut clip = SystemClipboard;
        assert_eq!(clip.get_text(), Err(ClipboardError::Unsupported));
        assert_eq!(clip.set_text("x"), Err(ClipboardError::Unsupported));
    }
}
