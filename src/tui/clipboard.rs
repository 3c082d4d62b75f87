//! System clipboard access.
//!
//! The handle is created once and kept for the whole session: on Wayland and
//! X11 the copied text only stays available while its owner is alive.

use log::{info, warn};

pub struct Clipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                warn!("Clipboard unavailable: {}", e);
                None
            }
        };
        Self { inner }
    }

    /// A clipboard that refuses every copy, for tests.
    #[cfg(test)]
    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    /// Write `text` to the clipboard. The error string is for the log only.
    pub fn copy(&mut self, text: String) -> Result<(), String> {
        let Some(cb) = self.inner.as_mut() else {
            return Err("no clipboard available".to_string());
        };
        let len = text.len();
        cb.set_text(text).map_err(|e| e.to_string())?;
        info!("Copied {} bytes to clipboard", len);
        Ok(())
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_without_clipboard_fails() {
        let mut clipboard = Clipboard::unavailable();
        assert!(clipboard.copy("text".into()).is_err());
    }
}
