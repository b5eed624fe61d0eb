/// Write-only access to a clipboard.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> bool;
}

/// The host clipboard. Off Windows the handle is kept alive, since X11 and
/// Wayland drop the contents together with their owner.
#[derive(Default)]
pub struct SystemClipboard {
    #[cfg(not(windows))]
    handle: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> bool {
        #[cfg(windows)]
        {
            clipboard_win::set_clipboard_string(text).is_ok()
        }
        #[cfg(not(windows))]
        {
            if self.handle.is_none() {
                match arboard::Clipboard::new() {
                    Ok(c) => self.handle = Some(c),
                    Err(e) => {
                        tracing::warn!("clipboard unavailable: {}", e);
                        return false;
                    }
                }
            }
            let Some(handle) = self.handle.as_mut() else { return false };
            match handle.set_text(text) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("clipboard write failed: {}", e);
                    false
                }
            }
        }
    }
}
