//! Text injection through the clipboard and a synthetic paste keystroke.
//!
//! The protocol for one call:
//! 1. snapshot the clipboard,
//! 2. stage the text on it,
//! 3. send the paste chord to whatever has input focus,
//! 4. wait for the target to consume it,
//! 5. put the snapshot back.
//!
//! Step 5 runs through [`ClipboardGuard::restore`] on the normal path, and a
//! failed restore fails the call. The guard's `Drop` covers early returns and
//! panics. Clipboard content that cannot be put back (a file list, say) is
//! never overwritten: the call is refused before anything is staged.
//!
//! The OS primitives sit behind [`Clipboard`] and [`PasteTrigger`]. With the
//! `system-input` feature, [`SystemClipboard`] (arboard) and [`EnigoPaste`]
//! (enigo) drive the real desktop; without it they return a descriptive error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use quill_core::config::InjectConfig;
use quill_core::error::CycleError;
use thiserror::Error;

/// Wait between staging text and sending the paste chord.
pub const DEFAULT_STAGE_SETTLE: Duration = Duration::from_millis(20);
/// Wait between the paste chord and restoring the clipboard. Too short and
/// the target pastes the restored content; too long and the swap is visible.
pub const DEFAULT_PASTE_SETTLE: Duration = Duration::from_millis(100);
/// How long the paste chord is held down.
pub const DEFAULT_KEY_HOLD: Duration = Duration::from_millis(50);

/// Errors from a single injection.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Clipboard holds {0} that cannot be restored; leaving it untouched")]
    Unpreservable(String),

    #[error("Paste keystroke failed: {0}")]
    Paste(String),

    #[error("Injection task failed: {0}")]
    Task(String),
}

impl From<InjectError> for CycleError {
    fn from(err: InjectError) -> Self {
        CycleError::Inject(err.to_string())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

// =============================================================================
// Primitives
// =============================================================================

/// RGBA8 image as held on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContent {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// What the clipboard held before an injection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClipboardContent {
    #[default]
    Empty,
    Text(String),
    Image(ImageContent),
    /// Present but not readable back, e.g. a file list. Carries a short
    /// description for the error message.
    Unsupported(String),
}

impl ClipboardContent {
    pub fn kind(&self) -> &'static str {
        match self {
            ClipboardContent::Empty => "empty",
            ClipboardContent::Text(_) => "text",
            ClipboardContent::Image(_) => "image",
            ClipboardContent::Unsupported(_) => "unsupported",
        }
    }
}

/// Access to the system clipboard.
pub trait Clipboard: Send + Sync {
    fn read(&self) -> Result<ClipboardContent, InjectError>;
    fn write_text(&self, text: &str) -> Result<(), InjectError>;
    fn write_image(&self, image: &ImageContent) -> Result<(), InjectError>;
    fn clear(&self) -> Result<(), InjectError>;
}

/// Sends the platform paste chord to the focused element.
pub trait PasteTrigger: Send + Sync {
    fn paste(&self) -> Result<(), InjectError>;
}

/// Settle intervals for the injection protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectTimings {
    pub stage_settle: Duration,
    pub paste_settle: Duration,
    pub key_hold: Duration,
}

impl Default for InjectTimings {
    fn default() -> Self {
        Self {
            stage_settle: DEFAULT_STAGE_SETTLE,
            paste_settle: DEFAULT_PASTE_SETTLE,
            key_hold: DEFAULT_KEY_HOLD,
        }
    }
}

impl From<&InjectConfig> for InjectTimings {
    fn from(config: &InjectConfig) -> Self {
        Self {
            stage_settle: Duration::from_millis(config.stage_settle_ms),
            paste_settle: Duration::from_millis(config.paste_settle_ms),
            key_hold: Duration::from_millis(config.key_hold_ms),
        }
    }
}

impl InjectTimings {
    /// No waits at all. For tests against in-memory primitives.
    pub fn immediate() -> Self {
        Self {
            stage_settle: Duration::ZERO,
            paste_settle: Duration::ZERO,
            key_hold: Duration::ZERO,
        }
    }
}

// =============================================================================
// Guard
// =============================================================================

/// Holds the pre-injection clipboard content until it is put back.
///
/// An empty snapshot is put back by clearing, so staged text never lingers.
/// Call [`restore`](Self::restore) to learn whether that worked; dropping the
/// guard without it restores too, but can only log a failure.
pub struct ClipboardGuard<'a> {
    clipboard: &'a dyn Clipboard,
    snapshot: Option<ClipboardContent>,
}

impl<'a> ClipboardGuard<'a> {
    /// Snapshot the clipboard. Nothing has been modified if this fails.
    /// Content that could not be put back later fails with
    /// [`InjectError::Unpreservable`].
    pub fn acquire(clipboard: &'a dyn Clipboard) -> Result<Self, InjectError> {
        match clipboard.read()? {
            ClipboardContent::Unsupported(what) => Err(InjectError::Unpreservable(what)),
            snapshot => Ok(Self {
                clipboard,
                snapshot: Some(snapshot),
            }),
        }
    }

    pub fn snapshot(&self) -> Option<&ClipboardContent> {
        self.snapshot.as_ref()
    }

    /// Put the snapshot back now.
    pub fn restore(mut self) -> Result<(), InjectError> {
        self.put_back()
    }

    fn put_back(&mut self) -> Result<(), InjectError> {
        let restored = match self.snapshot.take() {
            None => return Ok(()),
            Some(ClipboardContent::Empty) => self.clipboard.clear(),
            Some(ClipboardContent::Text(text)) => self.clipboard.write_text(&text),
            Some(ClipboardContent::Image(image)) => self.clipboard.write_image(&image),
            Some(ClipboardContent::Unsupported(what)) => Err(InjectError::Unpreservable(what)),
        };
        match &restored {
            Ok(()) => tracing::debug!("Clipboard restored"),
            Err(e) => tracing::error!(error = %e, "Failed to restore clipboard"),
        }
        restored.map_err(|e| match e {
            InjectError::Clipboard(msg) => {
                InjectError::Clipboard(format!("restore failed: {}", msg))
            }
            other => other,
        })
    }
}

impl Drop for ClipboardGuard<'_> {
    fn drop(&mut self) {
        let _ = self.put_back();
    }
}

// =============================================================================
// Injector
// =============================================================================

/// Delivers text into the focused application without disturbing the
/// user's clipboard.
pub struct ClipboardInjector {
    clipboard: Box<dyn Clipboard>,
    paste: Box<dyn PasteTrigger>,
    timings: InjectTimings,
    /// Held for a whole call; no other writer may touch the clipboard meanwhile.
    owner: Mutex<()>,
}

impl ClipboardInjector {
    pub fn new(
        clipboard: impl Clipboard + 'static,
        paste: impl PasteTrigger + 'static,
        timings: InjectTimings,
    ) -> Self {
        Self {
            clipboard: Box::new(clipboard),
            paste: Box::new(paste),
            timings,
            owner: Mutex::new(()),
        }
    }

    pub fn timings(&self) -> InjectTimings {
        self.timings
    }

    /// Paste `text` at the current input focus, blocking for the settle
    /// intervals. Empty text returns immediately without touching the
    /// clipboard.
    ///
    /// Fails if the paste fails or if the clipboard could not be restored
    /// afterwards; a paste error is reported over a restore error.
    pub fn inject(&self, text: &str) -> Result<(), InjectError> {
        if text.is_empty() {
            return Ok(());
        }

        // A panic mid-call poisons the lock but the guard already restored
        // the clipboard, so the next call may proceed.
        let _owner = lock(&self.owner);

        let guard = ClipboardGuard::acquire(self.clipboard.as_ref())?;
        tracing::debug!(
            text_len = text.len(),
            snapshot = guard.snapshot().map(ClipboardContent::kind),
            "Staging text on clipboard"
        );

        let pasted = self.stage_and_paste(text);
        let restored = guard.restore();
        pasted?;
        restored?;

        tracing::info!(chars = text.chars().count(), "Text injected");
        Ok(())
    }

    fn stage_and_paste(&self, text: &str) -> Result<(), InjectError> {
        self.clipboard.write_text(text)?;
        std::thread::sleep(self.timings.stage_settle);
        self.paste.paste()?;
        std::thread::sleep(self.timings.paste_settle);
        Ok(())
    }

    /// Run [`inject`](Self::inject) on the blocking pool.
    pub async fn deliver(self: Arc<Self>, text: String) -> Result<(), InjectError> {
        tokio::task::spawn_blocking(move || self.inject(&text))
            .await
            .map_err(|e| InjectError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for ClipboardInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardInjector")
            .field("timings", &self.timings)
            .finish()
    }
}

// =============================================================================
// System backends
// =============================================================================

/// System clipboard via arboard.
pub struct SystemClipboard {
    #[cfg(feature = "system-input")]
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    #[cfg(feature = "system-input")]
    pub fn new() -> Result<Self, InjectError> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| InjectError::Clipboard(format!("Failed to open clipboard: {}", e)))?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    #[cfg(not(feature = "system-input"))]
    pub fn new() -> Result<Self, InjectError> {
        tracing::warn!("SystemClipboard built without `system-input` feature");
        Err(InjectError::Clipboard(
            "clipboard access requires the `system-input` feature".into(),
        ))
    }
}

#[cfg(feature = "system-input")]
impl Clipboard for SystemClipboard {
    fn read(&self) -> Result<ClipboardContent, InjectError> {
        use arboard::Error as ArboardError;
        let to_err = |e: ArboardError| InjectError::Clipboard(e.to_string());
        let mut clipboard = lock(&self.inner);

        match clipboard.get_text() {
            Ok(text) => return Ok(ClipboardContent::Text(text)),
            Err(ArboardError::ContentNotAvailable) => {}
            Err(e) => return Err(to_err(e)),
        }

        match clipboard.get_image() {
            Ok(image) => {
                return Ok(ClipboardContent::Image(ImageContent {
                    width: image.width,
                    height: image.height,
                    rgba: image.bytes.into_owned(),
                }))
            }
            Err(ArboardError::ContentNotAvailable) => {}
            Err(e) => return Err(to_err(e)),
        }

        match clipboard.get().file_list() {
            Ok(files) if !files.is_empty() => Ok(ClipboardContent::Unsupported(format!(
                "a list of {} file(s)",
                files.len()
            ))),
            Ok(_) | Err(ArboardError::ContentNotAvailable | ArboardError::ClipboardNotSupported) => {
                Ok(ClipboardContent::Empty)
            }
            Err(e) => Err(to_err(e)),
        }
    }

    fn write_text(&self, text: &str) -> Result<(), InjectError> {
        lock(&self.inner)
            .set_text(text)
            .map_err(|e| InjectError::Clipboard(format!("Failed to set clipboard: {}", e)))
    }

    fn write_image(&self, image: &ImageContent) -> Result<(), InjectError> {
        lock(&self.inner)
            .set_image(arboard::ImageData {
                width: image.width,
                height: image.height,
                bytes: std::borrow::Cow::Borrowed(&image.rgba),
            })
            .map_err(|e| InjectError::Clipboard(format!("Failed to set clipboard image: {}", e)))
    }

    fn clear(&self) -> Result<(), InjectError> {
        lock(&self.inner)
            .clear()
            .map_err(|e| InjectError::Clipboard(format!("Failed to clear clipboard: {}", e)))
    }
}

#[cfg(not(feature = "system-input"))]
impl Clipboard for SystemClipboard {
    fn read(&self) -> Result<ClipboardContent, InjectError> {
        Err(InjectError::Clipboard("clipboard unavailable".into()))
    }

    fn write_text(&self, _text: &str) -> Result<(), InjectError> {
        Err(InjectError::Clipboard("clipboard unavailable".into()))
    }

    fn write_image(&self, _image: &ImageContent) -> Result<(), InjectError> {
        Err(InjectError::Clipboard("clipboard unavailable".into()))
    }

    fn clear(&self) -> Result<(), InjectError> {
        Err(InjectError::Clipboard("clipboard unavailable".into()))
    }
}

/// Paste chord (Cmd+V on macOS, Ctrl+V elsewhere) via enigo.
#[derive(Debug, Clone)]
pub struct EnigoPaste {
    key_hold: Duration,
}

impl EnigoPaste {
    pub fn new(key_hold: Duration) -> Self {
        Self { key_hold }
    }
}

#[cfg(feature = "system-input")]
impl PasteTrigger for EnigoPaste {
    fn paste(&self) -> Result<(), InjectError> {
        use enigo::{Direction, Enigo, Key, Keyboard, Settings};

        #[cfg(target_os = "macos")]
        let modifier = Key::Meta;
        #[cfg(not(target_os = "macos"))]
        let modifier = Key::Control;

        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| InjectError::Paste(format!("Failed to open input device: {}", e)))?;
        let to_err = |e: enigo::InputError| InjectError::Paste(e.to_string());

        enigo.key(modifier, Direction::Press).map_err(to_err)?;
        let chord = enigo
            .key(Key::Unicode('v'), Direction::Press)
            .and_then(|()| {
                std::thread::sleep(self.key_hold);
                enigo.key(Key::Unicode('v'), Direction::Release)
            });
        // Never leave the modifier stuck down.
        let released = enigo.key(modifier, Direction::Release);
        chord.map_err(to_err)?;
        released.map_err(to_err)
    }
}

#[cfg(not(feature = "system-input"))]
impl PasteTrigger for EnigoPaste {
    fn paste(&self) -> Result<(), InjectError> {
        tracing::warn!(
            hold_ms = self.key_hold.as_millis() as u64,
            "EnigoPaste: keystroke synthesis not compiled in"
        );
        Err(InjectError::Paste(
            "paste keystroke requires the `system-input` feature".into(),
        ))
    }
}

// =============================================================================
// Mock implementations
// =============================================================================

/// In-memory clipboard. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    content: Arc<Mutex<ClipboardContent>>,
    writes: Arc<Mutex<Vec<String>>>,
    write_ops: Arc<AtomicUsize>,
    fail_reads: bool,
    reject_after_first_write: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self::with_content(ClipboardContent::Text(text.to_string()))
    }

    pub fn with_image(image: ImageContent) -> Self {
        Self::with_content(ClipboardContent::Image(image))
    }

    /// Content that cannot be read back, such as copied files.
    pub fn with_unsupported(what: &str) -> Self {
        Self::with_content(ClipboardContent::Unsupported(what.to_string()))
    }

    fn with_content(content: ClipboardContent) -> Self {
        let clipboard = Self::new();
        *lock(&clipboard.content) = content;
        clipboard
    }

    /// Make every `read` fail, as if the clipboard were locked.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Accept the first write and reject every write or clear after it, so
    /// staging works and restoring does not.
    pub fn rejecting_restores(mut self) -> Self {
        self.reject_after_first_write = true;
        self
    }

    /// Current text, if the clipboard holds text.
    pub fn contents(&self) -> Option<String> {
        match &*lock(&self.content) {
            ClipboardContent::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    pub fn content(&self) -> ClipboardContent {
        lock(&self.content).clone()
    }

    /// Every text value written, in order, including restores.
    pub fn writes(&self) -> Vec<String> {
        lock(&self.writes).clone()
    }

    fn admit_write(&self) -> Result<(), InjectError> {
        let previous = self.write_ops.fetch_add(1, Ordering::SeqCst);
        if self.reject_after_first_write && previous > 0 {
            return Err(InjectError::Clipboard("mock clipboard rejected write".into()));
        }
        Ok(())
    }
}

impl Clipboard for MemoryClipboard {
    fn read(&self) -> Result<ClipboardContent, InjectError> {
        if self.fail_reads {
            return Err(InjectError::Clipboard("mock clipboard locked".into()));
        }
        Ok(self.content())
    }

    fn write_text(&self, text: &str) -> Result<(), InjectError> {
        self.admit_write()?;
        lock(&self.writes).push(text.to_string());
        *lock(&self.content) = ClipboardContent::Text(text.to_string());
        Ok(())
    }

    fn write_image(&self, image: &ImageContent) -> Result<(), InjectError> {
        self.admit_write()?;
        *lock(&self.content) = ClipboardContent::Image(image.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), InjectError> {
        self.admit_write()?;
        *lock(&self.content) = ClipboardContent::Empty;
        Ok(())
    }
}

/// Paste trigger that records what the observed clipboard held at the
/// moment of each paste. Clones share the record.
#[derive(Debug, Clone)]
pub struct RecordingPaste {
    clipboard: MemoryClipboard,
    pasted: Arc<Mutex<Vec<Option<String>>>>,
    fail: bool,
}

impl RecordingPaste {
    pub fn observing(clipboard: MemoryClipboard) -> Self {
        Self {
            clipboard,
            pasted: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Make every paste fail after recording it.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Clipboard text seen at each paste, in order.
    pub fn pasted(&self) -> Vec<String> {
        lock(&self.pasted).iter().flatten().cloned().collect()
    }

    pub fn count(&self) -> usize {
        lock(&self.pasted).len()
    }
}

impl PasteTrigger for RecordingPaste {
    fn paste(&self) -> Result<(), InjectError> {
        lock(&self.pasted).push(self.clipboard.contents());
        if self.fail {
            return Err(InjectError::Paste("mock paste rejected".into()));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn injector(clipboard: &MemoryClipboard, paste: &RecordingPaste) -> ClipboardInjector {
        ClipboardInjector::new(clipboard.clone(), paste.clone(), InjectTimings::immediate())
    }

    #[test]
    fn test_inject_pastes_and_restores() {
        let clipboard = MemoryClipboard::with_text("user data");
        let paste = RecordingPaste::observing(clipboard.clone());

        injector(&clipboard, &paste).inject("hello world").unwrap();

        assert_eq!(paste.pasted(), vec!["hello world"]);
        assert_eq!(clipboard.contents().as_deref(), Some("user data"));
    }

    #[test]
    fn test_inject_clears_when_clipboard_was_empty() {
        let clipboard = MemoryClipboard::new();
        let paste = RecordingPaste::observing(clipboard.clone());

        injector(&clipboard, &paste).inject("hi").unwrap();

        assert_eq!(paste.pasted(), vec!["hi"]);
        assert_eq!(clipboard.contents(), None);
    }

    #[test]
    fn test_inject_empty_text_is_noop() {
        let clipboard = MemoryClipboard::with_text("keep");
        let paste = RecordingPaste::observing(clipboard.clone());

        injector(&clipboard, &paste).inject("").unwrap();

        assert_eq!(paste.count(), 0);
        assert!(clipboard.writes().is_empty());
        assert_eq!(clipboard.contents().as_deref(), Some("keep"));
    }

    #[test]
    fn test_inject_restores_when_paste_fails() {
        let clipboard = MemoryClipboard::with_text("precious");
        let paste = RecordingPaste::observing(clipboard.clone()).failing();

        let result = injector(&clipboard, &paste).inject("dictated");

        assert!(matches!(result, Err(InjectError::Paste(_))));
        assert_eq!(clipboard.contents().as_deref(), Some("precious"));
        assert_eq!(clipboard.writes(), vec!["dictated", "precious"]);
    }

    #[test]
    fn test_inject_read_failure_never_writes() {
        let clipboard = MemoryClipboard::with_text("x").failing_reads();
        let paste = RecordingPaste::observing(clipboard.clone());

        let result = injector(&clipboard, &paste).inject("text");

        assert!(matches!(result, Err(InjectError::Clipboard(_))));
        assert!(clipboard.writes().is_empty());
        assert_eq!(paste.count(), 0);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let clipboard = MemoryClipboard::with_text("before");
        let inner = clipboard.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = ClipboardGuard::acquire(&inner).unwrap();
            inner.write_text("staged").unwrap();
            panic!("injection blew up");
        });
        assert!(result.is_err());
        assert_eq!(clipboard.contents().as_deref(), Some("before"));
    }

    #[test]
    fn test_inject_fails_when_restore_fails() {
        let clipboard = MemoryClipboard::with_text("precious").rejecting_restores();
        let paste = RecordingPaste::observing(clipboard.clone());

        let result = injector(&clipboard, &paste).inject("dictated");

        assert!(matches!(result, Err(InjectError::Clipboard(_))));
        assert_eq!(paste.pasted(), vec!["dictated"]);
        assert_eq!(clipboard.contents().as_deref(), Some("dictated"));
    }

    #[test]
    fn test_paste_error_reported_over_restore_error() {
        let clipboard = MemoryClipboard::new().rejecting_restores();
        let paste = RecordingPaste::observing(clipboard.clone()).failing();

        let result = injector(&clipboard, &paste).inject("dictated");

        assert!(matches!(result, Err(InjectError::Paste(_))));
    }

    #[test]
    fn test_inject_restores_image() {
        let image = ImageContent {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 0, 255, 255],
        };
        let clipboard = MemoryClipboard::with_image(image.clone());
        let paste = RecordingPaste::observing(clipboard.clone());

        injector(&clipboard, &paste).inject("caption").unwrap();

        assert_eq!(paste.pasted(), vec!["caption"]);
        assert_eq!(clipboard.content(), ClipboardContent::Image(image));
    }

    #[test]
    fn test_inject_refuses_unpreservable_content() {
        let clipboard = MemoryClipboard::with_unsupported("a list of 2 file(s)");
        let paste = RecordingPaste::observing(clipboard.clone());

        let result = injector(&clipboard, &paste).inject("text");

        assert!(matches!(result, Err(InjectError::Unpreservable(_))));
        assert!(clipboard.writes().is_empty());
        assert_eq!(paste.count(), 0);
        assert_eq!(
            clipboard.content(),
            ClipboardContent::Unsupported("a list of 2 file(s)".into())
        );
    }

    #[test]
    fn test_guard_restores_once() {
        let clipboard = MemoryClipboard::with_text("a");
        let guard = ClipboardGuard::acquire(&clipboard).unwrap();
        assert_eq!(guard.snapshot(), Some(&ClipboardContent::Text("a".into())));
        clipboard.write_text("b").unwrap();

        guard.restore().unwrap();

        assert_eq!(clipboard.writes(), vec!["b", "a"]);
        assert_eq!(clipboard.contents().as_deref(), Some("a"));
    }

    #[test]
    fn test_timings_from_config() {
        let timings = InjectTimings::from(&InjectConfig::default());
        assert_eq!(timings, InjectTimings::default());
        assert_eq!(timings.paste_settle, Duration::from_millis(100));
    }

    #[test]
    fn test_inject_error_into_cycle_error() {
        let err: CycleError = InjectError::Paste("denied".into()).into();
        assert_eq!(err.kind(), "inject_error");
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_serialize() {
        let clipboard = MemoryClipboard::with_text("orig");
        let paste = RecordingPaste::observing(clipboard.clone());
        let injector = Arc::new(ClipboardInjector::new(
            clipboard.clone(),
            paste.clone(),
            InjectTimings {
                stage_settle: Duration::from_millis(5),
                paste_settle: Duration::from_millis(5),
                key_hold: Duration::ZERO,
            },
        ));

        let a = tokio::spawn(injector.clone().deliver("first".into()));
        let b = tokio::spawn(injector.clone().deliver("second".into()));
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let mut pasted = paste.pasted();
        pasted.sort();
        assert_eq!(pasted, vec!["first", "second"]);
        assert_eq!(clipboard.contents().as_deref(), Some("orig"));
    }

    #[cfg(not(feature = "system-input"))]
    #[test]
    fn test_system_backends_unavailable_without_feature() {
        assert!(SystemClipboard::new().is_err());
        assert!(EnigoPaste::new(DEFAULT_KEY_HOLD).paste().is_err());
    }
}
