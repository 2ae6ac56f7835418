//! # Terminal Key Reader
//!
//! Single-keystroke input from the controlling terminal.
//!
//! ## Mode Handling
//!
//! The cooked terminal attributes are captured once when the reader is opened.
//! Each poll then switches the terminal to raw mode, waits up to the poll
//! timeout for one byte, and switches back to the captured cooked mode whether
//! or not a byte arrived. Between polls the terminal is always cooked.
//!
//! Entering raw mode discards input typed before the poll started. A held key
//! therefore yields at most one byte per tick, and the first tick after it is
//! released sees no key.
//!
//! Dropping the reader restores the captured mode once more, so an early
//! return or a panic unwinding through the teleop loop never leaves the
//! terminal raw.

use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::{debug, warn};

use super::device::TerminalDevice;
use crate::error::{KeyboardJoyError, Result};

/// Default time to wait for a key on each poll
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Source of single keystrokes for the teleop loop
#[allow(async_fn_in_trait)]
pub trait KeySource {
    /// Wait a bounded time for one key. `None` when no key was pressed.
    async fn poll_key(&mut self) -> Result<Option<u8>>;

    /// Put the input device back the way it was found
    fn restore(&mut self) -> Result<()>;
}

/// Key reader that owns the terminal's saved mode
pub struct TerminalKeys<D: TerminalDevice> {
    device: Arc<D>,
    cooked: D::Mode,
    raw: D::Mode,
    poll_timeout: Duration,
    restored: bool,
}

impl<D: TerminalDevice> std::fmt::Debug for TerminalKeys<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalKeys")
            .field("poll_timeout", &self.poll_timeout)
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}

impl<D: TerminalDevice> TerminalKeys<D> {
    /// Capture the terminal mode and prepare for polling
    ///
    /// # Arguments
    ///
    /// * `device` - Terminal to read from
    /// * `poll_timeout` - Longest time a single poll may wait for a key
    ///
    /// # Errors
    ///
    /// - `NotATerminal`: input is not a terminal, so its mode could not be restored on exit
    /// - `Terminal`: the current attributes cannot be read
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use keyboard_joy::terminal::device::StdinTerminal;
    /// use keyboard_joy::terminal::keys::{TerminalKeys, DEFAULT_POLL_TIMEOUT};
    ///
    /// let keys = TerminalKeys::open(Arc::new(StdinTerminal), DEFAULT_POLL_TIMEOUT)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(device: Arc<D>, poll_timeout: Duration) -> Result<Self> {
        if !device.is_terminal() {
            return Err(KeyboardJoyError::NotATerminal);
        }

        let cooked = device.get_mode()?;
        let raw = device.raw_mode(&cooked);
        debug!("Captured terminal mode (poll timeout {:?})", poll_timeout);

        Ok(Self {
            device,
            cooked,
            raw,
            poll_timeout,
            restored: false,
        })
    }

    /// Terminal mode captured at open
    pub fn saved_mode(&self) -> &D::Mode {
        &self.cooked
    }

    /// Configured poll timeout
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    /// Put the captured mode back on the terminal
    pub fn restore_saved_mode(&mut self) -> Result<()> {
        self.device.set_mode(&self.cooked)?;
        self.restored = true;
        debug!("Terminal mode restored");
        Ok(())
    }
}

impl<D: TerminalDevice> Drop for TerminalKeys<D> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.device.set_mode(&self.cooked) {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

impl<D> KeySource for TerminalKeys<D>
where
    D: TerminalDevice + Send + Sync + 'static,
    D::Mode: Send + 'static,
{
    async fn poll_key(&mut self) -> Result<Option<u8>> {
        let device = Arc::clone(&self.device);
        let raw = self.raw.clone();
        let cooked = self.cooked.clone();
        let timeout = self.poll_timeout;

        task::spawn_blocking(move || poll_once(device.as_ref(), &raw, &cooked, timeout))
            .await
            .map_err(|e| KeyboardJoyError::Terminal(format!("Key poll task failed: {}", e)))?
    }

    fn restore(&mut self) -> Result<()> {
        self.restore_saved_mode()
    }
}

/// One raw-mode read window
///
/// The cooked mode is reapplied even when waiting or reading fails.
fn poll_once<D: TerminalDevice>(
    device: &D,
    raw: &D::Mode,
    cooked: &D::Mode,
    timeout: Duration,
) -> Result<Option<u8>> {
    device.enter_raw(raw)?;

    let key = match device.wait_readable(timeout) {
        Ok(true) => device.read_byte(),
        Ok(false) => Ok(None),
        Err(e) => Err(e),
    };

    device.set_mode(cooked)?;
    key
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Key source that replays a fixed script, one entry per poll
    #[derive(Clone)]
    pub struct ScriptedKeys {
        pub script: VecDeque<Option<u8>>,
        pub polls: Arc<AtomicUsize>,
        pub restores: Arc<AtomicUsize>,
    }

    impl ScriptedKeys {
        pub fn new(script: &[Option<u8>]) -> Self {
            Self {
                script: script.iter().copied().collect(),
                polls: Arc::new(AtomicUsize::new(0)),
                restores: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn poll_count(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }

        pub fn restore_count(&self) -> usize {
            self.restores.load(Ordering::SeqCst)
        }
    }

    impl KeySource for ScriptedKeys {
        async fn poll_key(&mut self) -> Result<Option<u8>> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(self.script.pop_front().flatten())
        }

        fn restore(&mut self) -> Result<()> {
            self.restores.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
