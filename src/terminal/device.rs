//! Trait abstraction for terminal operations to enable testing

use rustix::event::{poll, PollFd, PollFlags, Timespec};
use rustix::io::Errno;
use rustix::termios::{self, OptionalActions, Termios};
use std::io;
use std::time::Duration;

use crate::error::{KeyboardJoyError, Result};

#[cfg(test)]
use mockall::automock;

/// Trait for the terminal attribute and input operations the key reader needs
#[cfg_attr(test, automock(type Mode = u32;))]
pub trait TerminalDevice {
    /// Saved terminal attributes
    type Mode: Clone;

    /// Whether the input side is attached to a terminal
    fn is_terminal(&self) -> bool;

    /// Read the current terminal attributes
    fn get_mode(&self) -> Result<Self::Mode>;

    /// Apply terminal attributes, waiting for pending output to drain
    fn set_mode(&self, mode: &Self::Mode) -> Result<()>;

    /// Apply raw attributes, discarding input that arrived before the call
    fn enter_raw(&self, raw: &Self::Mode) -> Result<()>;

    /// Derive raw attributes (no echo, no line buffering, byte at a time) from a cooked mode
    fn raw_mode(&self, cooked: &Self::Mode) -> Self::Mode;

    /// Wait up to `timeout` for input. Returns true if a byte can be read.
    fn wait_readable(&self, timeout: Duration) -> Result<bool>;

    /// Read exactly one byte. `None` when nothing could be read.
    fn read_byte(&self) -> Result<Option<u8>>;
}

/// Standard input attached to the controlling terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinTerminal;

impl TerminalDevice for StdinTerminal {
    type Mode = Termios;

    fn is_terminal(&self) -> bool {
        termios::isatty(io::stdin())
    }

    fn get_mode(&self) -> Result<Termios> {
        termios::tcgetattr(io::stdin()).map_err(|e| {
            KeyboardJoyError::Terminal(format!("Failed to read terminal attributes: {}", e))
        })
    }

    fn set_mode(&self, mode: &Termios) -> Result<()> {
        termios::tcsetattr(io::stdin(), OptionalActions::Drain, mode).map_err(|e| {
            KeyboardJoyError::Terminal(format!("Failed to set terminal attributes: {}", e))
        })
    }

    fn enter_raw(&self, raw: &Termios) -> Result<()> {
        termios::tcsetattr(io::stdin(), OptionalActions::Flush, raw).map_err(|e| {
            KeyboardJoyError::Terminal(format!("Failed to enter raw mode: {}", e))
        })
    }

    fn raw_mode(&self, cooked: &Termios) -> Termios {
        let mut raw = cooked.clone();
        raw.make_raw();
        raw
    }

    fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        let stdin = io::stdin();
        let mut fds = [PollFd::new(&stdin, PollFlags::IN)];
        let timeout = Timespec {
            tv_sec: timeout.as_secs() as _,
            tv_nsec: timeout.subsec_nanos() as _,
        };

        match poll(&mut fds, Some(&timeout)) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(fds[0].revents().contains(PollFlags::IN)),
            // A signal landed during the wait: treat as an empty tick
            Err(Errno::INTR) => Ok(false),
            Err(e) => Err(KeyboardJoyError::Terminal(format!(
                "Failed to poll standard input: {}",
                e
            ))),
        }
    }

    fn read_byte(&self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];

        // Unbuffered: std's stdin buffer would hide bytes from the next flush
        match rustix::io::read(io::stdin(), &mut buf[..]) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(Errno::INTR) | Err(Errno::AGAIN) => Ok(None),
            Err(e) => Err(KeyboardJoyError::Terminal(format!(
                "Failed to read standard input: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Terminal attributes as seen by [`FakeTerminal`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FakeMode {
        pub raw: bool,
        pub flags: u32,
    }

    /// In-memory terminal for testing
    #[derive(Clone)]
    pub struct FakeTerminal {
        pub tty: bool,
        pub current: Arc<Mutex<FakeMode>>,
        pub history: Arc<Mutex<Vec<FakeMode>>>,
        pub input: Arc<Mutex<VecDeque<u8>>>,
        pub incoming: Arc<Mutex<VecDeque<Vec<u8>>>>,
        pub reads_in_raw: Arc<Mutex<Vec<bool>>>,
        pub read_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl FakeTerminal {
        pub fn new(flags: u32) -> Self {
            Self {
                tty: true,
                current: Arc::new(Mutex::new(FakeMode { raw: false, flags })),
                history: Arc::new(Mutex::new(Vec::new())),
                input: Arc::new(Mutex::new(VecDeque::new())),
                incoming: Arc::new(Mutex::new(VecDeque::new())),
                reads_in_raw: Arc::new(Mutex::new(Vec::new())),
                read_error: Arc::new(Mutex::new(None)),
            }
        }

        /// Keys already queued before the next poll starts
        pub fn type_keys(&self, keys: &[u8]) {
            self.input.lock().unwrap().extend(keys.iter().copied());
        }

        /// Keys that arrive while the next poll is waiting; one burst per poll
        pub fn type_keys_during_poll(&self, keys: &[u8]) {
            self.incoming.lock().unwrap().push_back(keys.to_vec());
        }

        pub fn pending_input(&self) -> usize {
            self.input.lock().unwrap().len()
        }

        pub fn current_mode(&self) -> FakeMode {
            *self.current.lock().unwrap()
        }

        pub fn get_history(&self) -> Vec<FakeMode> {
            self.history.lock().unwrap().clone()
        }

        pub fn get_reads_in_raw(&self) -> Vec<bool> {
            self.reads_in_raw.lock().unwrap().clone()
        }

        pub fn set_read_error(&self, error: io::ErrorKind) {
            *self.read_error.lock().unwrap() = Some(error);
        }
    }

    impl TerminalDevice for FakeTerminal {
        type Mode = FakeMode;

        fn is_terminal(&self) -> bool {
            self.tty
        }

        fn get_mode(&self) -> Result<FakeMode> {
            Ok(self.current_mode())
        }

        fn set_mode(&self, mode: &FakeMode) -> Result<()> {
            *self.current.lock().unwrap() = *mode;
            self.history.lock().unwrap().push(*mode);
            Ok(())
        }

        fn enter_raw(&self, raw: &FakeMode) -> Result<()> {
            self.input.lock().unwrap().clear();
            self.set_mode(raw)
        }

        fn raw_mode(&self, cooked: &FakeMode) -> FakeMode {
            FakeMode {
                raw: true,
                flags: cooked.flags & !0xff,
            }
        }

        fn wait_readable(&self, _timeout: Duration) -> Result<bool> {
            let mut input = self.input.lock().unwrap();
            if input.is_empty() {
                if let Some(burst) = self.incoming.lock().unwrap().pop_front() {
                    input.extend(burst);
                }
            }
            Ok(!input.is_empty())
        }

        fn read_byte(&self) -> Result<Option<u8>> {
            self.reads_in_raw.lock().unwrap().push(self.current_mode().raw);
            if let Some(kind) = *self.read_error.lock().unwrap() {
                return Err(io::Error::new(kind, "Mock read error").into());
            }
            Ok(self.input.lock().unwrap().pop_front())
        }
    }
}
