//! # Teleop Module
//!
//! The keyboard teleop loop: poll a key, update the sticks, publish a frame,
//! wait for the next tick.
//!
//! ## Control Flow
//!
//! Each tick (10 Hz by default):
//!
//! 1. Stop if shutdown has been requested elsewhere
//! 2. Poll one key (bounded wait, raw mode only for the duration of the poll)
//! 3. ESC requests shutdown and ends the loop; a raw Ctrl+C does the same as an interrupt
//! 4. A WASD key sets the left stick, an IJKL key sets the right stick
//! 5. Any other key, or no key, centers both sticks
//! 6. Publish the current frame
//!
//! ## States
//!
//! `Running` until ESC or an external shutdown, then `Stopped` for good.

use chrono::Utc;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::{KeyboardJoyError, Result};
use crate::joystick::keymap::{KeyCommand, KeyMap};
use crate::joystick::state::{JoystickFrame, JoystickState};
use crate::publisher::message::Joy;
use crate::publisher::JoyPublisher;
use crate::shutdown::{ShutdownReason, ShutdownSignal};
use crate::terminal::keys::KeySource;

/// Number of frames between status log messages (10 seconds at 10Hz)
const LOG_INTERVAL_FRAMES: u64 = 100;

const USAGE: &str = "
Keyboard Joystick Node

Use the following keys to control the joystick:

Left Stick:
W - Forward
S - Backward
A - Left
D - Right

Right Stick:
I - Forward
K - Backward
J - Left
L - Right

Press ESC to exit the node.
";

/// Loop timing and message metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeleopSettings {
    pub node_name: String,
    pub period: Duration,
    pub frame_id: String,
}

impl Default for TeleopSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for TeleopSettings {
    fn from(config: &Config) -> Self {
        Self {
            node_name: config.node.name.clone(),
            period: config.node.period(),
            frame_id: config.publisher.frame_id.clone(),
        }
    }
}

/// Adapter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Running,
    Stopped,
}

/// Turns keystrokes into a fixed-rate stream of joystick messages
pub struct TerminalJoystickAdapter<K, P> {
    keys: K,
    publisher: P,
    shutdown: ShutdownSignal,
    keymap: KeyMap,
    joystick: JoystickState,
    settings: TeleopSettings,
    state: AdapterState,
    seq: u64,
}

impl<K: KeySource, P: JoyPublisher> TerminalJoystickAdapter<K, P> {
    /// Create the adapter around an opened key source
    ///
    /// The key source already holds the captured terminal mode. Both sticks
    /// start centered and every button released.
    pub fn initialize(keys: K, publisher: P, shutdown: ShutdownSignal, settings: TeleopSettings) -> Self {
        info!(
            "{} ready: publishing {} every {:?}",
            settings.node_name,
            publisher.topic(),
            settings.period
        );

        Self {
            keys,
            publisher,
            shutdown,
            keymap: KeyMap::new(),
            joystick: JoystickState::default(),
            settings,
            state: AdapterState::Running,
            seq: 0,
        }
    }

    /// Write the key binding banner
    pub fn print_usage<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", USAGE)?;
        out.flush()
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Snapshot that would be published now
    pub fn frame(&self) -> JoystickFrame {
        self.joystick.frame()
    }

    /// Frames published so far
    pub fn frames_published(&self) -> u64 {
        self.seq
    }

    /// Run the teleop loop until ESC or an external shutdown
    ///
    /// # Returns
    ///
    /// * `Result<ShutdownReason>` - Why the loop ended
    ///
    /// # Errors
    ///
    /// - `Stopped`: the adapter has already run to completion
    /// - `Terminal`: the key source failed
    ///
    /// The adapter is `Stopped` after this returns, whether or not it succeeded.
    pub async fn run(&mut self) -> Result<ShutdownReason> {
        if self.state == AdapterState::Stopped {
            return Err(KeyboardJoyError::Stopped);
        }

        let outcome = self.run_loop().await;
        self.state = AdapterState::Stopped;

        match &outcome {
            Ok(reason) => info!("Teleop loop stopped ({}) after {} frames", reason, self.seq),
            Err(e) => warn!("Teleop loop failed after {} frames: {}", self.seq, e),
        }
        outcome
    }

    async fn run_loop(&mut self) -> Result<ShutdownReason> {
        let mut ticker = time::interval(self.settings.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_log_count: u64 = 0;

        loop {
            ticker.tick().await;

            if let Some(reason) = self.shutdown.reason() {
                return Ok(reason);
            }

            let key = self.keys.poll_key().await?;
            trace!("Polled key: {:?}", key);

            match self.keymap.command_for(key) {
                KeyCommand::Exit => return Ok(self.stop(ShutdownReason::EscapePressed)),
                KeyCommand::Interrupt => return Ok(self.stop(ShutdownReason::Interrupted)),
                KeyCommand::Deflect { stick, vector } => self.joystick.deflect(stick, vector),
                KeyCommand::Release => self.joystick.center(),
            }

            self.publish_frame().await;

            if self.seq - last_log_count >= LOG_INTERVAL_FRAMES {
                info!("Published {} frames on {}", self.seq, self.publisher.topic());
                last_log_count = self.seq;
            }
        }
    }

    /// Raise the shutdown signal and report the reason that won
    fn stop(&self, reason: ShutdownReason) -> ShutdownReason {
        self.shutdown.request(reason);
        self.shutdown.reason().unwrap_or(reason)
    }

    async fn publish_frame(&mut self) {
        self.seq += 1;
        let msg = Joy::from_frame(
            &self.joystick.frame(),
            self.seq,
            Utc::now(),
            &self.settings.frame_id,
        );

        if let Err(e) = self.publisher.publish(&msg).await {
            // Dropped frames are superseded by the next tick
            warn!("Failed to publish frame {}: {}", self.seq, e);
            return;
        }
        debug!("Frame {} axes {:?}", self.seq, msg.axes);
    }

    /// Stop the adapter and put the terminal back the way it was found
    ///
    /// # Errors
    ///
    /// Returns error if the terminal mode cannot be restored
    pub fn shutdown(&mut self) -> Result<()> {
        self.state = AdapterState::Stopped;
        self.keys.restore()
    }
}
