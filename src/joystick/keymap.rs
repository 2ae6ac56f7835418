//! # Key Map Module
//!
//! Translates single raw bytes read from the terminal into joystick commands.
//!
//! ## Bindings
//!
//! | Key | Vector | Stick |
//! |-----|--------|-------|
//! | w | [0, -1] | Left |
//! | a | [-1, 0] | Left |
//! | s | [0, 1] | Left |
//! | d | [1, 0] | Left |
//! | i | [1, 0] | Right |
//! | j | [0, 1] | Right |
//! | k | [-1, 0] | Right |
//! | l | [0, -1] | Right |
//!
//! ESC exits. Ctrl+C (0x03) arrives as a byte while the terminal is raw and is
//! treated as an interrupt. Anything else, including no key at all, releases
//! both sticks.

use super::state::{Stick, StickVector};

/// Escape byte.
pub const KEY_ESCAPE: u8 = 0x1b;

/// End-of-text byte produced by Ctrl+C in raw mode.
pub const KEY_INTERRUPT: u8 = 0x03;

/// One key bound to a stick direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: u8,
    pub stick: Stick,
    pub vector: StickVector,
}

const fn bind(key: u8, stick: Stick, x: i8, y: i8) -> Binding {
    Binding {
        key,
        stick,
        vector: StickVector::new(x, y),
    }
}

const DEFAULT_BINDINGS: [Binding; 8] = [
    bind(b'w', Stick::Left, 0, -1),
    bind(b'a', Stick::Left, -1, 0),
    bind(b's', Stick::Left, 0, 1),
    bind(b'd', Stick::Left, 1, 0),
    bind(b'i', Stick::Right, 1, 0),
    bind(b'j', Stick::Right, 0, 1),
    bind(b'k', Stick::Right, -1, 0),
    bind(b'l', Stick::Right, 0, -1),
];

/// What the teleop loop should do with one polled key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Operator asked to exit
    Exit,
    /// Ctrl+C typed while the terminal was raw
    Interrupt,
    /// Set one stick to a fixed vector
    Deflect { stick: Stick, vector: StickVector },
    /// No recognized key this tick: center both sticks
    Release,
}

/// Immutable key binding table.
///
/// Built once and owned by the teleop adapter.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: [Binding; 8],
}

impl KeyMap {
    /// Create the standard WASD / IJKL map.
    pub fn new() -> Self {
        Self {
            bindings: DEFAULT_BINDINGS,
        }
    }

    /// All bindings in table order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Binding for a key, if any. Matching is case-sensitive.
    pub fn lookup(&self, key: u8) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.key == key)
    }

    /// Classify a polled key.
    pub fn command_for(&self, key: Option<u8>) -> KeyCommand {
        match key {
            Some(KEY_ESCAPE) => KeyCommand::Exit,
            Some(KEY_INTERRUPT) => KeyCommand::Interrupt,
            Some(key) => match self.lookup(key) {
                Some(binding) => KeyCommand::Deflect {
                    stick: binding.stick,
                    vector: binding.vector,
                },
                None => KeyCommand::Release,
            },
            None => KeyCommand::Release,
        }
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}
