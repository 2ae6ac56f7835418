//! # Joystick State Module
//!
//! Digital joystick state driven by keyboard input.
//!
//! ## Axes
//!
//! | Index | Source | Range |
//! |-------|--------|-------|
//! | 0 | Left stick X | -1/0/1 |
//! | 1 | Left stick Y | -1/0/1 |
//! | 2 | Right stick X | -1/0/1 |
//! | 3 | Right stick Y | -1/0/1 |
//!
//! ## Usage
//!
//! ```
//! use keyboard_joy::joystick::state::{JoystickState, Stick, StickVector};
//!
//! let mut state = JoystickState::default();
//! state.deflect(Stick::Left, StickVector::new(0, -1));
//! assert_eq!(state.frame().axes(), [0.0, -1.0, 0.0, 0.0]);
//!
//! state.center();
//! assert_eq!(state.frame().axes(), [0.0; 4]);
//! ```

/// Number of digital buttons carried in every frame.
pub const BUTTON_COUNT: usize = 12;

/// Number of axes carried in every frame (two per stick).
pub const AXIS_COUNT: usize = 4;

/// Which of the two sticks a key drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    /// Left stick (W/A/S/D)
    Left,
    /// Right stick (I/J/K/L)
    Right,
}

/// Direction of one stick.
///
/// Each component is always one of -1, 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StickVector {
    x: i8,
    y: i8,
}

impl StickVector {
    /// Stick at rest.
    pub const CENTER: StickVector = StickVector { x: 0, y: 0 };

    /// Create a stick vector. Components are clamped to their sign so the
    /// result stays within -1..=1.
    pub const fn new(x: i8, y: i8) -> Self {
        Self {
            x: x.signum(),
            y: y.signum(),
        }
    }

    /// Horizontal component.
    pub fn x(&self) -> i8 {
        self.x
    }

    /// Vertical component.
    pub fn y(&self) -> i8 {
        self.y
    }

    /// True when both components are zero.
    pub fn is_centered(&self) -> bool {
        *self == Self::CENTER
    }
}

/// Fixed bank of digital buttons (0 = released, 1 = pressed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonBank([u8; BUTTON_COUNT]);

impl ButtonBank {
    /// Button values in order.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Button values widened for the outbound message.
    pub fn values(&self) -> Vec<i32> {
        self.0.iter().map(|&b| i32::from(b)).collect()
    }
}

/// Snapshot of both sticks and the button bank for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoystickFrame {
    pub left: StickVector,
    pub right: StickVector,
    pub buttons: ButtonBank,
}

impl JoystickFrame {
    /// Axes in message order: left.x, left.y, right.x, right.y.
    pub fn axes(&self) -> [f32; AXIS_COUNT] {
        [
            f32::from(self.left.x),
            f32::from(self.left.y),
            f32::from(self.right.x),
            f32::from(self.right.y),
        ]
    }
}

/// Mutable joystick state owned by the teleop loop.
#[derive(Debug, Clone, Default)]
pub struct JoystickState {
    left: StickVector,
    right: StickVector,
    buttons: ButtonBank,
}

impl JoystickState {
    /// Replace one stick's vector, leaving the other stick untouched.
    pub fn deflect(&mut self, stick: Stick, vector: StickVector) {
        match stick {
            Stick::Left => self.left = vector,
            Stick::Right => self.right = vector,
        }
    }

    /// Return both sticks to center.
    pub fn center(&mut self) {
        self.left = StickVector::CENTER;
        self.right = StickVector::CENTER;
    }

    /// Current snapshot.
    pub fn frame(&self) -> JoystickFrame {
        JoystickFrame {
            left: self.left,
            right: self.right,
            buttons: self.buttons,
        }
    }
}
