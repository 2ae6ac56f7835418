//! # Joystick Module
//!
//! Keyboard-driven virtual joystick.
//!
//! This module handles:
//! - Stick vectors and the fixed button bank
//! - Per-tick joystick frames
//! - The immutable WASD / IJKL key map

pub mod keymap;
pub mod state;
