//! # Keyboard Joy Library
//!
//! Drive a robot from a terminal without joystick hardware.
//!
//! This library reads single keystrokes from the controlling terminal, maps
//! them onto a two-stick, twelve-button virtual joystick, and publishes the
//! joystick state at a fixed rate.

pub mod config;
pub mod error;
pub mod joystick;
pub mod publisher;
pub mod shutdown;
pub mod teleop;
pub mod terminal;
