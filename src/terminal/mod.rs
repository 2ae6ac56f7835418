//! # Terminal Module
//!
//! Raw keystroke input from the controlling terminal.
//!
//! This module handles:
//! - Capturing and restoring terminal attributes (termios)
//! - Switching to raw mode for each bounded key poll
//! - Reading single unbuffered bytes from standard input

pub mod device;
pub mod keys;
