//! # Error Types
//!
//! Custom error types for Keyboard Joy using `thiserror`.

use thiserror::Error;

/// Main error type for Keyboard Joy
#[derive(Debug, Error)]
pub enum KeyboardJoyError {
    /// Terminal attribute or input errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Standard input is not attached to a terminal, so its mode cannot be restored
    #[error("Standard input is not a terminal")]
    NotATerminal,

    /// Message sink errors
    #[error("Publish error: {0}")]
    Publish(String),

    /// The adapter has already stopped and cannot be restarted
    #[error("Teleop adapter already stopped")]
    Stopped,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Message encoding errors
    #[error("Encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Keyboard Joy
pub type Result<T> = std::result::Result<T, KeyboardJoyError>;
