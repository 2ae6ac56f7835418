//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so an absent file, an empty file, or a file that
//! sets only a few keys all yield a complete configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{KeyboardJoyError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Node identity and loop rate
#[derive(Debug, Deserialize, Clone)]
pub struct NodeConfig {
    #[serde(default = "default_node_name")]
    pub name: String,

    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

/// Keyboard input configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

/// Where joystick messages go
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// One JSON datagram per message to `address`
    Udp,
    /// JSON lines on standard output
    Stdout,
    /// JSON lines appended to `path`
    File,
}

/// Publisher configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PublisherConfig {
    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default)]
    pub frame_id: String,

    #[serde(default = "default_sink")]
    pub sink: SinkKind,

    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_path")]
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Empty means log to stderr
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_node_name() -> String { "keyboard_joystick".to_string() }
fn default_rate_hz() -> u32 { 10 }

fn default_poll_timeout_ms() -> u64 { 100 }

fn default_topic() -> String { "/joy".to_string() }
fn default_sink() -> SinkKind { SinkKind::Udp }
fn default_address() -> String { "127.0.0.1:5005".to_string() }
fn default_path() -> String { "joy.jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: default_node_name(),
            rate_hz: default_rate_hz(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            frame_id: String::new(),
            sink: default_sink(),
            address: default_address(),
            path: default_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl NodeConfig {
    /// Tick period derived from `rate_hz`
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.rate_hz.max(1)
    }
}

impl InputConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use keyboard_joy::config::Config;
    ///
    /// let config = Config::load("config/keyboard-joy.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read, parsed or validated
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::load(path)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.node.name.is_empty() {
            return Err(invalid("node name cannot be empty"));
        }

        if self.node.rate_hz == 0 || self.node.rate_hz > 100 {
            return Err(invalid("rate_hz must be between 1 and 100"));
        }

        if self.input.poll_timeout_ms == 0 || self.input.poll_timeout_ms > 1000 {
            return Err(invalid("poll_timeout_ms must be between 1 and 1000"));
        }

        // A longer wait would stretch every idle tick past the period
        if self.input.poll_timeout() > self.node.period() {
            return Err(invalid(format!(
                "poll_timeout_ms ({}) must not exceed the tick period at {} Hz",
                self.input.poll_timeout_ms, self.node.rate_hz
            )));
        }

        if !self.publisher.topic.starts_with('/') || self.publisher.topic.len() < 2 {
            return Err(invalid("topic must start with '/' and name a topic"));
        }

        match self.publisher.sink {
            SinkKind::Udp => {
                if self.publisher.address.parse::<SocketAddr>().is_err() {
                    return Err(invalid(format!(
                        "address '{}' is not a valid socket address",
                        self.publisher.address
                    )));
                }
            }
            SinkKind::File => {
                if self.publisher.path.is_empty() {
                    return Err(invalid("path cannot be empty when sink is 'file'"));
                }
            }
            SinkKind::Stdout => {}
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(
                "log level must be one of: trace, debug, info, warn, error",
            ));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> KeyboardJoyError {
    KeyboardJoyError::Config(toml::de::Error::custom(msg))
}
