//! # Keyboard Joy
//!
//! Drive a robot from a terminal without joystick hardware.
//!
//! This application turns WASD / IJKL keystrokes into joystick messages
//! published at 10Hz.

use anyhow::{Context, Result};
use std::io;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use keyboard_joy::config::{Config, LoggingConfig};
use keyboard_joy::publisher::AnyPublisher;
use keyboard_joy::shutdown::{spawn_signal_listener, ShutdownSignal};
use keyboard_joy::teleop::{TeleopSettings, TerminalJoystickAdapter};
use keyboard_joy::terminal::device::StdinTerminal;
use keyboard_joy::terminal::keys::TerminalKeys;

/// Configuration file read from the working directory, if present
const CONFIG_PATH: &str = "config/keyboard-joy.toml";

/// Log file name prefix when logging to a directory
const LOG_FILE_PREFIX: &str = "keyboard-joy.log";

/// Main entry point for Keyboard Joy
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (defaults when no file is present)
///    - Set up logging with tracing subscriber
///    - Capture the terminal mode (fails if stdin is not a terminal)
///    - Open the message sink and print the key bindings
///
/// 2. **Main Loop**
///    - Poll one key per tick and publish the joystick frame at 10Hz
///    - ESC, Ctrl+C or SIGTERM ends the loop
///
/// 3. **Graceful Shutdown**
///    - Restore the terminal mode captured at startup
///    - Log the exit reason
///
/// # Errors
///
/// Returns error if:
/// - The configuration file is invalid
/// - Standard input is not a terminal
/// - The message sink cannot be opened
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH)
        .with_context(|| format!("Failed to load {}", CONFIG_PATH))?;

    let _log_guard = init_logging(&config.logging)?;

    info!("Keyboard Joy v{} starting...", env!("CARGO_PKG_VERSION"));

    let shutdown = ShutdownSignal::new();
    let _signals = spawn_signal_listener(shutdown.clone());

    let keys = TerminalKeys::open(Arc::new(StdinTerminal), config.input.poll_timeout())
        .context("Keyboard Joy must be run from an interactive terminal")?;

    let publisher = AnyPublisher::open(&config.publisher)
        .await
        .context("Failed to open message sink")?;

    let mut adapter = TerminalJoystickAdapter::initialize(
        keys,
        publisher,
        shutdown,
        TeleopSettings::from(&config),
    );
    adapter.print_usage(&mut io::stdout())?;

    let outcome = adapter.run().await;

    // Restore before reporting anything so the error prints to a sane terminal
    if let Err(e) = adapter.shutdown() {
        warn!("Failed to restore terminal: {}", e);
    }

    let reason = outcome?;
    info!("Keyboard Joy stopped: {}", reason);
    Ok(())
}

/// Initialize the tracing subscriber
///
/// Logs go to stderr unless `log_dir` is set, in which case they go to a daily
/// rolling file. The returned guard must be held until exit to flush the file
/// writer.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = config
        .level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", config.level))?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if config.log_dir.is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(None);
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        assert_eq!(CONFIG_PATH, "config/keyboard-joy.toml");
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/keyboard-joy.toml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.node.rate_hz, 10);
        assert_eq!(config.input.poll_timeout_ms, 100);
        assert_eq!(config.publisher.topic, "/joy");
    }

    #[test]
    fn test_settings_from_default_config() {
        let settings = TeleopSettings::from(&Config::default());
        assert_eq!(settings.period, std::time::Duration::from_millis(100));
    }
}
