//! # Shutdown Module
//!
//! Process lifecycle signal shared between the teleop loop and the OS signal
//! listener.
//!
//! The first request wins: later requests are ignored and the original reason
//! is kept.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Why the node is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Operator pressed ESC
    EscapePressed,
    /// Ctrl+C or a termination signal
    Interrupted,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EscapePressed => write!(f, "user requested shutdown"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Clonable shutdown flag
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown
    ///
    /// Returns true if this call initiated shutdown, false if shutdown had
    /// already been requested.
    pub fn request(&self, reason: ShutdownReason) -> bool {
        let initiated = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });

        if initiated {
            debug!("Shutdown requested: {}", reason);
        }
        initiated
    }

    /// Reason shutdown was requested, if it has been
    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.tx.borrow()
    }

    pub fn is_requested(&self) -> bool {
        self.reason().is_some()
    }

    /// Wait until shutdown is requested
    pub async fn requested(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        let reason = match rx.wait_for(Option::is_some).await {
            Ok(reason) => (*reason).unwrap_or(ShutdownReason::Interrupted),
            Err(_) => ShutdownReason::Interrupted,
        };
        reason
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn Ctrl+C and SIGTERM into a shutdown request
///
/// The listener exits on its own once shutdown has been requested for any
/// other reason.
pub fn spawn_signal_listener(signal: ShutdownSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut terminate =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(stream) => Some(stream),
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    None
                }
            };

        let received = async {
            match terminate.as_mut() {
                Some(stream) => {
                    stream.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                signal.request(ShutdownReason::Interrupted);
            }
            _ = received => {
                info!("Received SIGTERM, shutting down...");
                signal.request(ShutdownReason::Interrupted);
            }
            _ = signal.requested() => {}
        }
    })
}
