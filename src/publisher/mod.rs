//! # Publisher Module
//!
//! Delivers joystick messages to the outside world.
//!
//! This module handles:
//! - The `Joy` message and its JSON-line encoding
//! - The [`JoyPublisher`] sink abstraction
//! - UDP, standard output and file sinks

pub mod line;
pub mod message;
pub mod udp;

use std::net::SocketAddr;
use tokio::fs::File;
use tokio::io::Stdout;

use crate::config::{PublisherConfig, SinkKind};
use crate::error::{KeyboardJoyError, Result};
use line::LinePublisher;
use message::Joy;
use udp::UdpPublisher;

/// Sink for joystick messages on one topic
#[allow(async_fn_in_trait)]
pub trait JoyPublisher {
    /// Topic every message is published on
    fn topic(&self) -> &str;

    /// Publish one message
    async fn publish(&mut self, msg: &Joy) -> Result<()>;
}

/// Publisher selected from configuration
#[derive(Debug)]
pub enum AnyPublisher {
    Udp(UdpPublisher),
    Stdout(LinePublisher<Stdout>),
    File(LinePublisher<File>),
}

impl AnyPublisher {
    /// Open the sink named in `config`
    ///
    /// # Errors
    ///
    /// Returns error if the address is invalid or the sink cannot be opened
    pub async fn open(config: &PublisherConfig) -> Result<Self> {
        let topic = config.topic.clone();

        match config.sink {
            SinkKind::Udp => {
                let target: SocketAddr = config.address.parse().map_err(|e| {
                    KeyboardJoyError::Publish(format!("Invalid address {}: {}", config.address, e))
                })?;
                Ok(Self::Udp(UdpPublisher::connect(target, topic).await?))
            }
            SinkKind::Stdout => Ok(Self::Stdout(LinePublisher::stdout(topic))),
            SinkKind::File => Ok(Self::File(LinePublisher::append(&config.path, topic).await?)),
        }
    }
}

impl JoyPublisher for AnyPublisher {
    fn topic(&self) -> &str {
        match self {
            Self::Udp(p) => p.topic(),
            Self::Stdout(p) => p.topic(),
            Self::File(p) => p.topic(),
        }
    }

    async fn publish(&mut self, msg: &Joy) -> Result<()> {
        match self {
            Self::Udp(p) => p.publish(msg).await,
            Self::Stdout(p) => p.publish(msg).await,
            Self::File(p) => p.publish(msg).await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::net::UdpSocket;

    #[tokio::test]
    async fn test_open_udp_sink() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = PublisherConfig {
            sink: SinkKind::Udp,
            address: receiver.local_addr().unwrap().to_string(),
            ..PublisherConfig::default()
        };

        let publisher = AnyPublisher::open(&config).await.unwrap();
        assert!(matches!(publisher, AnyPublisher::Udp(_)));
        assert_eq!(publisher.topic(), "/joy");
    }

    #[tokio::test]
    async fn test_open_udp_sink_with_bad_address() {
        let config = PublisherConfig {
            sink: SinkKind::Udp,
            address: "not-an-address".to_string(),
            ..PublisherConfig::default()
        };

        let result = AnyPublisher::open(&config).await;
        assert!(matches!(result, Err(KeyboardJoyError::Publish(_))));
    }

    #[tokio::test]
    async fn test_open_file_sink() {
        let dir = tempdir().unwrap();
        let config = PublisherConfig {
            sink: SinkKind::File,
            path: dir.path().join("joy.jsonl").to_string_lossy().to_string(),
            topic: "/robot/joy".to_string(),
            ..PublisherConfig::default()
        };

        let publisher = AnyPublisher::open(&config).await.unwrap();
        assert!(matches!(publisher, AnyPublisher::File(_)));
        assert_eq!(publisher.topic(), "/robot/joy");
    }

    #[tokio::test]
    async fn test_open_stdout_sink() {
        let config = PublisherConfig {
            sink: SinkKind::Stdout,
            ..PublisherConfig::default()
        };

        let publisher = AnyPublisher::open(&config).await.unwrap();
        assert!(matches!(publisher, AnyPublisher::Stdout(_)));
    }
}
