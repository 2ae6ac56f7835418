//! UDP datagram sink: one JSON message per datagram

use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use super::message::{encode_line, Joy};
use super::JoyPublisher;
use crate::error::{KeyboardJoyError, Result};

/// Sends every message to a fixed UDP peer
#[derive(Debug)]
pub struct UdpPublisher {
    socket: UdpSocket,
    target: SocketAddr,
    topic: String,
}

impl UdpPublisher {
    /// Bind an ephemeral local socket and connect it to `target`
    ///
    /// # Errors
    ///
    /// Returns `Publish` error if the socket cannot be bound or connected
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use keyboard_joy::publisher::udp::UdpPublisher;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let publisher = UdpPublisher::connect("127.0.0.1:5005".parse()?, "/joy").await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(target: SocketAddr, topic: impl Into<String>) -> Result<Self> {
        let bind_addr = if target.is_ipv4() {
            SocketAddr::from(([0u8; 4], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| KeyboardJoyError::Publish(format!("Failed to bind UDP socket: {}", e)))?;

        socket.connect(target).await.map_err(|e| {
            KeyboardJoyError::Publish(format!("Failed to connect to {}: {}", target, e))
        })?;

        info!("Publishing joystick messages to udp://{}", target);
        Ok(Self {
            socket,
            target,
            topic: topic.into(),
        })
    }

    /// Peer address messages are sent to
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl JoyPublisher for UdpPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&mut self, msg: &Joy) -> Result<()> {
        let datagram = encode_line(&self.topic, msg)?;

        self.socket.send(&datagram).await.map_err(|e| {
            KeyboardJoyError::Publish(format!("Failed to send to {}: {}", self.target, e))
        })?;

        debug!("Sent {} seq {} ({} bytes)", self.topic, msg.header.seq, datagram.len());
        Ok(())
    }
}
