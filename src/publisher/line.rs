//! JSON-lines sink for standard output or a file

use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use super::message::{encode_line, Joy};
use super::JoyPublisher;
use crate::error::{KeyboardJoyError, Result};

/// Writes every message as one JSON line to an async writer
pub struct LinePublisher<W> {
    writer: W,
    topic: String,
}

impl<W> std::fmt::Debug for LinePublisher<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinePublisher")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

impl<W: AsyncWrite + Unpin> LinePublisher<W> {
    pub fn new(writer: W, topic: impl Into<String>) -> Self {
        Self {
            writer,
            topic: topic.into(),
        }
    }

    /// Consume the publisher and return the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl LinePublisher<tokio::io::Stdout> {
    /// Publish to standard output
    pub fn stdout(topic: impl Into<String>) -> Self {
        Self::new(tokio::io::stdout(), topic)
    }
}

impl LinePublisher<tokio::fs::File> {
    /// Publish to a file, appending if it already exists
    ///
    /// # Errors
    ///
    /// Returns `Publish` error if the file cannot be opened
    pub async fn append(path: impl AsRef<Path>, topic: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| {
                KeyboardJoyError::Publish(format!("Failed to open {}: {}", path.display(), e))
            })?;

        info!("Publishing joystick messages to {}", path.display());
        Ok(Self::new(file, topic))
    }
}

impl<W: AsyncWrite + Unpin> JoyPublisher for LinePublisher<W> {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&mut self, msg: &Joy) -> Result<()> {
        let line = encode_line(&self.topic, msg)?;

        self.writer
            .write_all(&line)
            .await
            .map_err(|e| KeyboardJoyError::Publish(format!("Failed to write message: {}", e)))?;

        self.writer
            .flush()
            .await
            .map_err(|e| KeyboardJoyError::Publish(format!("Failed to flush message: {}", e)))?;

        debug!("Published {} seq {} ({} bytes)", self.topic, msg.header.seq, line.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joystick::state::JoystickFrame;
    use chrono::Utc;
    use serde_json::Value;
    use tempfile::tempdir;

    fn message(seq: u64) -> Joy {
        Joy::from_frame(&JoystickFrame::default(), seq, Utc::now(), "")
    }

    #[tokio::test]
    async fn test_publish_writes_one_line_per_message() {
        let mut publisher = LinePublisher::new(Vec::new(), "/joy");
        publisher.publish(&message(1)).await.unwrap();
        publisher.publish(&message(2)).await.unwrap();

        let written = publisher.into_inner();
        let lines: Vec<&[u8]> = written
            .split(|&b| b == b'\n')
            .filter(|line| !line.is_empty())
            .collect();
        assert_eq!(lines.len(), 2);

        let second: Value = serde_json::from_slice(lines[1]).unwrap();
        assert_eq!(second["topic"], "/joy");
        assert_eq!(second["msg"]["header"]["seq"], 2);
    }

    #[tokio::test]
    async fn test_topic_is_reported() {
        let publisher = LinePublisher::new(Vec::new(), "/teleop/joy");
        assert_eq!(publisher.topic(), "/teleop/joy");
    }

    #[tokio::test]
    async fn test_append_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("joy.jsonl");

        let mut publisher = LinePublisher::append(&path, "/joy").await.unwrap();
        publisher.publish(&message(1)).await.unwrap();
        drop(publisher);

        let mut publisher = LinePublisher::append(&path, "/joy").await.unwrap();
        publisher.publish(&message(2)).await.unwrap();
        drop(publisher);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_append_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("joy.jsonl");

        let result = LinePublisher::append(&path, "/joy").await;
        match result {
            Err(KeyboardJoyError::Publish(msg)) => assert!(msg.contains("Failed to open")),
            other => panic!("Expected Publish error, got: {:?}", other.map(|_| ())),
        }
    }
}
