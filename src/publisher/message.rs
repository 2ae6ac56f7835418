//! # Joy Message
//!
//! Outbound joystick message and its wire encoding.
//!
//! ## Wire Format
//!
//! One JSON object per message, terminated by a newline:
//!
//! ```text
//! {"topic":"/joy","msg":{"header":{"seq":1,"stamp":"2024-05-01T12:00:00Z","frame_id":""},"axes":[0.0,-1.0,0.0,0.0],"buttons":[0,0,0,0,0,0,0,0,0,0,0,0]}}
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::joystick::state::JoystickFrame;

/// Message metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    /// Monotonically increasing per publisher session, starting at 1
    pub seq: u64,
    /// Time the frame was sampled
    pub stamp: DateTime<Utc>,
    pub frame_id: String,
}

/// Joystick message: four axes and twelve buttons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Joy {
    pub header: Header,
    /// left.x, left.y, right.x, right.y
    pub axes: Vec<f32>,
    pub buttons: Vec<i32>,
}

impl Joy {
    /// Build a message from a joystick frame
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use keyboard_joy::joystick::state::JoystickFrame;
    /// use keyboard_joy::publisher::message::Joy;
    ///
    /// let msg = Joy::from_frame(&JoystickFrame::default(), 1, Utc::now(), "");
    /// assert_eq!(msg.axes, vec![0.0; 4]);
    /// assert_eq!(msg.buttons, vec![0; 12]);
    /// ```
    pub fn from_frame(
        frame: &JoystickFrame,
        seq: u64,
        stamp: DateTime<Utc>,
        frame_id: &str,
    ) -> Self {
        Self {
            header: Header {
                seq,
                stamp,
                frame_id: frame_id.to_string(),
            },
            axes: frame.axes().to_vec(),
            buttons: frame.buttons.values(),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    topic: &'a str,
    msg: &'a Joy,
}

/// Encode a message for `topic` as one newline-terminated JSON line
pub fn encode_line(topic: &str, msg: &Joy) -> Result<Bytes> {
    let mut writer = BytesMut::with_capacity(256).writer();
    serde_json::to_writer(&mut writer, &Envelope { topic, msg })?;

    let mut buf = writer.into_inner();
    buf.put_u8(b'\n');
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joystick::state::{JoystickState, Stick, StickVector};
    use chrono::TimeZone;
    use serde_json::Value;

    fn sample_message() -> Joy {
        let mut state = JoystickState::default();
        state.deflect(Stick::Left, StickVector::new(0, -1));
        state.deflect(Stick::Right, StickVector::new(1, 0));
        let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Joy::from_frame(&state.frame(), 3, stamp, "base_link")
    }

    #[test]
    fn test_from_frame_axes_order() {
        let msg = sample_message();
        assert_eq!(msg.axes, vec![0.0, -1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_from_frame_buttons_released() {
        assert_eq!(sample_message().buttons, vec![0; 12]);
    }

    #[test]
    fn test_from_frame_header() {
        let msg = sample_message();
        assert_eq!(msg.header.seq, 3);
        assert_eq!(msg.header.frame_id, "base_link");
    }

    #[test]
    fn test_encode_line_is_newline_terminated() {
        let line = encode_line("/joy", &sample_message()).unwrap();
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn test_encode_line_envelope() {
        let line = encode_line("/joy", &sample_message()).unwrap();
        let value: Value = serde_json::from_slice(&line).unwrap();

        assert_eq!(value["topic"], "/joy");
        assert_eq!(value["msg"]["header"]["seq"], 3);
        assert_eq!(value["msg"]["header"]["frame_id"], "base_link");
        assert_eq!(value["msg"]["header"]["stamp"], "2024-05-01T12:00:00Z");
        assert_eq!(value["msg"]["axes"][1].as_f64(), Some(-1.0));
        assert_eq!(value["msg"]["axes"][2].as_f64(), Some(1.0));
        assert_eq!(value["msg"]["buttons"].as_array().unwrap().len(), 12);
    }
}
