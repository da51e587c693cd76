//! Planar velocity messages.

use crate::codec::{deserialize_number, serialize_number, size_number};
use crate::error::Result;
use crate::message::Message;
use crate::standard::Header;

/// Planar body velocity: linear x and y in m/s, angular z in rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Twist2D {
    pub vx: f32,
    pub vy: f32,
    pub wz: f32,
}

impl Message for Twist2D {
    fn wire_size(&self) -> u32 {
        size_number(&self.vx) + size_number(&self.vy) + size_number(&self.wz)
    }

    fn serialize(&self, dst: &mut [u8], offset: &mut usize) {
        serialize_number(dst, offset, self.vx);
        serialize_number(dst, offset, self.vy);
        serialize_number(dst, offset, self.wz);
    }

    fn deserialize(src: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(Self {
            vx: deserialize_number(src, offset)?,
            vy: deserialize_number(src, offset)?,
            wz: deserialize_number(src, offset)?,
        })
    }
}

/// A stamped velocity command. The default value is the explicit
/// all-stop command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Twist2DStamped {
    pub header: Header,
    pub twist: Twist2D,
}

impl Message for Twist2DStamped {
    fn wire_size(&self) -> u32 {
        self.header.wire_size() + self.twist.wire_size()
    }

    fn serialize(&self, dst: &mut [u8], offset: &mut usize) {
        self.header.serialize(dst, offset);
        self.twist.serialize(dst, offset);
    }

    fn deserialize(src: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(Self {
            header: Header::deserialize(src, offset)?,
            twist: Twist2D::deserialize(src, offset)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::Time;

    #[test]
    fn test_twist_roundtrip() {
        let twist = Twist2D {
            vx: 0.5,
            vy: -0.5,
            wz: 2.5,
        };
        let mut buf = [0u8; 12];
        let mut offset = 0;
        twist.serialize(&mut buf, &mut offset);
        assert_eq!(offset, 12);

        let mut read = 0;
        assert_eq!(Twist2D::deserialize(&buf, &mut read).unwrap(), twist);
    }

    #[test]
    fn test_stamped_golden_layout() {
        let cmd = Twist2DStamped {
            header: Header {
                seq: 1,
                frame_id: "ab".to_owned(),
                stamp: Time { sec: 2, nsec: 3 },
            },
            twist: Twist2D {
                vx: 0.5,
                vy: 0.0,
                wz: -1.0,
            },
        };
        assert_eq!(cmd.wire_size(), 4 + (4 + 2) + 8 + 12);

        let mut buf = vec![0u8; cmd.wire_size() as usize];
        let mut offset = 0;
        cmd.serialize(&mut buf, &mut offset);

        let mut expected = Vec::new();
        expected.extend_from_slice(&1u32.to_ne_bytes());
        expected.extend_from_slice(&2u32.to_ne_bytes());
        expected.extend_from_slice(b"ab");
        expected.extend_from_slice(&2u32.to_ne_bytes());
        expected.extend_from_slice(&3u32.to_ne_bytes());
        expected.extend_from_slice(&0.5f32.to_ne_bytes());
        expected.extend_from_slice(&0.0f32.to_ne_bytes());
        expected.extend_from_slice(&(-1.0f32).to_ne_bytes());
        assert_eq!(buf, expected);
    }

    #[test]
    fn test_default_is_all_stop() {
        let stop = Twist2DStamped::default();
        assert_eq!(stop.twist.vx, 0.0);
        assert_eq!(stop.twist.vy, 0.0);
        assert_eq!(stop.twist.wz, 0.0);
    }

    #[test]
    fn test_stamped_truncated() {
        let cmd = Twist2DStamped::default();
        let mut buf = vec![0u8; cmd.wire_size() as usize];
        let mut offset = 0;
        cmd.serialize(&mut buf, &mut offset);

        let mut read = 0;
        assert!(Twist2DStamped::deserialize(&buf[..buf.len() - 1], &mut read).is_err());
    }
}
