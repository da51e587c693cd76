//! Length-delimited message encoding.
//!
//! The pipeline between processes carries messages as a 4-byte count
//! followed by exactly that many message bytes. The count is the message's
//! wire size, not including the count itself.

use bytes::BytesMut;

use crate::codec::{deserialize_number, serialize_number};
use crate::error::{Result, WireError};
use crate::message::Message;

/// Byte width of the count prefix.
pub const PREFIX_SIZE: usize = 4;

/// Append `msg` to `dst` as `[u32 byte count][message bytes]`.
pub fn encode_delimited<M: Message>(msg: &M, dst: &mut BytesMut) {
    let size = msg.wire_size();
    let start = dst.len();
    dst.resize(start + PREFIX_SIZE + size as usize, 0);
    let mut offset = start;
    serialize_number(&mut dst[..], &mut offset, size);
    msg.serialize(&mut dst[..], &mut offset);
    debug_assert_eq!(offset, dst.len());
}

/// Decode one delimited message from the front of `src`.
///
/// The message is decoded against its declared extent only; it cannot read
/// past the count prefix's claim even when `src` holds more data (for
/// example a following message).
pub fn decode_delimited<M: Message>(src: &[u8]) -> Result<M> {
    let mut offset = 0;
    let declared = deserialize_number::<u32>(src, &mut offset)? as usize;
    let available = src.len().saturating_sub(offset);
    if declared > available {
        return Err(WireError::Truncated {
            offset,
            needed: declared,
            available,
        });
    }
    let body = &src[offset..offset + declared];
    let mut body_offset = 0;
    M::deserialize(body, &mut body_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Twist2D, Twist2DStamped};
    use crate::standard::{Header, Time, UInt32};

    fn sample_command() -> Twist2DStamped {
        Twist2DStamped {
            header: Header {
                seq: 9,
                frame_id: "rover".to_owned(),
                stamp: Time { sec: 100, nsec: 2500 },
            },
            twist: Twist2D {
                vx: 0.5,
                vy: -0.25,
                wz: 1.0,
            },
        }
    }

    #[test]
    fn test_delimited_roundtrip() {
        let cmd = sample_command();
        let mut buf = BytesMut::new();
        encode_delimited(&cmd, &mut buf);
        assert_eq!(buf.len(), PREFIX_SIZE + cmd.wire_size() as usize);

        let decoded: Twist2DStamped = decode_delimited(&buf).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn test_prefix_holds_wire_size() {
        let cmd = sample_command();
        let mut buf = BytesMut::new();
        encode_delimited(&cmd, &mut buf);

        let mut offset = 0;
        let prefix: u32 = deserialize_number(&buf, &mut offset).unwrap();
        assert_eq!(prefix, cmd.wire_size());
    }

    #[test]
    fn test_decode_truncated_body() {
        let mut buf = BytesMut::new();
        encode_delimited(&sample_command(), &mut buf);
        let cut = buf.len() - 3;
        let err = decode_delimited::<Twist2DStamped>(&buf[..cut]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn test_decode_empty_input() {
        let err = decode_delimited::<UInt32>(&[]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { needed: 4, .. }));
    }

    #[test]
    fn test_decode_stops_at_declared_extent() {
        // Two messages back to back: decoding the first must not read into
        // the second.
        let mut buf = BytesMut::new();
        encode_delimited(&UInt32 { data: 7 }, &mut buf);
        encode_delimited(&UInt32 { data: 8 }, &mut buf);

        let first: UInt32 = decode_delimited(&buf).unwrap();
        assert_eq!(first.data, 7);

        let second: UInt32 = decode_delimited(&buf[PREFIX_SIZE + 4..]).unwrap();
        assert_eq!(second.data, 8);
    }
}
