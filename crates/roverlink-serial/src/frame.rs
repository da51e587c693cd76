//! rosserial-compatible packet framing.
//!
//! Every packet carries one payload under a 16-bit topic id:
//!
//! ```text
//! [0xFF] [0xFE] [len lo] [len hi] [cs(len)] [topic lo] [topic hi] [payload...] [cs(topic+payload)]
//! ```
//!
//! Length and topic are little-endian regardless of host order. Each
//! checksum is the modular complement of the bytes it covers, so a receiver
//! can add the covered bytes plus the checksum and compare against 255.

use crate::error::FrameError;

/// First byte of every frame.
pub const SYNC: u8 = 0xFF;
/// Second byte of every frame, the protocol revision.
pub const VERSION: u8 = 0xFE;
/// Bytes before the payload: sync, version, length, length checksum, topic.
pub const HEADER_LEN: usize = 7;
/// Bytes after the payload: the trailing checksum.
pub const FOOTER_LEN: usize = 1;
/// Total framing overhead added to a payload.
pub const OVERHEAD: usize = HEADER_LEN + FOOTER_LEN;
/// Longest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Modular-complement checksum: `255 - (sum of addends mod 256)`.
pub fn checksum(addends: impl IntoIterator<Item = u8>) -> u8 {
    let sum = addends.into_iter().fold(0u8, u8::wrapping_add);
    255 - sum
}

/// Encode `payload` under `topic` into `dst`.
///
/// `dst` must be exactly `payload.len() + OVERHEAD` bytes; any other size is
/// reported without writing a single byte. The caller sizes the buffer from
/// the payload it is about to send, so a mismatch means the two drifted
/// apart and the frame would be corrupt.
pub fn encode_frame(dst: &mut [u8], topic: u16, payload: &[u8]) -> Result<(), FrameError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLong {
            len: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    if dst.len() != payload.len() + OVERHEAD {
        return Err(FrameError::BufferMismatch {
            got: dst.len(),
            payload: payload.len(),
        });
    }

    let [len_lo, len_hi] = (payload.len() as u16).to_le_bytes();
    let [topic_lo, topic_hi] = topic.to_le_bytes();

    dst[0] = SYNC;
    dst[1] = VERSION;
    dst[2] = len_lo;
    dst[3] = len_hi;
    dst[4] = checksum([len_lo, len_hi]);
    dst[5] = topic_lo;
    dst[6] = topic_hi;
    dst[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
    dst[HEADER_LEN + payload.len()] =
        checksum([topic_lo, topic_hi].into_iter().chain(payload.iter().copied()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_reference_value() {
        // A 5-byte length field: 255 - 5 = 0xFA.
        assert_eq!(checksum([0x05, 0x00]), 0xFA);
    }

    #[test]
    fn test_checksum_sums_modulo_256() {
        // 200 + 100 = 300, 300 mod 256 = 44, 255 - 44 = 211.
        assert_eq!(checksum([200, 100]), 211);
        assert_eq!(checksum([0xFF, 0x01]), 255);
    }

    #[test]
    fn test_checksum_of_nothing() {
        assert_eq!(checksum([]), 255);
    }

    #[test]
    fn test_golden_single_byte_frame() {
        let mut dst = [0u8; 9];
        encode_frame(&mut dst, 214, &[0xAA]).unwrap();
        assert_eq!(dst, [0xFF, 0xFE, 0x01, 0x00, 0xFE, 0xD6, 0x00, 0xAA, 0x7F]);
    }

    #[test]
    fn test_empty_payload_frame() {
        let mut dst = [0u8; OVERHEAD];
        encode_frame(&mut dst, 201, &[]).unwrap();
        // 201 = 0xC9; trailing checksum covers only the topic bytes.
        assert_eq!(dst, [0xFF, 0xFE, 0x00, 0x00, 0xFF, 0xC9, 0x00, 0x36]);
    }

    #[test]
    fn test_receiver_sum_closes_to_255() {
        let mut dst = [0u8; 12];
        encode_frame(&mut dst, 214, &[1, 2, 3, 4]).unwrap();
        let len_sum = dst[2..5].iter().fold(0u8, |a, &b| a.wrapping_add(b));
        assert_eq!(len_sum, 255);
        let body_sum = dst[5..].iter().fold(0u8, |a, &b| a.wrapping_add(b));
        assert_eq!(body_sum, 255);
    }

    #[test]
    fn test_undersized_buffer_is_rejected() {
        let mut dst = [0u8; 8];
        let err = encode_frame(&mut dst, 214, &[0xAA]).unwrap_err();
        assert_eq!(err, FrameError::BufferMismatch { got: 8, payload: 1 });
        assert_eq!(dst, [0u8; 8], "a rejected frame must leave dst untouched");
    }

    #[test]
    fn test_oversized_buffer_is_rejected() {
        let mut dst = [0u8; 10];
        let err = encode_frame(&mut dst, 214, &[0xAA]).unwrap_err();
        assert_eq!(err, FrameError::BufferMismatch { got: 10, payload: 1 });
        assert_eq!(dst, [0u8; 10]);
    }

    #[test]
    fn test_payload_longer_than_length_field() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut dst = vec![0u8; payload.len() + OVERHEAD];
        let err = encode_frame(&mut dst, 214, &payload).unwrap_err();
        assert_eq!(
            err,
            FrameError::PayloadTooLong {
                len: MAX_PAYLOAD + 1,
                max: MAX_PAYLOAD
            }
        );
    }

    #[test]
    fn test_max_payload_still_frames() {
        let payload = vec![0x11u8; MAX_PAYLOAD];
        let mut dst = vec![0u8; MAX_PAYLOAD + OVERHEAD];
        encode_frame(&mut dst, 7, &payload).unwrap();
        assert_eq!(dst[2], 0xFF);
        assert_eq!(dst[3], 0xFF);
        assert_eq!(dst[4], checksum([0xFF, 0xFF]));
    }
}
