//! Field-level wire codec.
//!
//! Every message field falls into one of three categories — fixed-width
//! number, length-prefixed string, or nested message — each of which may
//! also appear as a fixed array (no prefix, the length is static) or a
//! count-prefixed vector. For each combination there is a `size_*`,
//! `serialize_*`, and `deserialize_*` function; message types chain these
//! in field declaration order.
//!
//! Numbers travel in native byte order as raw copies. Producer and consumer
//! share the platform, so no conversion is performed; this is a documented
//! property of the wire format, shared with the device firmware.
//!
//! Serialization never checks capacity (the caller sizes the buffer from
//! `size_*` first); deserialization is the safety boundary and checks every
//! read against the buffer length.

use crate::error::{Result, WireError};
use crate::message::Message;

/// Byte width of string and vector count prefixes.
const COUNT_SIZE: usize = 4;

mod private {
    pub trait Sealed {}
}

/// A fixed-width number copied to the wire in native byte order.
///
/// Implemented for `u8 i8 u16 i16 u32 i32 u64 i64 f32 f64`; not
/// implementable outside this crate.
pub trait Scalar: Copy + Default + private::Sealed {
    /// Wire size in bytes.
    const SIZE: usize;

    #[doc(hidden)]
    fn put(self, dst: &mut [u8]);

    #[doc(hidden)]
    fn get(src: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl Scalar for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn put(self, dst: &mut [u8]) {
                    dst[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
                }

                fn get(src: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(&src[..Self::SIZE]);
                    Self::from_ne_bytes(bytes)
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

fn ensure_remaining(src: &[u8], offset: usize, needed: usize) -> Result<()> {
    let available = src.len().saturating_sub(offset);
    if needed > available {
        return Err(WireError::Truncated {
            offset,
            needed,
            available,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Numbers

pub fn size_number<T: Scalar>(_value: &T) -> u32 {
    T::SIZE as u32
}

pub fn serialize_number<T: Scalar>(dst: &mut [u8], offset: &mut usize, value: T) {
    value.put(&mut dst[*offset..]);
    *offset += T::SIZE;
}

pub fn deserialize_number<T: Scalar>(src: &[u8], offset: &mut usize) -> Result<T> {
    ensure_remaining(src, *offset, T::SIZE)?;
    let value = T::get(&src[*offset..]);
    *offset += T::SIZE;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Strings: u32 byte count, then that many bytes of UTF-8.

pub fn size_string(value: &str) -> u32 {
    (COUNT_SIZE + value.len()) as u32
}

pub fn serialize_string(dst: &mut [u8], offset: &mut usize, value: &str) {
    serialize_number(dst, offset, value.len() as u32);
    let bytes = value.as_bytes();
    dst[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    *offset += bytes.len();
}

pub fn deserialize_string(src: &[u8], offset: &mut usize) -> Result<String> {
    let len = deserialize_number::<u32>(src, offset)? as usize;
    ensure_remaining(src, *offset, len)?;
    let start = *offset;
    let text = std::str::from_utf8(&src[start..start + len])
        .map_err(|_| WireError::InvalidUtf8 { offset: start })?;
    *offset += len;
    Ok(text.to_owned())
}

// ---------------------------------------------------------------------------
// Nested messages: the message's own layout, no extra framing.

pub fn size_message<M: Message>(value: &M) -> u32 {
    value.wire_size()
}

pub fn serialize_message<M: Message>(dst: &mut [u8], offset: &mut usize, value: &M) {
    value.serialize(dst, offset);
}

pub fn deserialize_message<M: Message>(src: &[u8], offset: &mut usize) -> Result<M> {
    M::deserialize(src, offset)
}

// ---------------------------------------------------------------------------
// Fixed arrays: elements back to back, no prefix. The element count is part
// of the message type, not the wire data.

pub fn size_number_array<T: Scalar, const N: usize>(_value: &[T; N]) -> u32 {
    (N * T::SIZE) as u32
}

pub fn serialize_number_array<T: Scalar, const N: usize>(
    dst: &mut [u8],
    offset: &mut usize,
    value: &[T; N],
) {
    for element in value {
        serialize_number(dst, offset, *element);
    }
}

pub fn deserialize_number_array<T: Scalar, const N: usize>(
    src: &[u8],
    offset: &mut usize,
) -> Result<[T; N]> {
    ensure_remaining(src, *offset, N * T::SIZE)?;
    let mut out = [T::default(); N];
    for element in &mut out {
        *element = deserialize_number(src, offset)?;
    }
    Ok(out)
}

pub fn size_string_array<const N: usize>(value: &[String; N]) -> u32 {
    value.iter().map(|s| size_string(s)).sum()
}

pub fn serialize_string_array<const N: usize>(
    dst: &mut [u8],
    offset: &mut usize,
    value: &[String; N],
) {
    for element in value {
        serialize_string(dst, offset, element);
    }
}

pub fn deserialize_string_array<const N: usize>(
    src: &[u8],
    offset: &mut usize,
) -> Result<[String; N]> {
    let mut out: [String; N] = std::array::from_fn(|_| String::new());
    for element in &mut out {
        *element = deserialize_string(src, offset)?;
    }
    Ok(out)
}

pub fn size_message_array<M: Message, const N: usize>(value: &[M; N]) -> u32 {
    value.iter().map(M::wire_size).sum()
}

pub fn serialize_message_array<M: Message, const N: usize>(
    dst: &mut [u8],
    offset: &mut usize,
    value: &[M; N],
) {
    for element in value {
        element.serialize(dst, offset);
    }
}

pub fn deserialize_message_array<M: Message + Default, const N: usize>(
    src: &[u8],
    offset: &mut usize,
) -> Result<[M; N]> {
    let mut out: [M; N] = std::array::from_fn(|_| M::default());
    for element in &mut out {
        *element = M::deserialize(src, offset)?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Vectors: u32 element count, then the elements.

pub fn size_number_vector<T: Scalar>(value: &[T]) -> u32 {
    (COUNT_SIZE + value.len() * T::SIZE) as u32
}

pub fn serialize_number_vector<T: Scalar>(dst: &mut [u8], offset: &mut usize, value: &[T]) {
    serialize_number(dst, offset, value.len() as u32);
    for element in value {
        serialize_number(dst, offset, *element);
    }
}

pub fn deserialize_number_vector<T: Scalar>(src: &[u8], offset: &mut usize) -> Result<Vec<T>> {
    let count = deserialize_number::<u32>(src, offset)? as usize;
    // Bounds-check the whole run before allocating, so a hostile count
    // prefix cannot reserve unbounded memory.
    let needed = count.checked_mul(T::SIZE).unwrap_or(usize::MAX);
    ensure_remaining(src, *offset, needed)?;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(deserialize_number(src, offset)?);
    }
    Ok(out)
}

pub fn size_string_vector(value: &[String]) -> u32 {
    COUNT_SIZE as u32 + value.iter().map(|s| size_string(s)).sum::<u32>()
}

pub fn serialize_string_vector(dst: &mut [u8], offset: &mut usize, value: &[String]) {
    serialize_number(dst, offset, value.len() as u32);
    for element in value {
        serialize_string(dst, offset, element);
    }
}

pub fn deserialize_string_vector(src: &[u8], offset: &mut usize) -> Result<Vec<String>> {
    let count = deserialize_number::<u32>(src, offset)? as usize;
    // Element sizes are not known up front; capacity grows only with
    // elements that actually decoded.
    let mut out = Vec::new();
    for _ in 0..count {
        out.push(deserialize_string(src, offset)?);
    }
    Ok(out)
}

pub fn size_message_vector<M: Message>(value: &[M]) -> u32 {
    COUNT_SIZE as u32 + value.iter().map(M::wire_size).sum::<u32>()
}

pub fn serialize_message_vector<M: Message>(dst: &mut [u8], offset: &mut usize, value: &[M]) {
    serialize_number(dst, offset, value.len() as u32);
    for element in value {
        element.serialize(dst, offset);
    }
}

pub fn deserialize_message_vector<M: Message>(src: &[u8], offset: &mut usize) -> Result<Vec<M>> {
    let count = deserialize_number::<u32>(src, offset)? as usize;
    let mut out = Vec::new();
    for _ in 0..count {
        out.push(M::deserialize(src, offset)?);
    }
    Ok(out)
}
