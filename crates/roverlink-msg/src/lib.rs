//! Self-describing binary message codec for rover command streams.
//!
//! A message's wire image is its fields serialized back to back in
//! declaration order:
//! - fixed-width numbers as native-byte-order raw copies
//! - strings as a u32 byte count plus UTF-8 bytes
//! - nested messages inline, with no extra framing
//! - fixed arrays element by element (the count is static), vectors with a
//!   u32 count prefix
//!
//! Serialization trusts the caller to size the buffer (`wire_size` says
//! exactly how); deserialization trusts nothing and bounds-checks every
//! read.

pub mod codec;
pub mod error;
pub mod geometry;
pub mod message;
pub mod standard;
pub mod stream;

pub use error::{Result, WireError};
pub use geometry::{Twist2D, Twist2DStamped};
pub use message::Message;
pub use standard::{Header, Time, UInt32};
pub use stream::{decode_delimited, encode_delimited, PREFIX_SIZE};
