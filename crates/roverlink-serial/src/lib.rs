//! Checksummed serial framing and the rover's actuator link.
//!
//! [`frame`] implements the rosserial packet layout: sync and version
//! bytes, a checksummed little-endian length, a topic id, the payload, and
//! a trailing checksum. Encoding is strict about buffer sizes and this
//! crate only ever produces frames; the rover firmware is the decoder.
//!
//! [`link`] drives a serial device (or any descriptor, for dry runs)
//! through that framing: velocity commands under topic 214, host clock
//! broadcasts under topic 201.

pub mod error;
pub mod frame;
pub mod link;
pub mod port;

pub use error::{FrameError, LinkError, Result};
pub use frame::{
    checksum, encode_frame, FOOTER_LEN, HEADER_LEN, MAX_PAYLOAD, OVERHEAD, SYNC, VERSION,
};
pub use link::{
    Actuator, DriveCommand, SerialLink, TimeSync, TIME_SYNC_PERIOD, TOPIC_DRIVE_COMMAND,
    TOPIC_TIME_SYNC,
};
pub use port::open_port;
