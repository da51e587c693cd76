//! Standard message types: plain values, timestamps, per-message metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::{
    deserialize_number, deserialize_string, serialize_number, serialize_string, size_number,
    size_string,
};
use crate::error::Result;
use crate::message::Message;

/// A bare 32-bit unsigned value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UInt32 {
    pub data: u32,
}

impl Message for UInt32 {
    fn wire_size(&self) -> u32 {
        size_number(&self.data)
    }

    fn serialize(&self, dst: &mut [u8], offset: &mut usize) {
        serialize_number(dst, offset, self.data);
    }

    fn deserialize(src: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(Self {
            data: deserialize_number(src, offset)?,
        })
    }
}

/// A wall-clock instant split into whole seconds and nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Time {
    pub sec: u32,
    pub nsec: u32,
}

impl Time {
    /// Current wall-clock time.
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            sec: since_epoch.as_secs() as u32,
            nsec: since_epoch.subsec_nanos(),
        }
    }

    /// Whole microseconds since the epoch.
    pub fn as_micros(&self) -> i64 {
        i64::from(self.sec) * 1_000_000 + i64::from(self.nsec / 1_000)
    }
}

impl Message for Time {
    fn wire_size(&self) -> u32 {
        size_number(&self.sec) + size_number(&self.nsec)
    }

    fn serialize(&self, dst: &mut [u8], offset: &mut usize) {
        serialize_number(dst, offset, self.sec);
        serialize_number(dst, offset, self.nsec);
    }

    fn deserialize(src: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(Self {
            sec: deserialize_number(src, offset)?,
            nsec: deserialize_number(src, offset)?,
        })
    }
}

/// Per-message metadata. Field order is wire order: sequence counter, then
/// the originating frame id, then the timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub seq: u32,
    pub frame_id: String,
    pub stamp: Time,
}

impl Message for Header {
    fn wire_size(&self) -> u32 {
        size_number(&self.seq) + size_string(&self.frame_id) + self.stamp.wire_size()
    }

    fn serialize(&self, dst: &mut [u8], offset: &mut usize) {
        serialize_number(dst, offset, self.seq);
        serialize_string(dst, offset, &self.frame_id);
        self.stamp.serialize(dst, offset);
    }

    fn deserialize(src: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(Self {
            seq: deserialize_number(src, offset)?,
            frame_id: deserialize_string(src, offset)?,
            stamp: Time::deserialize(src, offset)?,
        })
    }
}
