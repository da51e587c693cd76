use crate::error::Result;

/// A self-describing wire message.
///
/// Implementations write their fields in declaration order using the codec
/// functions in [`crate::codec`], so a message's wire image is fully
/// determined by its field types.
pub trait Message: Sized {
    /// Exact number of bytes [`serialize`](Self::serialize) will write.
    fn wire_size(&self) -> u32;

    /// Write this message into `dst` starting at `*offset`, advancing the
    /// offset past the bytes written.
    ///
    /// Serialization does not check capacity: `dst` must have at least
    /// [`wire_size`](Self::wire_size) bytes available at `*offset`, otherwise
    /// the slice write panics. Callers size the buffer from `wire_size`
    /// before serializing.
    fn serialize(&self, dst: &mut [u8], offset: &mut usize);

    /// Read a message from `src` starting at `*offset`.
    ///
    /// Every read is bounds-checked against `src.len()`. On success the
    /// offset has advanced exactly past the bytes consumed; on failure the
    /// offset is left wherever the last successful read put it and no value
    /// is produced.
    fn deserialize(src: &[u8], offset: &mut usize) -> Result<Self>;
}
