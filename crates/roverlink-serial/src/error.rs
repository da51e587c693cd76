use std::io;
use std::path::PathBuf;

/// Errors raised while building a frame.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The destination buffer does not match the frame size exactly.
    #[error("frame buffer is {got} bytes, but a {payload}-byte payload frames to {payload} + 8")]
    BufferMismatch { got: usize, payload: usize },

    /// The payload does not fit the 16-bit length field.
    #[error("payload is {len} bytes, frames carry at most {max}")]
    PayloadTooLong { len: usize, max: usize },
}

/// Errors raised by the actuator link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The serial device could not be opened.
    #[error("failed to open serial device {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    /// The serial device refused the 115200 8N1 raw configuration.
    #[error("serial port configuration failed: {0}")]
    Config(#[source] io::Error),

    /// A frame could not be built.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Writing to the descriptor failed.
    #[error("link write failed: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;
