//! Teleoperation primitives for serial-linked rovers.
//!
//! roverlink moves planar velocity commands from a human (or any process)
//! to a rover over a serial line, with cooperative shutdown on signals.
//!
//! # Crate Structure
//!
//! - [`msg`] — Self-describing binary message codec and the command types
//! - [`ipc`] — Descriptor resources: files, pipes, FIFOs, signal watching
//! - [`serial`] — Checksummed serial framing and the actuator link
//! - [`driver`] — The spin loop pumping delimited commands into an actuator
//! - [`teleop`] — The spin loop turning key presses into delimited commands

use std::time::Duration;

/// Re-export message codec types.
pub mod msg {
    pub use roverlink_msg::*;
}

/// Re-export descriptor and signal types.
pub mod ipc {
    pub use roverlink_ipc::*;
}

/// Re-export framing and actuator link types.
pub mod serial {
    pub use roverlink_serial::*;
}

pub mod driver;
pub mod teleop;

pub use driver::{Driver, MAX_MESSAGE_SIZE};
pub use teleop::{velocity_for_key, Teleop, DEFAULT_FRAME_ID};

/// How long a spin loop blocks on its input before re-checking
/// cancellation. Bounds shutdown latency from either direction.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
