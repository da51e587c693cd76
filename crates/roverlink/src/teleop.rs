//! The teleop loop: key presses in, delimited velocity commands out.

use std::io;

use bytes::BytesMut;
use tracing::{debug, warn};

use roverlink_ipc::{Io, Notification};
use roverlink_msg::{encode_delimited, Header, Time, Twist2D, Twist2DStamped};

use crate::POLL_INTERVAL;

/// Frame id stamped on outgoing commands unless overridden.
pub const DEFAULT_FRAME_ID: &str = "rover";

/// Map a key byte to `(vx, vy, wz)`.
///
/// Case-insensitive: `w`/`s` drive forward and back, `a`/`d` strafe left
/// and right, `q`/`e` spin counter- and clockwise, space is an explicit
/// all-stop. Unbound keys return `None`.
pub fn velocity_for_key(key: u8, linear: f64, angular: f64) -> Option<(f64, f64, f64)> {
    match key.to_ascii_lowercase() {
        b'w' => Some((linear, 0.0, 0.0)),
        b's' => Some((-linear, 0.0, 0.0)),
        b'a' => Some((0.0, linear, 0.0)),
        b'd' => Some((0.0, -linear, 0.0)),
        b'q' => Some((0.0, 0.0, angular)),
        b'e' => Some((0.0, 0.0, -angular)),
        b' ' => Some((0.0, 0.0, 0.0)),
        _ => None,
    }
}

/// Turns key presses read from one descriptor into length-delimited
/// [`Twist2DStamped`] commands written to another.
///
/// Speeds are configured as f64 and truncated to the f32 wire fields when
/// a command is built. The sequence counter covers every emitted command,
/// the final stop included.
pub struct Teleop<I, O> {
    input: I,
    output: O,
    linear_speed: f64,
    angular_speed: f64,
    frame_id: String,
    seq: u32,
    buf: BytesMut,
}

impl<I: Io, O: Io> Teleop<I, O> {
    pub fn new(input: I, output: O, linear_speed: f64, angular_speed: f64) -> Self {
        Self {
            input,
            output,
            linear_speed,
            angular_speed,
            frame_id: DEFAULT_FRAME_ID.to_owned(),
            seq: 0,
            buf: BytesMut::new(),
        }
    }

    /// Replace the frame id stamped on outgoing commands.
    pub fn with_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = frame_id.into();
        self
    }

    /// Run until `cancel` fires or the input reaches end of file.
    ///
    /// Both exits emit one zero-velocity command so the reader downstream
    /// sees an explicit stop, mirroring the driver loop on the other side
    /// of the pipe.
    pub fn spin(&mut self, cancel: &impl Notification) -> io::Result<()> {
        loop {
            if cancel.is_ready() {
                debug!("cancellation observed, sending stop");
                return self.emit(0.0, 0.0, 0.0);
            }
            if !self.input.wait_readable(POLL_INTERVAL) {
                continue;
            }

            let mut key = [0u8; 1];
            match self.input.read(&mut key) {
                Ok(0) => {
                    debug!("input closed, sending stop");
                    return self.emit(0.0, 0.0, 0.0);
                }
                Ok(_) => {}
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                    ) =>
                {
                    continue
                }
                Err(error) => return Err(error),
            }

            match velocity_for_key(key[0], self.linear_speed, self.angular_speed) {
                Some((vx, vy, wz)) => self.emit(vx, vy, wz)?,
                None => continue,
            }
        }
    }

    fn emit(&mut self, vx: f64, vy: f64, wz: f64) -> io::Result<()> {
        let cmd = Twist2DStamped {
            header: Header {
                seq: self.seq,
                frame_id: self.frame_id.clone(),
                stamp: Time::now(),
            },
            twist: Twist2D {
                vx: vx as f32,
                vy: vy as f32,
                wz: wz as f32,
            },
        };
        self.seq = self.seq.wrapping_add(1);

        self.buf.clear();
        encode_delimited(&cmd, &mut self.buf);
        if let Err(error) = self.output.write_all(&self.buf) {
            warn!(%error, "command write failed");
            return Err(error);
        }
        Ok(())
    }
}
