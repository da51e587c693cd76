//! The driver loop: delimited velocity commands in, actuator out.

use std::io;

use tracing::{debug, warn};

use roverlink_ipc::{Io, Notification};
use roverlink_msg::{Message, Twist2DStamped, PREFIX_SIZE};
use roverlink_serial::Actuator;

use crate::POLL_INTERVAL;

/// Largest message body the driver will read, in bytes. A length prefix
/// above this is treated as stream garbage, not an allocation request.
pub const MAX_MESSAGE_SIZE: usize = 4096;

/// Pumps length-delimited [`Twist2DStamped`] commands from a descriptor
/// into an actuator until cancelled or the input closes.
pub struct Driver<I, A> {
    input: I,
    actuator: A,
    body: Vec<u8>,
}

impl<I: Io, A: Actuator> Driver<I, A> {
    pub fn new(input: I, actuator: A) -> Self {
        Self {
            input,
            actuator,
            body: Vec::new(),
        }
    }

    /// Run until `cancel` fires or the input reaches end of file.
    ///
    /// Every exit path sends one zero-velocity command first, so the rover
    /// never keeps its last commanded speed after the commander goes away.
    /// Malformed input is skipped; an input read error stops the loop and
    /// propagates after the stop command goes out.
    pub fn spin(&mut self, cancel: &impl Notification) -> io::Result<()> {
        loop {
            if cancel.is_ready() {
                debug!("cancellation observed, stopping");
                self.stop();
                return Ok(());
            }
            if !self.input.wait_readable(POLL_INTERVAL) {
                continue;
            }

            let mut prefix = [0u8; PREFIX_SIZE];
            let declared = match self.input.read(&mut prefix) {
                Ok(0) => {
                    debug!("input closed, stopping");
                    self.stop();
                    return Ok(());
                }
                Ok(PREFIX_SIZE) => u32::from_ne_bytes(prefix) as usize,
                Ok(got) => {
                    warn!(got, "short length prefix, skipping");
                    continue;
                }
                Err(error) if is_transient(&error) => continue,
                Err(error) => {
                    warn!(%error, "input read failed, stopping");
                    self.stop();
                    return Err(error);
                }
            };

            if declared == 0 || declared > MAX_MESSAGE_SIZE {
                warn!(declared, "implausible message size, skipping");
                continue;
            }

            self.body.resize(declared, 0);
            match self.input.read(&mut self.body[..]) {
                Ok(0) => {
                    debug!("input closed mid-message, stopping");
                    self.stop();
                    return Ok(());
                }
                Ok(got) if got == declared => {}
                Ok(got) => {
                    // A writer that delivers commands in single writes never
                    // splits one; a split stream is already corrupt.
                    warn!(got, declared, "short message body, skipping");
                    continue;
                }
                Err(error) if is_transient(&error) => continue,
                Err(error) => {
                    warn!(%error, "input read failed, stopping");
                    self.stop();
                    return Err(error);
                }
            }

            let mut offset = 0;
            let cmd = match Twist2DStamped::deserialize(&self.body, &mut offset) {
                Ok(cmd) => cmd,
                Err(error) => {
                    warn!(%error, "undecodable command, skipping");
                    continue;
                }
            };
            if let Err(error) = self.actuator.drive(&cmd) {
                warn!(%error, "drive failed");
            }
        }
    }

    fn stop(&mut self) {
        if let Err(error) = self.actuator.drive(&Twist2DStamped::default()) {
            warn!(%error, "failed to send stop command");
        }
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}
