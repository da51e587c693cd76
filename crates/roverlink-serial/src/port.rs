//! Serial device configuration.

use std::os::fd::AsFd;
use std::path::Path;

use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::sys::termios::{
    self, BaudRate, ControlFlags, FlushArg, SetArg, SpecialCharacterIndices,
};
use tracing::debug;

use roverlink_ipc::File;

use crate::error::{LinkError, Result};

/// Open and configure `path` as a raw 115200 8N1 serial port.
///
/// Reads are non-canonical with a tenth-of-a-second timeout and no minimum
/// byte count, so a read returns whatever arrived in that window, possibly
/// nothing. Pending input is flushed before the new attributes take effect.
pub fn open_port(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    let fd = nix::fcntl::open(
        path,
        OFlag::O_RDWR | OFlag::O_NOCTTY | OFlag::O_NDELAY,
        Mode::empty(),
    )
    .map_err(|errno| LinkError::Open {
        path: path.to_path_buf(),
        source: errno.into(),
    })?;

    configure_raw(&fd).map_err(|errno| LinkError::Config(errno.into()))?;
    debug!(?path, "serial port configured, 115200 8N1 raw");
    Ok(File::from(fd))
}

fn configure_raw<F: AsFd>(fd: &F) -> nix::Result<()> {
    let mut tio = termios::tcgetattr(fd)?;
    termios::cfmakeraw(&mut tio);
    termios::cfsetspeed(&mut tio, BaudRate::B115200)?;

    // One stop bit, no hardware flow control, receiver on, modem-control
    // lines ignored. cfmakeraw already selected eight data bits, no parity.
    tio.control_flags &= !(ControlFlags::CSTOPB | ControlFlags::CRTSCTS);
    tio.control_flags |= ControlFlags::CREAD | ControlFlags::CLOCAL;

    // cfmakeraw resets VMIN and VTIME, so these are set after it.
    tio.control_chars[SpecialCharacterIndices::VTIME as usize] = 1;
    tio.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;

    termios::tcflush(fd, FlushArg::TCIFLUSH)?;
    termios::tcsetattr(fd, SetArg::TCSANOW, &tio)?;
    // Read the attributes back so a device that silently ignored the
    // configuration shows up as an error here instead of as garbage frames.
    termios::tcgetattr(fd)?;
    Ok(())
}
