//! Owned POSIX descriptors.
//!
//! [`File`] wraps a descriptor with the ownership model the rest of the
//! stack builds on: the open state is a present `OwnedFd`, the
//! closed/invalid state is its absence. Construction from a path never
//! panics and never throws; failure leaves the value invalid, observable
//! through [`File::is_open`]. Reads and writes are verbatim single-syscall
//! passthroughs.

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::path::Path;
use std::time::Duration;

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::stat::Mode;
use tracing::debug;

use crate::traits::Io;

/// An owned POSIX descriptor, possibly invalid.
///
/// Dropping a `File` closes the descriptor iff one is present. There is no
/// implicit duplication: [`File::try_clone`] is the explicit `dup(2)`.
#[derive(Debug, Default)]
pub struct File {
    fd: Option<OwnedFd>,
}

impl File {
    /// An invalid file: no descriptor, every operation reports accordingly.
    pub fn new() -> Self {
        Self { fd: None }
    }

    /// Open `path`; on failure the returned file is invalid and the cause is
    /// logged at debug level.
    pub fn open(path: impl AsRef<Path>, flags: OFlag, mode: Mode) -> Self {
        let path = path.as_ref();
        match nix::fcntl::open(path, flags, mode) {
            Ok(fd) => {
                debug!(?path, fd = fd.as_raw_fd(), "opened descriptor");
                Self { fd: Some(fd) }
            }
            Err(errno) => {
                debug!(?path, %errno, "open failed");
                Self::new()
            }
        }
    }

    /// Unlink `path`.
    pub fn remove(path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    /// Whether a descriptor is present.
    pub fn is_open(&self) -> bool {
        self.fd.is_some()
    }

    /// Borrow the descriptor, or `None` if the file is invalid.
    pub fn as_fd(&self) -> Option<BorrowedFd<'_>> {
        self.fd.as_ref().map(|fd| fd.as_fd())
    }

    /// Raw descriptor value; `-1` if the file is invalid.
    pub fn raw_fd(&self) -> RawFd {
        self.fd.as_ref().map_or(-1, |fd| fd.as_raw_fd())
    }

    /// Duplicate the descriptor (`dup(2)`). The clone and the original are
    /// independently owned; closing one leaves the other usable. Cloning an
    /// invalid file yields another invalid file.
    pub fn try_clone(&self) -> io::Result<Self> {
        match &self.fd {
            Some(fd) => Ok(Self {
                fd: Some(fd.try_clone()?),
            }),
            None => Ok(Self::new()),
        }
    }

    /// Read once. EOF is `Ok(0)`; interruptions and short counts are the
    /// caller's to handle.
    pub fn read(&self, dst: &mut [u8]) -> io::Result<usize> {
        let fd = self.require()?;
        nix::unistd::read(fd, dst).map_err(io::Error::from)
    }

    /// Write once. May write fewer bytes than given.
    pub fn write(&self, src: &[u8]) -> io::Result<usize> {
        let fd = self.require()?;
        nix::unistd::write(fd, src).map_err(io::Error::from)
    }

    /// Set or clear `O_NONBLOCK`.
    pub fn set_nonblocking(&self, enabled: bool) -> io::Result<()> {
        let fd = self.require()?;
        let bits = fcntl(fd, FcntlArg::F_GETFL).map_err(io::Error::from)?;
        let mut flags = OFlag::from_bits_retain(bits);
        flags.set(OFlag::O_NONBLOCK, enabled);
        fcntl(fd, FcntlArg::F_SETFL(flags)).map_err(io::Error::from)?;
        Ok(())
    }

    /// Whether `O_NONBLOCK` is set; `false` if the file is invalid or the
    /// query fails.
    pub fn is_nonblocking(&self) -> bool {
        let Some(fd) = self.as_fd() else {
            return false;
        };
        match fcntl(fd, FcntlArg::F_GETFL) {
            Ok(bits) => OFlag::from_bits_retain(bits).contains(OFlag::O_NONBLOCK),
            Err(_) => false,
        }
    }

    /// Wait until a read would not block; see [`Io::wait_readable`].
    pub fn wait_readable(&self, timeout: Duration) -> bool {
        self.wait_for(PollFlags::POLLIN, timeout)
    }

    /// Wait until a write would not block.
    pub fn wait_writable(&self, timeout: Duration) -> bool {
        self.wait_for(PollFlags::POLLOUT, timeout)
    }

    fn require(&self) -> io::Result<BorrowedFd<'_>> {
        self.as_fd()
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EBADF))
    }

    /// `poll(2)` for `events`, also accepting hangup/error as ready so a
    /// closed peer surfaces instead of blocking until timeout. Timeouts have
    /// millisecond resolution; waits longer than one poll slot run in a
    /// loop, so arbitrary durations (including effectively-infinite ones)
    /// are honored.
    fn wait_for(&self, events: PollFlags, timeout: Duration) -> bool {
        let Some(fd) = self.as_fd() else {
            return false;
        };
        let ready = events | PollFlags::POLLHUP | PollFlags::POLLERR;
        let mut remaining = timeout;
        loop {
            let chunk_ms = remaining.as_millis().min(u128::from(u16::MAX)) as u16;
            let mut fds = [PollFd::new(fd, events)];
            match poll(&mut fds, PollTimeout::from(chunk_ms)) {
                Ok(0) => {
                    remaining = remaining.saturating_sub(Duration::from_millis(u64::from(chunk_ms)));
                    // Sub-millisecond residue polls as zero; it has had its
                    // chance, count it as elapsed.
                    if remaining < Duration::from_millis(1) {
                        return false;
                    }
                }
                Ok(_) => return fds[0].revents().is_some_and(|r| r.intersects(ready)),
                Err(_) => return false,
            }
        }
    }
}

impl From<OwnedFd> for File {
    /// Adopt an already-open descriptor.
    fn from(fd: OwnedFd) -> Self {
        debug!(fd = fd.as_raw_fd(), "adopted descriptor");
        Self { fd: Some(fd) }
    }
}

impl FromRawFd for File {
    unsafe fn from_raw_fd(fd: RawFd) -> Self {
        Self {
            fd: Some(OwnedFd::from_raw_fd(fd)),
        }
    }
}

impl Io for File {
    fn read(&self, dst: &mut [u8]) -> io::Result<usize> {
        File::read(self, dst)
    }

    fn write(&self, src: &[u8]) -> io::Result<usize> {
        File::write(self, src)
    }

    fn wait_readable(&self, timeout: Duration) -> bool {
        File::wait_readable(self, timeout)
    }

    fn wait_writable(&self, timeout: Duration) -> bool {
        File::wait_writable(self, timeout)
    }
}
