//! Anonymous pipes with direction-tagged ends.

use std::io;
use std::time::Duration;

use tracing::debug;

use crate::file::File;
use crate::traits::Io;

/// Which side of a pipe an object holds. The tag is immutable and survives
/// cloning; it is metadata only, the kernel enforces the actual direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Read,
    Write,
}

/// One end of an anonymous pipe.
#[derive(Debug)]
pub struct Pipe {
    file: File,
    end: End,
}

impl Pipe {
    /// Create a connected pair, returned as `(read end, write end)`.
    pub fn pair() -> io::Result<(Pipe, Pipe)> {
        let (read, write) = nix::unistd::pipe().map_err(io::Error::from)?;
        debug!("created pipe pair");
        Ok((
            Pipe {
                file: File::from(read),
                end: End::Read,
            },
            Pipe {
                file: File::from(write),
                end: End::Write,
            },
        ))
    }

    pub fn end(&self) -> End {
        self.end
    }

    pub fn is_read_end(&self) -> bool {
        self.end == End::Read
    }

    pub fn is_write_end(&self) -> bool {
        self.end == End::Write
    }

    pub fn is_open(&self) -> bool {
        self.file.is_open()
    }

    /// Raw descriptor value; `-1` if this end has been invalidated.
    pub fn raw_fd(&self) -> std::os::fd::RawFd {
        self.file.raw_fd()
    }

    /// Duplicate this end; the clone keeps the direction tag.
    pub fn try_clone(&self) -> io::Result<Pipe> {
        Ok(Pipe {
            file: self.file.try_clone()?,
            end: self.end,
        })
    }

    pub fn set_nonblocking(&self, enabled: bool) -> io::Result<()> {
        self.file.set_nonblocking(enabled)
    }

    pub fn is_nonblocking(&self) -> bool {
        self.file.is_nonblocking()
    }
}

impl From<Pipe> for File {
    /// Keep the descriptor, discard the direction tag.
    fn from(pipe: Pipe) -> File {
        pipe.file
    }
}

impl Io for Pipe {
    fn read(&self, dst: &mut [u8]) -> io::Result<usize> {
        self.file.read(dst)
    }

    fn write(&self, src: &[u8]) -> io::Result<usize> {
        self.file.write(src)
    }

    fn wait_readable(&self, timeout: Duration) -> bool {
        self.file.wait_readable(timeout)
    }

    fn wait_writable(&self, timeout: Duration) -> bool {
        self.file.wait_writable(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_transfers_bytes() {
        let (rx, tx) = Pipe::pair().unwrap();
        assert_eq!(tx.write(b"ping").unwrap(), 4);
        assert!(rx.wait_readable(Duration::from_secs(1)));

        let mut buf = [0u8; 8];
        let n = rx.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");
    }

    #[test]
    fn test_end_tags() {
        let (rx, tx) = Pipe::pair().unwrap();
        assert!(rx.is_read_end());
        assert!(!rx.is_write_end());
        assert!(tx.is_write_end());
        assert_eq!(rx.end(), End::Read);
        assert_eq!(tx.end(), End::Write);
    }

    #[test]
    fn test_clone_keeps_tag_and_independence() {
        let (rx, tx) = Pipe::pair().unwrap();
        let tx2 = tx.try_clone().unwrap();
        assert!(tx2.is_write_end());
        assert_ne!(tx.raw_fd(), tx2.raw_fd());

        drop(tx);
        assert_eq!(tx2.write(b"x").unwrap(), 1);
        let mut buf = [0u8; 1];
        assert_eq!(rx.read(&mut buf).unwrap(), 1);
    }

    #[test]
    fn test_read_end_sees_eof() {
        let (rx, tx) = Pipe::pair().unwrap();
        drop(tx);
        // A hung-up pipe reports ready so the EOF read does not block.
        assert!(rx.wait_readable(Duration::from_secs(1)));
        let mut buf = [0u8; 4];
        assert_eq!(rx.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_wait_readable_times_out() {
        let (rx, _tx) = Pipe::pair().unwrap();
        assert!(!rx.wait_readable(Duration::from_millis(50)));
    }

    #[test]
    fn test_wait_readable_zero_is_probe() {
        let (rx, tx) = Pipe::pair().unwrap();
        assert!(!rx.wait_readable(Duration::ZERO));
        tx.write(b"!").unwrap();
        assert!(rx.wait_readable(Duration::ZERO));
    }

    #[test]
    fn test_fresh_pipe_is_writable() {
        let (_rx, tx) = Pipe::pair().unwrap();
        assert!(tx.wait_writable(Duration::from_millis(100)));
    }

    #[test]
    fn test_nonblocking_empty_read_would_block() {
        let (rx, _tx) = Pipe::pair().unwrap();
        rx.set_nonblocking(true).unwrap();
        assert!(rx.is_nonblocking());

        let mut buf = [0u8; 4];
        let err = rx.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }
}
