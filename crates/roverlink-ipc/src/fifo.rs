//! Named FIFOs.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use tracing::debug;

use crate::file::File;
use crate::traits::Io;

/// Which end of a FIFO to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FifoMode {
    ReadOnly,
    WriteOnly,
}

/// A named FIFO bound to a filesystem path.
///
/// Opening creates the FIFO node if absent, then opens the requested end.
/// Per FIFO semantics a blocking open does not return until the opposite
/// end appears; pass `nonblocking` to open immediately (note a non-blocking
/// write-end open fails with `ENXIO` when no reader exists yet).
#[derive(Debug)]
pub struct Fifo {
    file: File,
    path: PathBuf,
    mode: FifoMode,
}

impl Fifo {
    /// Permission bits for FIFO nodes this type creates.
    pub const CREATE_MODE: Mode = Mode::from_bits_truncate(0o666);

    /// Create (if needed) and open the FIFO at `path`. On failure the
    /// returned value is invalid, observable via [`Fifo::is_open`]; path and
    /// mode metadata are kept either way.
    pub fn open(path: impl AsRef<Path>, mode: FifoMode, nonblocking: bool) -> Self {
        let path = path.as_ref().to_path_buf();

        match mkfifo(&path, Self::CREATE_MODE) {
            Ok(()) => debug!(?path, "created fifo node"),
            // An existing node is fine; it is normal for both sides to race
            // through open().
            Err(Errno::EEXIST) => {}
            Err(errno) => debug!(?path, %errno, "mkfifo failed"),
        }

        let mut flags = match mode {
            FifoMode::ReadOnly => OFlag::O_RDONLY,
            FifoMode::WriteOnly => OFlag::O_WRONLY,
        };
        if nonblocking {
            flags |= OFlag::O_NONBLOCK;
        }

        let file = File::open(&path, flags, Mode::empty());
        Self { file, path, mode }
    }

    /// Unlink the FIFO node at `path`.
    pub fn remove(path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> FifoMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.file.is_open()
    }

    pub fn raw_fd(&self) -> std::os::fd::RawFd {
        self.file.raw_fd()
    }

    /// Duplicate the descriptor; path and mode metadata come along.
    pub fn try_clone(&self) -> io::Result<Fifo> {
        Ok(Fifo {
            file: self.file.try_clone()?,
            path: self.path.clone(),
            mode: self.mode,
        })
    }

    pub fn set_nonblocking(&self, enabled: bool) -> io::Result<()> {
        self.file.set_nonblocking(enabled)
    }

    pub fn is_nonblocking(&self) -> bool {
        self.file.is_nonblocking()
    }
}

impl From<Fifo> for File {
    /// Keep the descriptor, discard the path and mode metadata.
    fn from(fifo: Fifo) -> File {
        fifo.file
    }
}

impl Io for Fifo {
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
    use std::path::PathBuf;

    fn fifo_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("roverlink-fifo-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("chan.fifo")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_fifo_roundtrip_nonblocking() {
        let path = fifo_path("rt");

        // Reader first: a non-blocking write-end open needs a reader.
        let reader = Fifo::open(&path, FifoMode::ReadOnly, true);
        assert!(reader.is_open());
        let writer = Fifo::open(&path, FifoMode::WriteOnly, true);
        assert!(writer.is_open());

        assert_eq!(writer.write(b"cmd").unwrap(), 3);
        assert!(reader.wait_readable(Duration::from_secs(1)));
        let mut buf = [0u8; 8];
        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"cmd");

        Fifo::remove(&path).unwrap();
        cleanup(&path);
    }

    #[test]
    fn test_write_end_without_reader_is_invalid() {
        let path = fifo_path("enxio");
        let writer = Fifo::open(&path, FifoMode::WriteOnly, true);
        assert!(!writer.is_open());
        // Metadata is kept even when the open failed.
        assert_eq!(writer.path(), path.as_path());
        assert_eq!(writer.mode(), FifoMode::WriteOnly);
        cleanup(&path);
    }

    #[test]
    fn test_blocking_opens_pair_up() {
        let path = fifo_path("block");
        // The node must exist before the threads race through open().
        mkfifo(&path, Fifo::CREATE_MODE).unwrap();

        let reader_path = path.clone();
        let handle = std::thread::spawn(move || {
            let reader = Fifo::open(&reader_path, FifoMode::ReadOnly, false);
            assert!(reader.is_open());
            let mut buf = [0u8; 5];
            let n = reader.read(&mut buf).unwrap();
            assert_eq!(&buf[..n], b"hello");
        });

        let writer = Fifo::open(&path, FifoMode::WriteOnly, false);
        assert!(writer.is_open());
        writer.write_all(b"hello").unwrap();

        handle.join().unwrap();
        cleanup(&path);
    }

    #[test]
    fn test_metadata_survives_clone() {
        let path = fifo_path("meta");
        let reader = Fifo::open(&path, FifoMode::ReadOnly, true);
        let clone = reader.try_clone().unwrap();
        assert_eq!(clone.path(), reader.path());
        assert_eq!(clone.mode(), FifoMode::ReadOnly);
        assert_ne!(clone.raw_fd(), reader.raw_fd());
        cleanup(&path);
    }
}
