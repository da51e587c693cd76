//! The descriptor and notification interfaces the spin loops are generic
//! over.

use std::io;
use std::time::Duration;

/// A readable/writable descriptor with readiness waits.
///
/// `read` and `write` are verbatim single-syscall passthroughs: no retry on
/// interruption, no looping on short counts, end-of-file is `Ok(0)`. Callers
/// that need a full buffer loop themselves or use [`write_all`](Io::write_all).
pub trait Io {
    fn read(&self, dst: &mut [u8]) -> io::Result<usize>;

    fn write(&self, src: &[u8]) -> io::Result<usize>;

    /// Wait until a read would not block, up to `timeout`. Hangup and error
    /// conditions also count as ready: the next read returns immediately
    /// (with data, `Ok(0)`, or an error). `false` on timeout or when the
    /// descriptor is not open.
    fn wait_readable(&self, timeout: Duration) -> bool;

    /// Wait until a write would not block, up to `timeout`.
    fn wait_writable(&self, timeout: Duration) -> bool;

    /// Write the whole buffer, retrying interrupted and would-block results
    /// and looping over short counts.
    fn write_all(&self, src: &[u8]) -> io::Result<()> {
        let mut written = 0;
        while written < src.len() {
            match self.write(&src[written..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "descriptor accepted no bytes",
                    ));
                }
                Ok(n) => written += n,
                Err(e)
                    if e.kind() == io::ErrorKind::Interrupted
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// A consumable readiness flag, typically backed by a [`crate::Signal`].
///
/// `is_ready` consumes the pending notification: after it returns `true`
/// once, it returns `false` until the event fires again.
pub trait Notification {
    fn is_ready(&self) -> bool;
}
