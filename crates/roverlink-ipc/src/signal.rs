//! Pollable signal notification via the self-pipe technique.
//!
//! A [`Signal`] owns a pipe pair and installs a handler for one signal
//! number. The handler writes a single byte to the pipe's write end; user
//! code waits on the read end like any other descriptor and consumes one
//! byte per delivery. This turns asynchronous signal delivery into ordinary
//! readiness, so spin loops can observe SIGINT with the same `poll` they
//! use for data.
//!
//! A process-wide table holds one slot per signal number 1..=32. The table
//! stores only what the handler may touch: an armed flag and the raw
//! write-end descriptor, both atomics. Everything else (the pipe ends, the
//! registration itself) lives in the `Signal` value and moves with it.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use nix::sys::signal::{self, SigHandler, Signal as SigNum};
use nix::unistd::Pid;
use tracing::debug;

use crate::error::{IpcError, Result};
use crate::pipe::Pipe;
use crate::traits::{Io, Notification};

const SLOT_COUNT: usize = 32;

struct Slot {
    armed: AtomicBool,
    write_fd: AtomicI32,
}

static SLOTS: [Slot; SLOT_COUNT] = [const {
    Slot {
        armed: AtomicBool::new(false),
        write_fd: AtomicI32::new(-1),
    }
}; SLOT_COUNT];

/// The installed handler for every registered number. Restricted to
/// async-signal-safe operations: two atomic loads and one `write(2)`.
extern "C" fn deliver(signum: libc::c_int) {
    let index = signum - 1;
    if !(0..SLOT_COUNT as libc::c_int).contains(&index) {
        return;
    }
    let slot = &SLOTS[index as usize];
    if !slot.armed.load(Ordering::Acquire) {
        return;
    }
    let fd = slot.write_fd.load(Ordering::Acquire);
    if fd < 0 {
        return;
    }
    let byte: u8 = 1;
    // SAFETY: write(2) is async-signal-safe; the descriptor was published
    // before the handler was installed and the write end stays open until
    // the slot is disarmed. The result is deliberately ignored: a full pipe
    // already holds a pending notification, and there is no way to report
    // errors from here.
    let _ = unsafe { libc::write(fd, (&byte as *const u8).cast::<libc::c_void>(), 1) };
}

/// A registered signal notifier.
///
/// At most one live `Signal` may exist per signal number; constructing a
/// second one fails with [`IpcError::SignalInUse`] until the first is
/// dropped. Dropping restores the default disposition and frees the number.
/// Moving the value moves the registration with it.
#[derive(Debug)]
pub struct Signal {
    signum: i32,
    sig: SigNum,
    read_end: Pipe,
    write_end: Pipe,
}

impl Signal {
    /// Register a notifier for `signum` (1..=32).
    ///
    /// Concurrent registration of the same number from two threads is a
    /// caller error; sequential duplicates are reliably detected.
    pub fn new(signum: i32) -> Result<Self> {
        if !(1..=SLOT_COUNT as i32).contains(&signum) {
            return Err(IpcError::InvalidSignal(signum));
        }
        // Numbers the OS reserves (32 and 33 under glibc) fail here rather
        // than silently installing nothing.
        let sig = SigNum::try_from(signum).map_err(|_| IpcError::InvalidSignal(signum))?;

        let (read_end, write_end) = Pipe::pair()?;
        // Non-blocking on both ends: a delivery storm must not block the
        // handler once the pipe fills, and a racing second waiter must get
        // `false` instead of hanging on the read.
        read_end.set_nonblocking(true)?;
        write_end.set_nonblocking(true)?;

        let slot = &SLOTS[(signum - 1) as usize];
        if slot
            .armed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(IpcError::SignalInUse(signum));
        }
        slot.write_fd.store(write_end.raw_fd(), Ordering::Release);

        // The handler only runs once installed, and by then the descriptor
        // is published.
        // SAFETY: `deliver` restricts itself to async-signal-safe work.
        let installed = unsafe { signal::signal(sig, SigHandler::Handler(deliver)) };
        if let Err(errno) = installed {
            slot.write_fd.store(-1, Ordering::Release);
            slot.armed.store(false, Ordering::Release);
            debug!(signum, %errno, "handler install failed");
            return Err(IpcError::InvalidSignal(signum));
        }

        debug!(signum, "registered signal notifier");
        Ok(Self {
            signum,
            sig,
            read_end,
            write_end,
        })
    }

    /// The registered signal number.
    pub fn signum(&self) -> i32 {
        self.signum
    }

    /// Wait up to `timeout` for a delivery and consume it. Each handler run
    /// queues one byte; each successful `wait` consumes exactly one.
    pub fn wait(&self, timeout: Duration) -> bool {
        if !self.read_end.wait_readable(timeout) {
            return false;
        }
        let mut byte = [0u8; 1];
        matches!(self.read_end.read(&mut byte), Ok(1))
    }

    /// Non-blocking check, equivalent to `wait(Duration::ZERO)`. Consumes
    /// the pending notification when one exists.
    pub fn is_ready(&self) -> bool {
        self.wait(Duration::ZERO)
    }

    /// Deliver this signal to the current process. `false` if the OS call
    /// fails.
    pub fn raise(&self) -> bool {
        signal::raise(self.sig).is_ok()
    }

    /// Deliver this signal to `pid`. `false` if the OS call fails.
    pub fn kill(&self, pid: i32) -> bool {
        signal::kill(Pid::from_raw(pid), self.sig).is_ok()
    }
}

impl Drop for Signal {
    fn drop(&mut self) {
        // SAFETY: restoring the default disposition uninstalls `deliver`
        // for this number.
        let _ = unsafe { signal::signal(self.sig, SigHandler::SigDfl) };
        let slot = &SLOTS[(self.signum - 1) as usize];
        slot.write_fd.store(-1, Ordering::Release);
        slot.armed.store(false, Ordering::Release);
        debug!(signum = self.signum, "released signal notifier");
        // The pipe ends close when the fields drop, after the slot is free.
    }
}

impl Notification for Signal {
    fn is_ready(&self) -> bool {
        Signal::is_ready(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns a distinct signal number; tests in one binary share
    // the process-wide table.

    #[test]
    fn test_lifecycle_raise_wait_consume() {
        let sig = Signal::new(libc::SIGUSR1).unwrap();
        assert_eq!(sig.signum(), libc::SIGUSR1);
        assert!(!sig.is_ready());

        assert!(sig.raise());
        assert!(sig.wait(Duration::from_secs(1)));
        // The byte was consumed; nothing is pending now.
        assert!(!sig.wait(Duration::ZERO));
    }

    #[test]
    fn test_each_delivery_queues_one_notification() {
        let sig = Signal::new(libc::SIGCONT).unwrap();
        assert!(sig.raise());
        assert!(sig.raise());
        assert!(sig.wait(Duration::from_secs(1)));
        assert!(sig.wait(Duration::ZERO));
        assert!(!sig.wait(Duration::ZERO));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let first = Signal::new(libc::SIGUSR2).unwrap();
        match Signal::new(libc::SIGUSR2) {
            Err(IpcError::SignalInUse(n)) => assert_eq!(n, libc::SIGUSR2),
            other => panic!("expected SignalInUse, got {other:?}"),
        }
        drop(first);
        // The number is free again.
        let _again = Signal::new(libc::SIGUSR2).unwrap();
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(Signal::new(0), Err(IpcError::InvalidSignal(0))));
        assert!(matches!(Signal::new(-4), Err(IpcError::InvalidSignal(-4))));
        assert!(matches!(Signal::new(33), Err(IpcError::InvalidSignal(33))));
    }

    #[test]
    fn test_reserved_number_rejected() {
        // 32 is in range for the table but reserved by the C library.
        assert!(matches!(Signal::new(32), Err(IpcError::InvalidSignal(32))));
    }

    #[test]
    fn test_move_keeps_registration() {
        let sig = Signal::new(libc::SIGWINCH).unwrap();
        let moved = sig;
        assert!(moved.raise());
        assert!(moved.wait(Duration::from_secs(1)));
        drop(moved);
        let _again = Signal::new(libc::SIGWINCH).unwrap();
    }

    #[test]
    fn test_kill_self_delivers() {
        let sig = Signal::new(libc::SIGURG).unwrap();
        assert!(sig.kill(std::process::id() as i32));
        assert!(sig.wait(Duration::from_secs(1)));
        // A pid that cannot exist reports failure.
        assert!(!sig.kill(i32::MAX));
    }

    #[test]
    fn test_wait_times_out_without_delivery() {
        let sig = Signal::new(libc::SIGCHLD).unwrap();
        assert!(!sig.wait(Duration::from_millis(50)));
    }
}
