//! Owned POSIX descriptors, pipes, FIFOs, and pollable signal notification.
//!
//! Everything here follows one ownership model:
//! - an open descriptor is a present `OwnedFd`; closed/invalid is its absence
//! - duplication is explicit (`try_clone` is `dup(2)`), moves are Rust moves
//! - reads and writes are verbatim single-syscall passthroughs
//! - readiness is `poll(2)` with a timeout, never an indefinite block unless
//!   the caller asks for one
//!
//! [`Signal`] turns POSIX signals into the same readiness model via the
//! self-pipe technique, so one `poll`-shaped loop can watch data and
//! cancellation together.

pub mod error;
pub mod fifo;
pub mod file;
pub mod pipe;
pub mod signal;
pub mod traits;

pub use error::{IpcError, Result};
pub use fifo::{Fifo, FifoMode};
pub use file::File;
pub use pipe::{End, Pipe};
pub use signal::Signal;
pub use traits::{Io, Notification};

// Open flags and permission bits taken by `File::open`.
pub use nix::fcntl::OFlag;
pub use nix::sys::stat::Mode;
