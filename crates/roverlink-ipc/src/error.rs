/// Errors from descriptor factories and signal registration.
///
/// Plain descriptor operations (read, write, readiness waits) report through
/// `std::io::Result` or sentinel state instead; this enum covers the
/// operations that fail as a whole.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// An underlying OS call failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The signal number is outside 1..=32 or unsupported by the OS.
    #[error("invalid signal number {0}")]
    InvalidSignal(i32),

    /// Another live notifier already owns this signal number.
    #[error("signal {0} is already registered")]
    SignalInUse(i32),
}

pub type Result<T> = std::result::Result<T, IpcError>;
