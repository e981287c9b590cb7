//! Error types for the mplex line queue
//!
//! Only conditions the queue cannot recover from are errors here.
//! Would-block and peer-closed outcomes of descriptor I/O are ordinary
//! `IoStatus` values in `mplex-queue`, not errors.

use core::fmt;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors that can occur in queue operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The buffer could not be (re)allocated to `requested` bytes.
    ///
    /// Also raised when the requested capacity overflows `usize`.
    /// Unrecoverable for the queue that raised it.
    AllocationFailed { requested: usize },

    /// Queue configuration rejected by `validate()`
    Config(&'static str),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::AllocationFailed { requested } => {
                write!(f, "queue allocation of {} bytes failed", requested)
            }
            QueueError::Config(msg) => write!(f, "invalid queue config: {}", msg),
        }
    }
}

impl std::error::Error for QueueError {}

/// Errors from the blocking formatted-write helper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// A `Display` implementation returned an error while rendering
    Format,

    /// `write(2)` failed with this errno, or wrote zero bytes (errno 0)
    Os(i32),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Format => write!(f, "formatting failed"),
            WriteError::Os(0) => write!(f, "write made no progress"),
            WriteError::Os(errno) => write!(f, "write failed: errno {}", errno),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<fmt::Error> for WriteError {
    fn from(_: fmt::Error) -> Self {
        WriteError::Format
    }
}
