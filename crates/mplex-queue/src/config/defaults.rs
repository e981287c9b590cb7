//! Compile-time queue defaults.
//!
//! Overridden at runtime by `MPX_MIN_RECVQ` / `MPX_IDEAL_RECVQ`
//! through `QueueConfig::from_env()`.

/// Minimum contiguous tail space guaranteed before each `read(2)`.
pub const MIN_RECVQ: usize = 1024;

/// Preferred reallocation size, and the capacity above which a fully
/// drained buffer is shrunk back down.
pub const IDEAL_RECVQ: usize = 16 * 1024;
