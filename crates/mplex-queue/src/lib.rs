//! # mplex-queue
//!
//! A growable byte queue that sits between a raw non-blocking descriptor
//! and line-oriented protocol logic.
//!
//! This crate provides:
//! - `Queue` - owned buffer with a `[start, end)` window and the
//!   compaction / growth / shrink capacity policy
//! - Inbound and outbound adapters (`fill_from`, `drain_to`) that
//!   classify every syscall outcome as an `IoStatus`
//! - Line framing in both directions (`next_line`, `push_line`)
//! - `QueueConfig` - receive-side sizing with `MPX_*` env overrides
//! - `fdprintf!` - blocking formatted write for low-volume control output
//!
//! ```ignore
//! let mut inq = Queue::with_config(QueueConfig::from_env())?;
//! match inq.fill_from(fd)? {
//!     IoStatus::Progress(_) => {
//!         while let Some(line) = inq.next_line() {
//!             handle(line);
//!         }
//!     }
//!     IoStatus::WouldBlock => {}
//!     IoStatus::Fatal(cause) => return teardown(cause),
//! }
//! ```

pub mod config;
pub mod queue;
pub mod adapter;
pub mod line;
pub mod fd;
pub mod fdprintf;

// Re-exports
pub use config::QueueConfig;
pub use queue::Queue;
pub use adapter::{FatalCause, IoStatus};
pub use fd::set_nonblocking;
pub use fdprintf::{try_write_fmt, write_fmt_or_exit};
pub use mplex_core::{QueueError, QueueResult, WriteError};
