//! Inbound and outbound descriptor adapters.
//!
//! Each call issues exactly one `read(2)` or `write(2)` and classifies
//! the outcome. Nothing is retried, logged or closed here; the caller's
//! event loop decides what to do with the returned `IoStatus`.

use std::os::unix::io::RawFd;

use mplex_core::QueueResult;

use crate::fd::{errno, is_transient};
use crate::queue::Queue;

/// Outcome of one adapter call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStatus {
    /// This many bytes moved (0 only for a write with nothing pending).
    Progress(usize),
    /// Would block or interrupted; retry on the next readiness event.
    WouldBlock,
    /// The descriptor is done for; tear the connection down.
    Fatal(FatalCause),
}

/// Why a descriptor became unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalCause {
    /// Zero-byte transfer: the peer shut its side down.
    Hangup,
    /// Any non-transient errno.
    Os(i32),
}

impl IoStatus {
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, IoStatus::Fatal(_))
    }

    #[inline]
    pub fn made_progress(&self) -> bool {
        matches!(self, IoStatus::Progress(n) if *n > 0)
    }

    /// Classify a raw `read(2)` / `write(2)` return value.
    fn from_syscall(ret: isize) -> Self {
        if ret > 0 {
            IoStatus::Progress(ret as usize)
        } else if ret == 0 {
            IoStatus::Fatal(FatalCause::Hangup)
        } else {
            let errno = errno();
            if is_transient(errno) {
                IoStatus::WouldBlock
            } else {
                IoStatus::Fatal(FatalCause::Os(errno))
            }
        }
    }
}

impl Queue {
    /// One non-blocking read into the tail.
    ///
    /// Guarantees `min_recvq` bytes of slack first (shrinking a drained
    /// buffer above `ideal_recvq`), then reads up to the full slack.
    /// Only an allocation failure is an `Err`; no read is attempted then.
    pub fn fill_from(&mut self, fd: RawFd) -> QueueResult<IoStatus> {
        let config = *self.config();
        let slack = self.ensure_capacity(config.min_recvq, config.ideal_recvq, config.ideal_recvq)?;

        let tail = &mut self.buf.spare_capacity_mut()[..slack];
        let ret = unsafe { libc::read(fd, tail.as_mut_ptr() as *mut libc::c_void, tail.len()) };

        let status = IoStatus::from_syscall(ret);
        if let IoStatus::Progress(n) = status {
            // Safety: read(2) initialised the first n bytes of the spare
            // capacity, and n <= slack.
            unsafe { self.buf.set_len(self.buf.len() + n) };
        }
        Ok(status)
    }

    /// One non-blocking write of the whole window.
    ///
    /// An empty window is `Progress(0)` without touching `fd`.
    pub fn drain_to(&mut self, fd: RawFd) -> IoStatus {
        if self.is_empty() {
            return IoStatus::Progress(0);
        }

        let pending = self.as_bytes();
        let ret = unsafe { libc::write(fd, pending.as_ptr() as *const libc::c_void, pending.len()) };

        let status = IoStatus::from_syscall(ret);
        if let IoStatus::Progress(n) = status {
            self.start += n;
        }
        status
    }
}
