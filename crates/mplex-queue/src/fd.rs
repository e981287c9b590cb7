//! Raw descriptor helpers shared by the adapters and `fdprintf`.
//!
//! The queue never changes a descriptor's blocking mode; callers use
//! `set_nonblocking` (or their own setup) before handing the fd over.

use std::os::unix::io::RawFd;

use nix::fcntl::{fcntl, FcntlArg, OFlag};

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        /// errno of the last failed libc call on this thread.
        #[inline]
        pub fn errno() -> i32 {
            unsafe { *libc::__errno_location() }
        }
    } else if #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))] {
        /// errno of the last failed libc call on this thread.
        #[inline]
        pub fn errno() -> i32 {
            unsafe { *libc::__error() }
        }
    } else {
        /// errno of the last failed libc call on this thread.
        #[inline]
        pub fn errno() -> i32 {
            std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
        }
    }
}

/// Would-block or interrupted: retry on the next readiness event.
#[inline]
pub fn is_transient(errno: i32) -> bool {
    errno == libc::EAGAIN || errno == libc::EWOULDBLOCK || errno == libc::EINTR
}

/// Add `O_NONBLOCK` to the descriptor's status flags.
pub fn set_nonblocking(fd: RawFd) -> nix::Result<()> {
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    if !flags.contains(OFlag::O_NONBLOCK) {
        fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    }
    Ok(())
}
