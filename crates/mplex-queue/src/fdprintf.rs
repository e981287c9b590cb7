//! Blocking formatted write to a descriptor.
//!
//! For low-volume control and error output only: it shares no state with
//! `Queue`, has no backpressure, and loops until every byte is written.
//! Output up to `FAST_BUF` bytes is rendered on the stack; anything larger
//! is measured first and rendered into a heap buffer of exactly that size.
//!
//! ```ignore
//! use mplex_queue::fdprintf;
//!
//! fdprintf!(libc::STDERR_FILENO, "usage: {} [--crlf]\n", prog);
//! ```

use std::fmt::{self, Write as _};
use std::os::unix::io::RawFd;

use mplex_core::{kerror, WriteError};

use crate::fd::errno;

/// Largest output rendered without a heap allocation.
pub const FAST_BUF: usize = 8192;

struct StackBuf {
    buf: [u8; FAST_BUF],
    len: usize,
    overflowed: bool,
}

impl fmt::Write for StackBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > FAST_BUF {
            self.overflowed = true;
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Counts rendered bytes without storing them.
struct Measure(usize);

impl fmt::Write for Measure {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

enum Rendered {
    Stack(StackBuf),
    Heap(String),
}

impl Rendered {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Rendered::Stack(sb) => &sb.buf[..sb.len],
            Rendered::Heap(s) => s.as_bytes(),
        }
    }
}

fn render(args: fmt::Arguments<'_>) -> Result<Rendered, WriteError> {
    let mut fast = StackBuf {
        buf: [0; FAST_BUF],
        len: 0,
        overflowed: false,
    };
    match fast.write_fmt(args) {
        Ok(()) => return Ok(Rendered::Stack(fast)),
        Err(_) if !fast.overflowed => return Err(WriteError::Format),
        Err(_) => {}
    }

    let mut measure = Measure(0);
    measure.write_fmt(args)?;
    let mut slow = String::with_capacity(measure.0);
    slow.write_fmt(args)?;
    Ok(Rendered::Heap(slow))
}

/// Write every byte of `bytes`, retrying `EINTR` and short writes.
fn write_all(fd: RawFd, mut bytes: &[u8]) -> Result<(), WriteError> {
    while !bytes.is_empty() {
        let ret = unsafe { libc::write(fd, bytes.as_ptr() as *const libc::c_void, bytes.len()) };
        if ret > 0 {
            bytes = &bytes[ret as usize..];
        } else if ret == 0 {
            return Err(WriteError::Os(0));
        } else {
            let errno = errno();
            if errno != libc::EINTR {
                return Err(WriteError::Os(errno));
            }
        }
    }
    Ok(())
}

/// Render `args` and write all of it to `fd`. Returns bytes written.
pub fn try_write_fmt(fd: RawFd, args: fmt::Arguments<'_>) -> Result<usize, WriteError> {
    let rendered = render(args)?;
    let bytes = rendered.as_bytes();
    write_all(fd, bytes)?;
    Ok(bytes.len())
}

/// `try_write_fmt`, terminating the process with status 1 on failure.
pub fn write_fmt_or_exit(fd: RawFd, args: fmt::Arguments<'_>) {
    if let Err(e) = try_write_fmt(fd, args) {
        kerror!("fdprintf to fd {} failed: {}", fd, e);
        std::process::exit(1);
    }
}

/// Formatted, blocking, fail-fast write to a raw descriptor.
#[macro_export]
macro_rules! fdprintf {
    ($fd:expr, $($arg:tt)*) => {
        $crate::fdprintf::write_fmt_or_exit($fd, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Read;
    use std::os::unix::io::AsRawFd;

    use crate::fd::tests::file;

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_short_output_renders_on_stack() {
        let rendered = render(format_args!("ERROR :{} {}", "Closing link", 7)).unwrap();
        assert!(matches!(rendered, Rendered::Stack(_)));
        assert_eq!(rendered.as_bytes(), b"ERROR :Closing link 7");
    }

    #[test]
    fn test_exactly_fast_buf_stays_on_stack() {
        let text = "a".repeat(FAST_BUF);
        let rendered = render(format_args!("{}", text)).unwrap();
        assert!(matches!(rendered, Rendered::Stack(_)));
        assert_eq!(rendered.as_bytes().len(), FAST_BUF);
    }

    #[test]
    fn test_long_output_renders_exact_heap_buffer() {
        let text = "b".repeat(FAST_BUF + 1);
        let rendered = render(format_args!("<{}>", text)).unwrap();
        match &rendered {
            Rendered::Heap(s) => {
                assert_eq!(s.len(), FAST_BUF + 3);
                assert_eq!(s.capacity(), FAST_BUF + 3);
            }
            Rendered::Stack(_) => panic!("expected heap rendering"),
        }
    }

    #[test]
    fn test_display_failure_is_format_error() {
        assert_eq!(render(format_args!("{}", Broken)).err(), Some(WriteError::Format));
    }

    #[test]
    fn test_write_reaches_descriptor() {
        let (r, w) = nix::unistd::pipe().unwrap();
        let n = try_write_fmt(w.as_raw_fd(), format_args!("NOTICE * :{}\r\n", "hi")).unwrap();
        assert_eq!(n, 14);
        drop(w);

        let mut out = String::new();
        file(r).read_to_string(&mut out).unwrap();
        assert_eq!(out, "NOTICE * :hi\r\n");
    }

    #[test]
    fn test_heap_path_writes_everything() {
        let (r, w) = nix::unistd::pipe().unwrap();
        let text = "c".repeat(3 * FAST_BUF);
        let n = try_write_fmt(w.as_raw_fd(), format_args!("{}\n", text)).unwrap();
        assert_eq!(n, 3 * FAST_BUF + 1);
        drop(w);

        let mut out = Vec::new();
        file(r).read_to_end(&mut out).unwrap();
        assert_eq!(out.len(), 3 * FAST_BUF + 1);
        assert_eq!(out.last(), Some(&b'\n'));
    }

    #[test]
    fn test_bad_descriptor_is_os_error() {
        let err = try_write_fmt(-1, format_args!("lost")).unwrap_err();
        assert_eq!(err, WriteError::Os(libc::EBADF));
    }

    #[test]
    fn test_macro_writes() {
        let (r, w) = nix::unistd::pipe().unwrap();
        crate::fdprintf!(w.as_raw_fd(), "{}:{}\n", "relay", 1);
        drop(w);

        let mut out = String::new();
        file(r).read_to_string(&mut out).unwrap();
        assert_eq!(out, "relay:1\n");
    }
}
