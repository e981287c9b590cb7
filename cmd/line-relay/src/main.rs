//! Line Relay
//!
//! Reads protocol lines from stdin and relays them to stdout, one queue
//! per direction, with both descriptors non-blocking and driven by
//! `poll(2)`. Empty lines are dropped; every relayed line gets a fresh
//! terminator (and an optional prefix).
//!
//! Usage:
//!     cargo build --release -p line-relay
//!     ./target/release/line-relay [--crlf] [--prefix TEXT]
//!
//! Test with:
//!     printf 'PING :a\r\n\r\nJOIN #x\n' | ./target/release/line-relay --prefix '> '
//!
//! Environment:
//!     MPX_MIN_RECVQ / MPX_IDEAL_RECVQ   queue sizing
//!     MPX_LOG_LEVEL=info                 show start/stop summary

use mplex_core::{kdebug, kerror, kinfo};
use mplex_queue::{fdprintf, set_nonblocking, FatalCause, IoStatus, Queue, QueueConfig, QueueResult};

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use std::os::unix::io::{BorrowedFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};

const IN_FD: RawFd = libc::STDIN_FILENO;
const OUT_FD: RawFd = libc::STDOUT_FILENO;
const ERR_FD: RawFd = libc::STDERR_FILENO;

static RUNNING: AtomicBool = AtomicBool::new(true);

// ── Options ──

struct Options {
    crlf: bool,
    prefix: Vec<u8>,
}

fn usage(prog: &str) -> ! {
    fdprintf!(ERR_FD, "usage: {} [--crlf] [--prefix TEXT]\n", prog);
    std::process::exit(2);
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("line-relay");
    let mut opts = Options { crlf: false, prefix: Vec::new() };

    let mut it = args.iter().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--crlf" => opts.crlf = true,
            "--prefix" => match it.next() {
                Some(p) if !p.contains(['\r', '\n']) => opts.prefix = p.as_bytes().to_vec(),
                _ => usage(prog),
            },
            _ => usage(prog),
        }
    }
    opts
}

// ── Stats ──

#[derive(Default)]
struct Stats {
    reads: u64,
    writes: u64,
    lines: u64,
    bytes_in: u64,
    bytes_out: u64,
}

impl Stats {
    fn print(&self) {
        kinfo!(
            "line-relay: reads={} writes={} lines={} bytes_in={} bytes_out={}",
            self.reads, self.writes, self.lines, self.bytes_in, self.bytes_out,
        );
    }
}

// ── Relay ──

enum Outcome {
    /// Input ended and all output was flushed.
    Done,
    /// stdout is unusable.
    OutputLost(FatalCause),
    /// Interrupted by SIGINT/SIGTERM.
    Stopped,
}

/// Move every complete line from `inq` to `outq`.
fn frame_lines(
    inq: &mut Queue,
    outq: &mut Queue,
    opts: &Options,
    scratch: &mut Vec<u8>,
    stats: &mut Stats,
) -> QueueResult<()> {
    while let Some(line) = inq.next_line() {
        scratch.clear();
        scratch.extend_from_slice(&opts.prefix);
        scratch.extend_from_slice(line);
        outq.push_line(&scratch[..], opts.crlf)?;
        stats.lines += 1;
    }
    Ok(())
}

fn relay(opts: &Options, config: QueueConfig, stats: &mut Stats) -> QueueResult<Outcome> {
    let mut inq = Queue::with_config(config)?;
    let mut outq = Queue::with_config(config)?;
    let mut scratch = Vec::new();
    let mut reading = true;

    // Safety: the standard descriptors stay open for the whole process.
    let in_fd = unsafe { BorrowedFd::borrow_raw(IN_FD) };
    let out_fd = unsafe { BorrowedFd::borrow_raw(OUT_FD) };

    while reading || outq.has_pending() {
        if !RUNNING.load(Ordering::Relaxed) {
            return Ok(Outcome::Stopped);
        }

        let in_events = if reading { PollFlags::POLLIN } else { PollFlags::empty() };
        let out_events = if outq.has_pending() { PollFlags::POLLOUT } else { PollFlags::empty() };
        let mut fds = [PollFd::new(in_fd, in_events), PollFd::new(out_fd, out_events)];

        match poll(&mut fds, PollTimeout::NONE) {
            Ok(_) => {}
            Err(Errno::EINTR) => continue,
            Err(e) => {
                kerror!("line-relay: poll failed: {}", e);
                return Ok(Outcome::OutputLost(FatalCause::Os(e as i32)));
            }
        }

        let ready = |fd: &PollFd, want: PollFlags| {
            fd.revents()
                .map_or(false, |r| r.intersects(want | PollFlags::POLLHUP | PollFlags::POLLERR))
        };
        let readable = reading && ready(&fds[0], PollFlags::POLLIN);
        let writable = outq.has_pending() && ready(&fds[1], PollFlags::POLLOUT);

        if readable {
            match inq.fill_from(IN_FD)? {
                IoStatus::Progress(n) => {
                    stats.reads += 1;
                    stats.bytes_in += n as u64;
                    frame_lines(&mut inq, &mut outq, opts, &mut scratch, stats)?;
                }
                IoStatus::WouldBlock => {}
                IoStatus::Fatal(cause) => {
                    kdebug!("line-relay: input closed ({:?}), {} bytes unterminated", cause, inq.len());
                    reading = false;
                }
            }
        }

        if writable {
            match outq.drain_to(OUT_FD) {
                IoStatus::Progress(n) => {
                    stats.writes += 1;
                    stats.bytes_out += n as u64;
                }
                IoStatus::WouldBlock => {}
                IoStatus::Fatal(cause) => return Ok(Outcome::OutputLost(cause)),
            }
        }
    }
    Ok(Outcome::Done)
}

// ── Main ──

fn main() {
    let opts = parse_args();

    unsafe {
        libc::signal(libc::SIGINT, handle_signal as libc::sighandler_t);
        libc::signal(libc::SIGTERM, handle_signal as libc::sighandler_t);
    }

    for fd in [IN_FD, OUT_FD] {
        if let Err(e) = set_nonblocking(fd) {
            fdprintf!(ERR_FD, "line-relay: cannot make fd {} non-blocking: {}\n", fd, e);
            std::process::exit(1);
        }
    }

    let config = QueueConfig::from_env();
    kinfo!(
        "line-relay: starting (crlf={}, prefix={} bytes, min_recvq={}, ideal_recvq={})",
        opts.crlf, opts.prefix.len(), config.min_recvq, config.ideal_recvq,
    );

    let mut stats = Stats::default();
    let code = match relay(&opts, config, &mut stats) {
        Ok(Outcome::Done) => 0,
        Ok(Outcome::Stopped) => {
            kinfo!("line-relay: interrupted");
            130
        }
        Ok(Outcome::OutputLost(cause)) => {
            kerror!("line-relay: output lost: {:?}", cause);
            1
        }
        Err(e) => {
            kerror!("line-relay: {}", e);
            1
        }
    };

    stats.print();
    std::process::exit(code);
}

extern "C" fn handle_signal(_sig: libc::c_int) {
    RUNNING.store(false, Ordering::Relaxed);
}
