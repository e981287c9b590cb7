//! Line framing over a `Queue`.
//!
//! Either `\r` or `\n` ends a line, so `\r\n` yields one line plus one
//! empty line, and empty lines are never surfaced. Lines come back as
//! slices borrowed from the queue; the borrow checker rejects holding
//! one across the next mutating call.

use mplex_core::QueueResult;

use crate::queue::Queue;

#[inline]
fn is_terminator(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

impl Queue {
    /// Pop the next complete, non-empty line (terminator excluded).
    ///
    /// Returns `None` when no terminator follows the buffered bytes.
    /// Terminators already skipped stay consumed, and the partial line
    /// itself is left in place for the next call.
    pub fn next_line(&mut self) -> Option<&[u8]> {
        let mut i = self.start;
        while i < self.buf.len() {
            if is_terminator(self.buf[i]) {
                if i == self.start {
                    self.start += 1;
                } else {
                    let line_start = self.start;
                    self.start = i + 1;
                    return Some(&self.buf[line_start..i]);
                }
            }
            i += 1;
        }
        None
    }

    /// Append `text` followed by `\n` (or `\r\n` when `wide`).
    ///
    /// `text` must not contain terminators of its own, or the reader
    /// will see it as several lines. Nothing is appended on error.
    pub fn push_line<T: AsRef<[u8]>>(&mut self, text: T, wide: bool) -> QueueResult<()> {
        let text = text.as_ref();
        let needed = text.len() + 1 + usize::from(wide);
        let ideal = self.config().ideal_recvq;
        self.ensure_capacity(needed, ideal, ideal)?;

        // Capacity is already there: none of these reallocate.
        self.buf.extend_from_slice(text);
        if wide {
            self.buf.push(b'\r');
        }
        self.buf.push(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::os::unix::io::AsRawFd;

    use crate::adapter::IoStatus;
    use crate::config::QueueConfig;
    use crate::fd::tests::{file, nonblocking_pipe};
    use crate::queue::tests::{assert_invariants, queue_with, small_config};

    fn drain_lines(q: &mut Queue) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        while let Some(line) = q.next_line() {
            lines.push(line.to_vec());
        }
        lines
    }

    #[test]
    fn test_ping_roundtrip() {
        let mut q = Queue::with_config(small_config()).unwrap();
        q.push_line("PING :abc", false).unwrap();
        assert_eq!(q.as_bytes(), b"PING :abc\n");

        assert_eq!(q.next_line(), Some(&b"PING :abc"[..]));
        assert_eq!((q.start(), q.end()), (10, 10));
        assert_eq!(q.next_line(), None);
        assert_invariants(&q);
    }

    #[test]
    fn test_wide_terminator() {
        let mut q = Queue::with_config(small_config()).unwrap();
        q.push_line(b"PRIVMSG #rust :hi", true).unwrap();
        assert_eq!(q.as_bytes(), b"PRIVMSG #rust :hi\r\n");

        assert_eq!(q.next_line(), Some(&b"PRIVMSG #rust :hi"[..]));
        // The trailing '\n' is an empty line and gets swallowed.
        assert_eq!(q.next_line(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_lines_in_order() {
        let mut q = Queue::with_config(small_config()).unwrap();
        q.push_line("NICK a", true).unwrap();
        q.push_line("USER a 0 * :A", false).unwrap();
        q.push_line("JOIN #x", true).unwrap();

        let lines = drain_lines(&mut q);
        assert_eq!(lines, vec![b"NICK a".to_vec(), b"USER a 0 * :A".to_vec(), b"JOIN #x".to_vec()]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_only_terminators_yield_nothing() {
        let mut q = queue_with(16, 2, b"\r\n\n\r\r");
        assert_eq!(q.next_line(), None);
        assert_eq!(q.start(), q.end());
        assert_eq!(q.end(), 7);
    }

    #[test]
    fn test_partial_line_is_stable() {
        let mut q = queue_with(16, 3, b"PART #ch");
        for _ in 0..3 {
            assert_eq!(q.next_line(), None);
            assert_eq!((q.start(), q.end()), (3, 11));
        }
    }

    #[test]
    fn test_leading_terminators_consumed_before_partial() {
        let mut q = queue_with(16, 0, b"\n\nQUI");
        assert_eq!(q.next_line(), None);
        assert_eq!(q.as_bytes(), b"QUI");
    }

    #[test]
    fn test_line_then_partial() {
        let mut q = queue_with(32, 0, b"MODE +i\nTOPIC #a :hel");
        assert_eq!(q.next_line(), Some(&b"MODE +i"[..]));
        assert_eq!(q.next_line(), None);
        assert_eq!(q.as_bytes(), b"TOPIC #a :hel");
    }

    #[test]
    fn test_empty_text_is_just_terminator() {
        let mut q = Queue::with_config(small_config()).unwrap();
        q.push_line("", false).unwrap();
        assert_eq!(q.as_bytes(), b"\n");
        assert_eq!(q.next_line(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_push_grows_past_ideal() {
        let mut q = Queue::with_config(small_config()).unwrap();
        let long = vec![b'z'; 500];
        q.push_line(&long, true).unwrap();
        assert!(q.capacity() >= 502);
        assert_eq!(q.len(), 502);
        assert_eq!(q.next_line(), Some(&long[..]));
        assert_invariants(&q);
    }

    #[test]
    fn test_push_compacts_behind_consumed_lines() {
        let config = QueueConfig::new().min_recvq(4).ideal_recvq(16);
        let mut q = Queue::with_config(config).unwrap();
        q.push_line("0123456789", false).unwrap();
        q.push_line("ab", false).unwrap();
        assert_eq!(q.capacity(), 16);
        assert_eq!(q.next_line(), Some(&b"0123456789"[..]));

        // 2 bytes of slack + 11 reclaimable: compaction, no reallocation.
        q.push_line("cdefgh", false).unwrap();
        assert_eq!(q.capacity(), 16);
        assert_eq!(q.start(), 0);
        assert_eq!(q.as_bytes(), b"ab\ncdefgh\n");
        assert_eq!(drain_lines(&mut q), vec![b"ab".to_vec(), b"cdefgh".to_vec()]);
    }

    #[test]
    fn test_roundtrip_through_pipe() {
        let (r, w) = nonblocking_pipe();
        let mut out = Queue::with_config(small_config()).unwrap();
        out.push_line("PING :abc", true).unwrap();
        out.push_line("PONG :abc", false).unwrap();
        while out.has_pending() {
            assert!(out.drain_to(w.as_raw_fd()).made_progress());
        }

        let mut inq = Queue::with_config(small_config()).unwrap();
        assert_eq!(inq.fill_from(r.as_raw_fd()).unwrap(), IoStatus::Progress(21));
        assert_eq!(drain_lines(&mut inq), vec![b"PING :abc".to_vec(), b"PONG :abc".to_vec()]);
        assert!(inq.is_empty());
    }

    #[test]
    fn test_line_split_across_reads() {
        let (r, w) = nonblocking_pipe();
        let mut writer = file(w);
        let mut q = Queue::with_config(small_config()).unwrap();

        writer.write_all(b"PRIVMSG #a :he").unwrap();
        assert!(q.fill_from(r.as_raw_fd()).unwrap().made_progress());
        assert_eq!(q.next_line(), None);

        writer.write_all(b"llo\r\n").unwrap();
        assert!(q.fill_from(r.as_raw_fd()).unwrap().made_progress());
        assert_eq!(q.next_line(), Some(&b"PRIVMSG #a :hello"[..]));
        assert_eq!(q.next_line(), None);
        assert!(q.is_empty());
    }
}
