//! `Queue` - owned byte buffer with a `[start, end)` valid window.
//!
//! Capacity policy, in order of preference:
//!
//! 1. **Reset / shrink** - an empty window rewinds both cursors; if the
//!    buffer also exceeds `max`, it is replaced by one of `ideal` bytes.
//! 2. **Compact** - slide the window to offset 0 when that alone frees
//!    `min` bytes of tail slack. No allocation.
//! 3. **Grow** - allocate `max(1.5 * len + min, ideal)` bytes and copy the
//!    window to offset 0.
//!
//! The buffer's allocated capacity is the queue's size and its length is
//! `end`: bytes past `end` are never initialised, only written by
//! `extend_from_slice` or by `read(2)` into the spare capacity.

use std::fmt;

use mplex_core::{QueueError, QueueResult};

use crate::config::QueueConfig;

/// Growable single-owner byte queue.
///
/// Invariant between public calls:
/// `start <= end == buf.len() <= buf.capacity()`.
/// Only `buf[start..end]` holds meaningful bytes.
pub struct Queue {
    pub(crate) buf: Vec<u8>,
    pub(crate) start: usize,
    config: QueueConfig,
}

impl Queue {
    /// Empty, unallocated queue sized by `config`.
    ///
    /// Fails with `QueueError::Config` when `config.validate()` does.
    /// A zero `min_recvq` would let `fill_from` issue zero-length reads,
    /// which are indistinguishable from a peer hangup.
    pub fn with_config(config: QueueConfig) -> QueueResult<Self> {
        config.validate().map_err(QueueError::Config)?;
        Ok(Self {
            buf: Vec::new(),
            start: 0,
            config,
        })
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Bytes in the valid window.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len() - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.buf.len()
    }

    /// Whether there is output waiting for a write-ready descriptor.
    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.is_empty()
    }

    /// Allocated size of the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Contiguous free space after `end`.
    #[inline]
    pub fn slack(&self) -> usize {
        self.buf.capacity() - self.buf.len()
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.buf.len()
    }

    /// The valid window `[start, end)`.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    /// Discard buffered bytes. Capacity is kept.
    pub fn clear(&mut self) {
        self.start = 0;
        self.buf.clear();
    }

    /// Guarantee at least `min` bytes of tail slack and return the slack.
    ///
    /// `ideal` is raised to `min` if smaller. `max` only matters when the
    /// window is empty: a buffer larger than `max` is then reallocated to
    /// exactly `ideal` bytes. A queue that never fully drains keeps its
    /// capacity.
    ///
    /// On `AllocationFailed` the window contents and buffer are untouched.
    pub fn ensure_capacity(&mut self, min: usize, ideal: usize, max: usize) -> QueueResult<usize> {
        let ideal = ideal.max(min);

        if self.is_empty() {
            self.clear();
            if self.buf.capacity() > max {
                self.buf = alloc_exact(ideal)?;
            }
        }

        let slack = self.slack();
        if slack >= min {
            return Ok(slack);
        }

        if slack + self.start >= min {
            self.compact();
        } else {
            self.grow(min, ideal)?;
        }
        Ok(self.slack())
    }

    /// Slide the window to offset 0 in place.
    fn compact(&mut self) {
        let len = self.len();
        self.buf.copy_within(self.start.., 0);
        self.buf.truncate(len);
        self.start = 0;
    }

    /// Move the window into a fresh, larger buffer at offset 0.
    fn grow(&mut self, min: usize, ideal: usize) -> QueueResult<()> {
        let len = self.len();
        let new_size = len
            .checked_add(len / 2)
            .and_then(|n| n.checked_add(min))
            .ok_or(QueueError::AllocationFailed { requested: usize::MAX })?
            .max(ideal);

        let mut fresh = alloc_exact(new_size)?;
        fresh.extend_from_slice(self.as_bytes());

        self.buf = fresh;
        self.start = 0;
        Ok(())
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("start", &self.start)
            .field("end", &self.buf.len())
            .field("size", &self.buf.capacity())
            .finish()
    }
}

/// Empty vector with room for exactly `size` bytes, nothing initialised.
fn alloc_exact(size: usize) -> QueueResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| QueueError::AllocationFailed { requested: size })?;
    Ok(buf)
}
