//! Fixed-capacity byte ring backing [`RollingWindow`](super::RollingWindow).

use std::num::NonZeroUsize;

/// Byte ring with a fixed capacity, sized to one block.
///
/// Once full, pushing a byte evicts the oldest one, which is exactly what a
/// sliding window needs to feed [`RollingChecksum::roll`](super::RollingChecksum::roll).
#[derive(Clone, Debug)]
pub(crate) struct ByteRing {
    buffer: Box<[u8]>,
    head: usize,
    len: usize,
}

impl ByteRing {
    pub(crate) fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            buffer: vec![0u8; capacity.get()].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Appends `byte`, returning the evicted byte when the ring was full.
    #[inline]
    pub(crate) fn push_back(&mut self, byte: u8) -> Option<u8> {
        let capacity = self.buffer.len();
        if self.len < capacity {
            let pos = (self.head + self.len) % capacity;
            self.buffer[pos] = byte;
            self.len += 1;
            None
        } else {
            let outgoing = std::mem::replace(&mut self.buffer[self.head], byte);
            self.head = (self.head + 1) % capacity;
            Some(outgoing)
        }
    }

    #[inline]
    pub(crate) fn pop_front(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let byte = self.buffer[self.head];
        self.head = (self.head + 1) % self.buffer.len();
        self.len -= 1;
        Some(byte)
    }

    pub(crate) const fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Returns the contents oldest-first as up to two slices.
    pub(crate) fn as_slices(&self) -> (&[u8], &[u8]) {
        let capacity = self.buffer.len();
        let end = self.head + self.len;
        if end <= capacity {
            (&self.buffer[self.head..end], &[])
        } else {
            (&self.buffer[self.head..], &self.buffer[..end - capacity])
        }
    }

    /// Copies the contents oldest-first into a new vector.
    pub(crate) fn to_vec(&self) -> Vec<u8> {
        let (front, back) = self.as_slices();
        let mut out = Vec::with_capacity(self.len);
        out.extend_from_slice(front);
        out.extend_from_slice(back);
        out
    }
}
