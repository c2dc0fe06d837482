//! Raw-byte tap under the tokenizer.
//!
//! The `csv` crate does not expose the text a record was parsed from, so the
//! reader wraps its source in a [`Tap`] that keeps every byte handed to the
//! tokenizer until the row containing it has been returned. That is at most
//! one row plus the tokenizer's read-ahead buffer.

use std::io::{self, Read};

/// Dead prefix size that triggers compaction of the retained bytes.
const COMPACT_THRESHOLD: usize = 8 * 1024;

pub(crate) struct Tap<R> {
    inner: R,
    /// Bytes read from `inner` starting at absolute offset `base`.
    retained: Vec<u8>,
    base: u64,
    /// Bytes before this index of `retained` are no longer needed.
    dead: usize,
}

impl<R> Tap<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            retained: Vec::new(),
            base: 0,
            dead: 0,
        }
    }

    /// Bytes in the absolute range `[from, to)`, clipped to what is retained.
    pub(crate) fn span(&self, from: u64, to: u64) -> &[u8] {
        let hi = to.saturating_sub(self.base).min(self.retained.len() as u64) as usize;
        let lo = from.saturating_sub(self.base).min(hi as u64) as usize;
        &self.retained[lo..hi]
    }

    /// Absolute offset just past the last byte read from the source.
    pub(crate) fn total(&self) -> u64 {
        self.base + self.retained.len() as u64
    }

    /// Mark everything before absolute offset `offset` as consumed.
    pub(crate) fn release_until(&mut self, offset: u64) {
        let rel = offset.saturating_sub(self.base).min(self.retained.len() as u64) as usize;
        self.dead = self.dead.max(rel);
        if self.dead >= COMPACT_THRESHOLD && self.dead * 2 >= self.retained.len() {
            self.retained.drain(..self.dead);
            self.base += self.dead as u64;
            self.dead = 0;
        }
    }
}

impl<R: Read> Read for Tap<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.retained.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// Whether `raw`, one row of input, ends inside an open quoted field.
///
/// A quote opens a quoted field only at the start of a field; inside one a
/// doubled quote is an escaped quote character. The tokenizer only ends a
/// row inside an open quote when the input runs out, so this is the
/// unterminated-quote condition.
pub(crate) fn ends_inside_quotes(raw: &[u8], delimiter: u8, quote: u8) -> bool {
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if in_quotes {
            if b == quote {
                if raw.get(i + 1) == Some(&quote) {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
        } else if b == quote && at_field_start {
            in_quotes = true;
            at_field_start = false;
        } else {
            at_field_start = b == delimiter || b == b'\n' || b == b'\r';
        }
        i += 1;
    }
    in_quotes
}
