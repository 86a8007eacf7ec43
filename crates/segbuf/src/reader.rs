//! Span-wise cursor over a [`ReadOnlyBuffer`].
//!
//! The reader exposes the contiguous window of the segment it currently sits
//! in, so parsers can scan bytes with plain slice operations and only fall
//! back to cross-segment moves at window edges. It tracks the remaining
//! length itself, which lets every advance use the trusted seek path after a
//! single bounds check.

use crate::{BufferError, Position, ReadOnlyBuffer, buffer::Window, error::Result};

const PAST_END: BufferError = BufferError::InvalidOperation("advance past the end of the buffer");

/// Forward-only reader over the spans of a buffer.
#[derive(Debug, Clone)]
pub struct BufferReader<'a> {
    buffer: ReadOnlyBuffer<'a>,
    position: Position<'a>,
    window: Option<Window<'a>>,
    consumed: usize,
    remaining: usize,
}

impl<'a> BufferReader<'a> {
    /// Reader positioned at the start of `buffer`.
    #[must_use]
    pub fn new(buffer: ReadOnlyBuffer<'a>) -> Self {
        let position = buffer.start();
        let mut reader = Self {
            buffer,
            position,
            window: position.segment().map(|s| buffer.window_of(s)),
            consumed: 0,
            remaining: buffer.len(),
        };
        reader.settle();
        reader
    }

    /// The whole contiguous window the cursor is in, including bytes already
    /// consumed from it.
    #[must_use]
    pub fn span(&self) -> &'a [u8] {
        self.window.map(|w| w.bytes()).unwrap_or_default()
    }

    /// Offset of the cursor within [`span`](Self::span).
    #[must_use]
    pub fn index(&self) -> usize {
        self.window.map_or(0, |w| self.position.index() - w.start)
    }

    /// The unread rest of the current window.
    #[must_use]
    pub fn unread_span(&self) -> &'a [u8] {
        &self.span()[self.index()..]
    }

    /// Current cursor.
    #[must_use]
    pub fn position(&self) -> Position<'a> {
        self.position
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn consumed_bytes(&self) -> usize {
        self.consumed
    }

    /// Bytes left before the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.remaining == 0
    }

    /// The unread part of the buffer as a view of its own.
    #[must_use]
    pub fn rest(&self) -> ReadOnlyBuffer<'a> {
        ReadOnlyBuffer::new_unchecked(self.position, self.buffer.end())
    }

    /// Next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.unread_span().first().copied()
    }

    /// Consumes and returns the next byte.
    pub fn take(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        // The byte sits in the current window, so the raw offset stays valid.
        self.position = self.position + 1;
        self.consumed += 1;
        self.remaining -= 1;
        self.settle();
        Some(byte)
    }

    /// Moves the cursor forward by `count` bytes, crossing into following
    /// spans as needed.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidOperation`] if `count` exceeds
    /// [`remaining`](Self::remaining); the reader is left unchanged.
    pub fn advance(&mut self, count: usize) -> Result<()> {
        if count > self.remaining {
            return Err(PAST_END);
        }
        if count < self.unread_span().len() {
            self.position = self.position + count;
        } else {
            let origin = self.position;
            self.position = ReadOnlyBuffer::seek(origin, self.buffer.end(), count, true)?;
            #[cfg(any(test, feature = "fuzzing"))]
            assert_eq!(
                ReadOnlyBuffer::seek(origin, self.buffer.end(), count, false),
                Ok(self.position),
                "Internal error: trusted seek diverged from the checked walk"
            );
            if self.position.segment() != self.window.map(|w| w.segment) {
                self.window = self.position.segment().map(|s| self.buffer.window_of(s));
            }
        }
        self.consumed += count;
        self.remaining -= count;
        self.settle();
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            self.is_end() || !self.unread_span().is_empty(),
            "Internal error: reader settled on an exhausted window"
        );
        Ok(())
    }

    /// Skips `count` bytes. Same as [`advance`](Self::advance).
    ///
    /// # Errors
    ///
    /// See [`advance`](Self::advance).
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.advance(count)
    }

    /// Fills `dst` from the unread bytes and consumes them.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidOperation`] if fewer than `dst.len()` bytes
    /// remain; nothing is consumed in that case.
    pub fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.remaining {
            return Err(PAST_END);
        }
        let mut filled = 0;
        while filled < dst.len() {
            let chunk = self.unread_span();
            let n = chunk.len().min(dst.len() - filled);
            if n == 0 {
                return Err(PAST_END);
            }
            dst[filled..filled + n].copy_from_slice(&chunk[..n]);
            filled += n;
            self.advance(n)?;
        }
        Ok(())
    }

    /// Iterates the unread bytes, consuming each one as it is yielded.
    pub fn bytes(&mut self) -> Bytes<'_, 'a> {
        Bytes { reader: self }
    }

    /// Steps over exhausted windows while bytes remain, so `unread_span` is
    /// only empty at the end.
    fn settle(&mut self) {
        while self.remaining > 0 {
            let Some(window) = self.window else { return };
            if self.position.index() < window.end {
                return;
            }
            let Some(next) = window.segment.next() else { return };
            self.position = Position::at_start(next);
            self.window = Some(self.buffer.window_of(next));
        }
    }
}

/// Byte iterator over the unread part of a [`BufferReader`], created by
/// [`BufferReader::bytes`]. Each yielded byte is consumed from the reader.
#[derive(Debug)]
pub struct Bytes<'r, 'a> {
    reader: &'r mut BufferReader<'a>,
}

impl Iterator for Bytes<'_, '_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.reader.take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.reader.remaining, Some(self.reader.remaining))
    }
}

impl ExactSizeIterator for Bytes<'_, '_> {}

impl core::iter::FusedIterator for Bytes<'_, '_> {}
