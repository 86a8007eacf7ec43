//! Read-only views over segment chains.
//!
//! A [`ReadOnlyBuffer`] is a pair of [`Position`]s. It never owns or copies
//! the bytes it describes; every query walks the chain from `start` towards
//! `end`.
//!
//! Length accounting
//! - Positions carry absolute indexes into their segment's memory, so a
//!   segment covering `memory[50..100]` starts at index 50, not 0.
//! - The first segment contributes `segment.end - start.index`, interior
//!   segments `segment.end - segment.start`, and the final segment
//!   `end.index - segment.start`. Counting from 0 instead of `segment.start`
//!   overstates lengths for offset windows.
//!
//! Boundary normalization
//! - A walk that lands exactly on a segment's end reports the start of the
//!   next segment instead, unless that point is the walk's bound. Consumers
//!   never see a position sitting on an exhausted segment in the middle of a
//!   buffer.

mod seek;
mod slice;
#[cfg(test)]
mod tests;

use alloc::{borrow::Cow, vec::Vec};
use core::{fmt, iter::FusedIterator};

use bstr::{BStr, ByteSlice};

use crate::{
    BufferError, MemoryOwner, Position,
    error::Result,
    segment::{ArraySegment, SegmentRef},
};

/// An immutable, non-owning view of bytes spread over one or more segments.
///
/// Buffers are `Copy`; slicing produces new views of the same chain.
/// Equality compares the delimiting positions, never the content.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOnlyBuffer<'a> {
    start: Position<'a>,
    end: Position<'a>,
}

impl<'a> ReadOnlyBuffer<'a> {
    /// A buffer with no segment and no bytes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps `bytes[offset..offset + length]` as a single synthetic segment.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if the window does not fit in `bytes`.
    pub fn from_slice(bytes: &'a [u8], offset: usize, length: usize) -> Result<Self> {
        let end = offset
            .checked_add(length)
            .ok_or(BufferError::InvalidRange("length overflows the slice"))?;
        let segment = SegmentRef::Array(ArraySegment::new(bytes, offset, end)?);
        Ok(Self::new_unchecked(
            Position::new(segment, offset),
            Position::new(segment, end),
        ))
    }

    /// Wraps a window of `owner`'s memory as a single synthetic segment.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if the window does not fit in the owner.
    pub fn from_owner<O>(owner: &'a O, offset: usize, length: usize) -> Result<Self>
    where
        O: MemoryOwner + ?Sized,
    {
        Self::from_slice(owner.memory(), offset, length)
    }

    /// A view from `start` to `end` within an existing chain.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if either position lies outside its
    /// segment, if only one of them is set, or if `end` cannot be reached from
    /// `start` by walking forward.
    pub fn new(start: Position<'a>, end: Position<'a>) -> Result<Self> {
        let (first, last) = match (start.segment(), end.segment()) {
            (None, None) => return Ok(Self::empty()),
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(BufferError::InvalidRange(
                    "start and end must both be set",
                ));
            }
        };
        for (segment, index) in [(first, start.index()), (last, end.index())] {
            if index < segment.start() || index > segment.end() {
                return Err(BufferError::InvalidRange(
                    "position lies outside its segment",
                ));
            }
        }
        if first == last {
            if start.index() > end.index() {
                return Err(BufferError::InvalidRange("end precedes start"));
            }
            return Ok(Self::new_unchecked(start, end));
        }
        let mut current = first.next();
        while let Some(segment) = current {
            if segment == last {
                return Ok(Self::new_unchecked(start, end));
            }
            current = segment.next();
        }
        log::debug!("rejected buffer: {end:?} is not reachable from {start:?}");
        Err(BufferError::InvalidRange("end is not reachable from start"))
    }

    pub(crate) fn new_unchecked(start: Position<'a>, end: Position<'a>) -> Self {
        Self { start, end }
    }

    /// First position of the view.
    #[must_use]
    pub fn start(&self) -> Position<'a> {
        self.start
    }

    /// Position one past the last byte of the view.
    #[must_use]
    pub fn end(&self) -> Position<'a> {
        self.end
    }

    /// Whether `start` and `end` share a segment.
    #[must_use]
    pub fn is_single_span(&self) -> bool {
        self.start.segment() == self.end.segment()
    }

    /// Number of bytes in the view.
    ///
    /// O(1) for single-span buffers, otherwise a walk over every spanned
    /// segment. The result is not cached.
    #[must_use]
    pub fn len(&self) -> usize {
        let (Some(first), Some(last)) = (self.start.segment(), self.end.segment()) else {
            return 0;
        };
        if first == last {
            return self.end.index() - self.start.index();
        }

        let mut length = first.end() - self.start.index();
        let mut current = first.next();
        while let Some(segment) = current {
            if segment == last {
                return length + (self.end.index() - segment.start());
            }
            length += segment.len();
            current = segment.next();
        }
        length
    }

    /// Whether the view holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans().all(<[u8]>::is_empty)
    }

    /// The first contiguous window, possibly empty.
    #[must_use]
    pub fn first(&self) -> &'a [u8] {
        self.spans().next().unwrap_or_default()
    }

    /// The contiguous windows of the view, in chain order.
    #[must_use]
    pub fn spans(&self) -> Spans<'a> {
        Spans(self.windows())
    }

    pub(crate) fn windows(&self) -> Windows<'a> {
        Windows {
            next: self.start.segment().map(|s| (s, self.start.index())),
            end: self.end,
        }
    }

    /// Window of `segment` that belongs to this view.
    pub(crate) fn window_of(&self, segment: SegmentRef<'a>) -> Window<'a> {
        let start = if self.start.segment() == Some(segment) {
            self.start.index()
        } else {
            segment.start()
        };
        let end = if self.end.segment() == Some(segment) {
            self.end.index()
        } else {
            segment.end()
        };
        Window {
            segment,
            start,
            end,
        }
    }

    /// Position of the first occurrence of `value`.
    #[must_use]
    pub fn position_of(&self, value: u8) -> Option<Position<'a>> {
        self.windows().find_map(|window| {
            window
                .bytes()
                .find_byte(value)
                .map(|offset| Position::new(window.segment, window.start + offset))
        })
    }

    /// Copies the view into a fresh vector sized to [`len`](Self::len).
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for span in self.spans() {
            out.extend_from_slice(span);
        }
        out
    }

    /// Contiguous bytes of the view: borrowed when single-span, copied
    /// otherwise.
    #[must_use]
    pub fn to_span(&self) -> Cow<'a, [u8]> {
        if self.is_single_span() {
            Cow::Borrowed(self.first())
        } else {
            Cow::Owned(self.to_vec())
        }
    }

    /// Copies the view into the front of `dst` and returns the byte count.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if `dst` is shorter than the view;
    /// nothing is copied in that case.
    pub fn copy_to(&self, dst: &mut [u8]) -> Result<usize> {
        let length = self.len();
        let Some(dst) = dst.get_mut(..length) else {
            return Err(BufferError::InvalidRange(
                "destination is shorter than the buffer",
            ));
        };
        let mut offset = 0;
        for span in self.spans() {
            dst[offset..offset + span.len()].copy_from_slice(span);
            offset += span.len();
        }
        Ok(length)
    }
}

impl<'a> From<&'a [u8]> for ReadOnlyBuffer<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        let segment = SegmentRef::Array(ArraySegment::from_slice(bytes));
        Self::new_unchecked(Position::new(segment, 0), Position::new(segment, bytes.len()))
    }
}

impl<'a> IntoIterator for ReadOnlyBuffer<'a> {
    type Item = &'a [u8];
    type IntoIter = Spans<'a>;

    fn into_iter(self) -> Spans<'a> {
        self.spans()
    }
}

impl fmt::Debug for ReadOnlyBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyBuffer")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("bytes", &BStr::new(self.to_span().as_ref()))
            .finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ReadOnlyBuffer<'_> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.to_span())
    }
}

/// The part of one segment covered by a buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window<'a> {
    pub(crate) segment: SegmentRef<'a>,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl<'a> Window<'a> {
    pub(crate) fn bytes(&self) -> &'a [u8] {
        &self.segment.memory()[self.start..self.end]
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Windows<'a> {
    next: Option<(SegmentRef<'a>, usize)>,
    end: Position<'a>,
}

impl<'a> Iterator for Windows<'a> {
    type Item = Window<'a>;

    fn next(&mut self) -> Option<Window<'a>> {
        let (segment, start) = self.next.take()?;
        if self.end.segment() == Some(segment) {
            return Some(Window {
                segment,
                start,
                end: self.end.index(),
            });
        }
        self.next = segment.next().map(|next| (next, next.start()));
        Some(Window {
            segment,
            start,
            end: segment.end(),
        })
    }
}

impl FusedIterator for Windows<'_> {}

/// Iterator over the contiguous windows of a [`ReadOnlyBuffer`].
#[derive(Debug, Clone)]
pub struct Spans<'a>(Windows<'a>);

impl<'a> Iterator for Spans<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        self.0.next().map(|window| window.bytes())
    }
}

impl FusedIterator for Spans<'_> {}
