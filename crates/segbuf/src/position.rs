use core::{
    fmt,
    hash::{Hash, Hasher},
    ops::Add,
};

use crate::{
    BufferError,
    error::Result,
    segment::{SegmentKind, SegmentRef},
};

/// An opaque cursor into a segment chain: a segment plus an absolute index
/// into that segment's memory.
///
/// The default position holds no segment and is distinct from every other
/// position. Positions compare by segment identity and index only.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Position<'a> {
    segment: Option<SegmentRef<'a>>,
    index: usize,
}

impl<'a> Position<'a> {
    /// Cursor at `index` within `segment`'s memory.
    #[must_use]
    pub fn new(segment: SegmentRef<'a>, index: usize) -> Self {
        Self {
            segment: Some(segment),
            index,
        }
    }

    /// Cursor at the first byte of `segment`.
    #[must_use]
    pub fn at_start(segment: SegmentRef<'a>) -> Self {
        Self::new(segment, segment.start())
    }

    /// The segment slot, if set.
    #[must_use]
    pub fn segment(&self) -> Option<SegmentRef<'a>> {
        self.segment
    }

    /// The raw index, without its segment.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether this is the default, segment-less position.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.segment.is_none()
    }

    /// Narrows the segment slot to the backing kind `T`.
    ///
    /// Returns `Ok(None)` for an unset position.
    ///
    /// # Errors
    ///
    /// [`BufferError::UnexpectedSegmentType`] if a segment of another kind is
    /// stored.
    pub fn segment_as<T: SegmentKind<'a>>(&self) -> Result<Option<T>> {
        let Some(segment) = self.segment else {
            return Ok(None);
        };
        T::narrow(segment)
            .map(Some)
            .ok_or(BufferError::UnexpectedSegmentType {
                expected: T::NAME,
                found: segment.kind_name(),
            })
    }

    /// `rotate_left(h1, 5) + h1 ^ h2` over the segment identity and index.
    pub(crate) fn combined_hash(&self) -> u64 {
        let h1 = self.segment.map_or(0, |s| s.identity_hash());
        let h2 = self.index as u64;
        h1.rotate_left(5).wrapping_add(h1) ^ h2
    }
}

impl Hash for Position<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.combined_hash());
    }
}

/// Unchecked offset within the current segment.
///
/// No bounds validation happens; use [`ReadOnlyBuffer::move_by`] to cross
/// segments safely.
///
/// [`ReadOnlyBuffer::move_by`]: crate::ReadOnlyBuffer::move_by
impl Add<usize> for Position<'_> {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Self {
            segment: self.segment,
            index: self.index + rhs,
        }
    }
}

impl From<Position<'_>> for usize {
    fn from(position: Position<'_>) -> Self {
        position.index
    }
}

impl fmt::Debug for Position<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.segment {
            Some(segment) => f
                .debug_tuple("Position")
                .field(segment)
                .field(&self.index)
                .finish(),
            None => f.write_str("Position(unset)"),
        }
    }
}
